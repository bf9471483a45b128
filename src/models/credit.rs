use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::gauge::{GaugeGeometry, ScoreBand};
use crate::models::period::{DateWindow, PeriodSelection};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreditReportRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub score: i32,
    pub report_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreHistoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub score: i32,
    pub score_date: NaiveDate,
    /// Delta against the previous recorded score.
    #[serde(default)]
    pub change_amount: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTrend {
    pub direction: TrendDirection,
    /// Absolute difference between the two most recent points.
    pub change: i32,
}

impl ScoreTrend {
    pub fn stable() -> Self {
        Self {
            direction: TrendDirection::Stable,
            change: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreChartPoint {
    /// Short month label, e.g. `Mar 25`.
    pub label: String,
    pub date: NaiveDate,
    pub score: i32,
    pub change: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreditReportSummary {
    pub report: CreditReportRecord,
    pub category: ScoreBand,
    /// "Your score is better than N%" blurb.
    pub percentile: i32,
    pub gauge: GaugeGeometry,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreHistoryResponse {
    pub selection: PeriodSelection,
    pub window: DateWindow,
    /// Oldest first, ready for charting.
    pub entries: Vec<ScoreHistoryEntry>,
    pub points: Vec<ScoreChartPoint>,
    pub trend: ScoreTrend,
    pub current_score: Option<i32>,
    pub last_updated: Option<NaiveDate>,
    pub total_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreditReportsResponse {
    pub window: DateWindow,
    /// Newest first.
    pub reports: Vec<CreditReportRecord>,
}
