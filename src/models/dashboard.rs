use serde::{Deserialize, Serialize};

use crate::models::credit::{CreditReportRecord, ScoreHistoryEntry, ScoreTrend};
use crate::models::gauge::{GaugeGeometry, ScoreBand};
use crate::models::period::{DateWindow, PeriodSelection};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub selection: PeriodSelection,
    pub window: DateWindow,
    pub headline: Option<CreditReportRecord>,
    pub category: Option<ScoreBand>,
    pub gauge: Option<GaugeGeometry>,
    /// Newest first, as returned by the accessor.
    pub history: Vec<ScoreHistoryEntry>,
    pub trend: ScoreTrend,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQueryParams {
    #[serde(default)]
    pub selection: PeriodSelection,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl Default for DashboardQueryParams {
    fn default() -> Self {
        Self {
            selection: PeriodSelection::default(),
            limit: None,
        }
    }
}
