use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::AppResult;
use crate::models::credit::{
    CreditReportSummary, CreditReportsResponse, ScoreChartPoint, ScoreHistoryEntry,
    ScoreHistoryResponse, ScoreTrend, TrendDirection,
};
use crate::models::dashboard::DashboardSnapshot;
use crate::models::gauge::{ScoreBand, ScoreGaugeInput};
use crate::models::period::PeriodSelection;
use crate::models::session::UserSession;
use crate::services::backend::CreditBackend;
use crate::services::period_view::PeriodLoader;
use crate::services::score_gauge;

const CHART_LABEL_FORMAT: &str = "%b %y";

/// Read side of the dashboard, credit report and score history pages.
pub struct DashboardService {
    backend: Arc<dyn CreditBackend>,
    history_limit: usize,
}

impl DashboardService {
    pub fn new(backend: Arc<dyn CreditBackend>, history_limit: usize) -> Self {
        Self {
            backend,
            history_limit: history_limit.max(1),
        }
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    pub async fn snapshot(
        &self,
        session: &UserSession,
        selection: PeriodSelection,
    ) -> AppResult<DashboardSnapshot> {
        self.snapshot_at(session, selection, Utc::now()).await
    }

    /// Headline report (ignores the period) plus the history inside the window.
    pub async fn snapshot_at(
        &self,
        session: &UserSession,
        selection: PeriodSelection,
        now: DateTime<Utc>,
    ) -> AppResult<DashboardSnapshot> {
        let window = selection.resolve(now);
        let headline = self.backend.latest_credit_report(session).await?;
        let history = self
            .backend
            .score_history_in_window(session, &window, self.history_limit)
            .await?;

        let chronological: Vec<ScoreHistoryEntry> = history.iter().rev().cloned().collect();
        let trend = compute_trend(&chronological);
        let category = headline.as_ref().map(|report| ScoreBand::for_score(report.score));
        let gauge = headline
            .as_ref()
            .map(|report| score_gauge::render(&ScoreGaugeInput::new(report.score)));

        debug!(
            target: "app::dashboard",
            user_id = %session.user_id,
            period = selection.label(),
            history = history.len(),
            has_headline = headline.is_some(),
            "dashboard snapshot loaded"
        );

        Ok(DashboardSnapshot {
            selection,
            window,
            headline,
            category,
            gauge,
            history,
            trend,
        })
    }

    pub async fn credit_report_summary(
        &self,
        session: &UserSession,
    ) -> AppResult<Option<CreditReportSummary>> {
        let Some(report) = self.backend.latest_credit_report(session).await? else {
            info!(target: "app::dashboard", user_id = %session.user_id, "no credit report on file");
            return Ok(None);
        };

        let gauge = score_gauge::render(&ScoreGaugeInput::new(report.score));
        Ok(Some(CreditReportSummary {
            category: gauge.category,
            percentile: score_gauge::percentile(report.score),
            gauge,
            report,
        }))
    }

    pub async fn credit_reports_at(
        &self,
        session: &UserSession,
        selection: PeriodSelection,
        limit: Option<usize>,
        now: DateTime<Utc>,
    ) -> AppResult<CreditReportsResponse> {
        let window = selection.resolve(now);
        let reports = self
            .backend
            .credit_reports_in_window(session, &window, self.effective_limit(limit))
            .await?;
        Ok(CreditReportsResponse { window, reports })
    }

    pub async fn score_history(
        &self,
        session: &UserSession,
        selection: PeriodSelection,
        limit: Option<usize>,
    ) -> AppResult<ScoreHistoryResponse> {
        self.score_history_at(session, selection, limit, Utc::now())
            .await
    }

    pub async fn score_history_at(
        &self,
        session: &UserSession,
        selection: PeriodSelection,
        limit: Option<usize>,
        now: DateTime<Utc>,
    ) -> AppResult<ScoreHistoryResponse> {
        let window = selection.resolve(now);
        let mut entries = self
            .backend
            .score_history_in_window(session, &window, self.effective_limit(limit))
            .await?;
        entries.reverse();

        let points = chart_points(&entries);
        let trend = compute_trend(&entries);
        let latest = entries.last();

        Ok(ScoreHistoryResponse {
            selection,
            window,
            current_score: latest.map(|entry| entry.score),
            last_updated: latest.map(|entry| entry.score_date),
            total_entries: entries.len(),
            trend,
            points,
            entries,
        })
    }

    fn effective_limit(&self, limit: Option<usize>) -> usize {
        limit
            .filter(|value| *value > 0)
            .unwrap_or(self.history_limit)
    }
}

/// Direction and size of the move between the last two chronological points.
pub fn compute_trend(chronological: &[ScoreHistoryEntry]) -> ScoreTrend {
    let [.., previous, latest] = chronological else {
        return ScoreTrend::stable();
    };

    let delta = latest.score - previous.score;
    let direction = match delta {
        d if d > 0 => TrendDirection::Up,
        d if d < 0 => TrendDirection::Down,
        _ => TrendDirection::Stable,
    };

    ScoreTrend {
        direction,
        change: delta.abs(),
    }
}

pub fn chart_points(chronological: &[ScoreHistoryEntry]) -> Vec<ScoreChartPoint> {
    chronological
        .iter()
        .map(|entry| ScoreChartPoint {
            label: entry.score_date.format(CHART_LABEL_FORMAT).to_string(),
            date: entry.score_date,
            score: entry.score,
            change: entry.change_amount,
        })
        .collect()
}

/// Loader for the long-lived dashboard view.
pub struct DashboardLoader {
    service: Arc<DashboardService>,
}

impl DashboardLoader {
    pub fn new(service: Arc<DashboardService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl PeriodLoader for DashboardLoader {
    type Output = DashboardSnapshot;

    fn name(&self) -> &'static str {
        "dashboard"
    }

    async fn load(
        &self,
        session: &UserSession,
        selection: PeriodSelection,
    ) -> AppResult<DashboardSnapshot> {
        self.service.snapshot(session, selection).await
    }
}

pub struct ScoreHistoryLoader {
    service: Arc<DashboardService>,
}

impl ScoreHistoryLoader {
    pub fn new(service: Arc<DashboardService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl PeriodLoader for ScoreHistoryLoader {
    type Output = ScoreHistoryResponse;

    fn name(&self) -> &'static str {
        "score_history"
    }

    async fn load(
        &self,
        session: &UserSession,
        selection: PeriodSelection,
    ) -> AppResult<ScoreHistoryResponse> {
        self.service.score_history(session, selection, None).await
    }
}

pub struct CreditReportsLoader {
    service: Arc<DashboardService>,
}

impl CreditReportsLoader {
    pub fn new(service: Arc<DashboardService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl PeriodLoader for CreditReportsLoader {
    type Output = CreditReportsResponse;

    fn name(&self) -> &'static str {
        "credit_report"
    }

    async fn load(
        &self,
        session: &UserSession,
        selection: PeriodSelection,
    ) -> AppResult<CreditReportsResponse> {
        self.service
            .credit_reports_at(session, selection, None, Utc::now())
            .await
    }
}
