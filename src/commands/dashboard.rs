use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::models::credit::{CreditReportSummary, CreditReportsResponse, ScoreHistoryResponse};
use crate::models::dashboard::{DashboardQueryParams, DashboardSnapshot};
use crate::models::period::PeriodSelection;
use crate::services::dashboard_service::{
    CreditReportsLoader, DashboardLoader, ScoreHistoryLoader,
};
use crate::services::period_view::PeriodView;
use crate::services::routes::{self, RouteResolution};

use super::{AppState, CommandResult};

pub async fn dashboard_snapshot(
    state: &AppState,
    params: DashboardQueryParams,
) -> CommandResult<DashboardSnapshot> {
    let session = state.require_session()?;
    let snapshot = state.dashboard().snapshot(&session, params.selection).await?;
    Ok(snapshot)
}

pub async fn credit_report_summary(state: &AppState) -> CommandResult<Option<CreditReportSummary>> {
    let session = state.require_session()?;
    Ok(state.dashboard().credit_report_summary(&session).await?)
}

pub async fn credit_reports_fetch(
    state: &AppState,
    params: DashboardQueryParams,
) -> CommandResult<CreditReportsResponse> {
    let session = state.require_session()?;
    let response = state
        .dashboard()
        .credit_reports_at(&session, params.selection, params.limit, Utc::now())
        .await?;
    Ok(response)
}

pub async fn score_history_fetch(
    state: &AppState,
    params: DashboardQueryParams,
) -> CommandResult<ScoreHistoryResponse> {
    let session = state.require_session()?;
    let response = state
        .dashboard()
        .score_history(&session, params.selection, params.limit)
        .await?;
    Ok(response)
}

/// Opens the dashboard page. The returned view owns its in-flight requests;
/// dropping or closing it discards anything still pending.
pub fn dashboard_view_open(
    state: &AppState,
    initial: PeriodSelection,
) -> CommandResult<Arc<PeriodView<DashboardLoader>>> {
    let session = state.require_session()?;
    debug!(target: "app::command", period = initial.label(), "dashboard view opened");
    Ok(PeriodView::new(
        DashboardLoader::new(state.dashboard()),
        session,
        initial,
    ))
}

pub fn score_history_view_open(
    state: &AppState,
    initial: PeriodSelection,
) -> CommandResult<Arc<PeriodView<ScoreHistoryLoader>>> {
    let session = state.require_session()?;
    Ok(PeriodView::new(
        ScoreHistoryLoader::new(state.dashboard()),
        session,
        initial,
    ))
}

pub fn credit_report_view_open(
    state: &AppState,
    initial: PeriodSelection,
) -> CommandResult<Arc<PeriodView<CreditReportsLoader>>> {
    let session = state.require_session()?;
    Ok(PeriodView::new(
        CreditReportsLoader::new(state.dashboard()),
        session,
        initial,
    ))
}

pub fn route_resolve(state: &AppState, path: &str) -> RouteResolution {
    routes::resolve(path, state.has_session())
}
