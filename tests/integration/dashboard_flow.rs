use chrono::{Duration, NaiveDate, Utc};
use creditai_app_lib::commands::dashboard::{
    credit_report_summary, credit_reports_fetch, dashboard_snapshot, dashboard_view_open,
    route_resolve, score_history_fetch,
};
use creditai_app_lib::commands::AppState;
use creditai_app_lib::config::AppConfig;
use creditai_app_lib::db::repositories::credit_report_repository::CreditReportRepository;
use creditai_app_lib::db::repositories::score_history_repository::ScoreHistoryRepository;
use creditai_app_lib::db::DbPool;
use creditai_app_lib::models::credit::{CreditReportRecord, ScoreHistoryEntry, TrendDirection};
use creditai_app_lib::models::dashboard::DashboardQueryParams;
use creditai_app_lib::models::gauge::ScoreBand;
use creditai_app_lib::models::period::{PeriodSelection, PeriodToken};
use creditai_app_lib::models::session::UserSession;
use creditai_app_lib::services::period_view::LoadOutcome;
use creditai_app_lib::services::routes::RouteResolution;
use tempfile::{tempdir, TempDir};
use uuid::Uuid;

fn days_ago(days: i64) -> NaiveDate {
    (Utc::now() - Duration::days(days)).date_naive()
}

fn seed(pool: &DbPool, user: Uuid) {
    pool.with_connection(|conn| {
        for (days, score) in [(400, 680), (10, 742)] {
            CreditReportRepository::insert(
                conn,
                &CreditReportRecord {
                    id: Uuid::new_v4(),
                    user_id: user,
                    score,
                    report_date: days_ago(days),
                    created_at: Utc::now(),
                },
            )?;
        }
        for (days, score, change) in [(300, 690, 0), (60, 720, 30), (3, 742, 22)] {
            ScoreHistoryRepository::insert(
                conn,
                &ScoreHistoryEntry {
                    id: Uuid::new_v4(),
                    user_id: user,
                    score,
                    score_date: days_ago(days),
                    change_amount: change,
                    created_at: Utc::now(),
                },
            )?;
        }
        Ok(())
    })
    .expect("seed data");
}

async fn setup() -> (AppState, UserSession, TempDir) {
    let dir = tempdir().expect("temp dir");
    let config = AppConfig::local(dir.path());
    let state = AppState::new(&config).expect("app state");

    let session = UserSession::new(Uuid::new_v4(), Some("ada@example.com".into()), "local");
    let pool = DbPool::new(dir.path().join("creditai.sqlite")).expect("db pool");
    seed(&pool, session.user_id);

    state.sign_in(session.clone()).await;
    (state, session, dir)
}

fn params(token: PeriodToken) -> DashboardQueryParams {
    DashboardQueryParams {
        selection: PeriodSelection::preset(token),
        limit: None,
    }
}

#[tokio::test]
async fn test_snapshot_combines_headline_gauge_and_trend() {
    let (state, _session, _dir) = setup().await;

    let snapshot = dashboard_snapshot(&state, params(PeriodToken::OneYear))
        .await
        .expect("snapshot");

    let headline = snapshot.headline.expect("headline report");
    assert_eq!(headline.score, 742);
    assert_eq!(snapshot.category, Some(ScoreBand::VeryGood));
    let gauge = snapshot.gauge.expect("gauge");
    assert!((gauge.needle_angle - 144.6545).abs() < 1e-3);

    let scores: Vec<i32> = snapshot.history.iter().map(|entry| entry.score).collect();
    assert_eq!(scores, vec![742, 720, 690]);
    assert_eq!(snapshot.trend.direction, TrendDirection::Up);
    assert_eq!(snapshot.trend.change, 22);
}

#[tokio::test]
async fn test_headline_ignores_the_selected_period() {
    let (state, _session, _dir) = setup().await;

    let snapshot = dashboard_snapshot(&state, params(PeriodToken::SevenDays))
        .await
        .expect("snapshot");
    assert_eq!(snapshot.headline.map(|report| report.score), Some(742));
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(snapshot.trend.direction, TrendDirection::Stable);
    assert_eq!(snapshot.trend.change, 0);
}

#[tokio::test]
async fn test_score_history_is_chronological() {
    let (state, _session, _dir) = setup().await;

    let history = score_history_fetch(&state, params(PeriodToken::OneYear))
        .await
        .expect("history");
    let scores: Vec<i32> = history.entries.iter().map(|entry| entry.score).collect();
    assert_eq!(scores, vec![690, 720, 742]);
    assert_eq!(history.current_score, Some(742));
    assert_eq!(history.total_entries, 3);
    assert_eq!(history.points.len(), 3);
    assert_eq!(history.last_updated, Some(days_ago(3)));
}

#[tokio::test]
async fn test_credit_reports_respect_window_and_limit() {
    let (state, _session, _dir) = setup().await;

    let within_year = credit_reports_fetch(&state, params(PeriodToken::OneYear))
        .await
        .expect("reports");
    assert_eq!(within_year.reports.len(), 1);

    let all = credit_reports_fetch(
        &state,
        DashboardQueryParams {
            selection: PeriodSelection::preset(PeriodToken::TwoYears),
            limit: Some(1),
        },
    )
    .await
    .expect("limited reports");
    assert_eq!(all.reports.len(), 1);
    assert_eq!(all.reports[0].score, 742);

    let summary = credit_report_summary(&state)
        .await
        .expect("summary")
        .expect("summary present");
    assert_eq!(summary.category, ScoreBand::VeryGood);
    assert_eq!(summary.percentile, 87);
}

#[tokio::test]
async fn test_custom_range_filters_history() {
    let (state, _session, _dir) = setup().await;

    let selection = PeriodSelection::custom(days_ago(90), days_ago(30));
    let history = score_history_fetch(
        &state,
        DashboardQueryParams {
            selection,
            limit: None,
        },
    )
    .await
    .expect("custom history");
    assert_eq!(history.total_entries, 1);
    assert_eq!(history.current_score, Some(720));
}

#[tokio::test]
async fn test_dashboard_view_tracks_period_changes() {
    let (state, _session, _dir) = setup().await;

    let view = dashboard_view_open(&state, PeriodSelection::default()).expect("view");
    assert_eq!(view.refresh().await, LoadOutcome::Applied);
    assert_eq!(view.state().data.expect("data").history.len(), 3);

    assert_eq!(
        view.select_preset(PeriodToken::SevenDays).await,
        LoadOutcome::Applied
    );
    let state_after = view.state();
    assert!(!state_after.loading);
    assert_eq!(state_after.selection, PeriodSelection::preset(PeriodToken::SevenDays));
    assert_eq!(state_after.data.expect("data").history.len(), 1);

    view.close();
    assert_eq!(view.refresh().await, LoadOutcome::Superseded);
}

#[tokio::test]
async fn test_routes_depend_on_session() {
    let (state, _session, _dir) = setup().await;
    assert!(matches!(
        route_resolve(&state, "/score-history"),
        RouteResolution::Render { .. }
    ));

    state.sign_out();
    assert_eq!(
        route_resolve(&state, "/score-history"),
        RouteResolution::Redirect { to: "/login" }
    );
    assert_eq!(route_resolve(&state, "/missing"), RouteResolution::NotFound);
}
