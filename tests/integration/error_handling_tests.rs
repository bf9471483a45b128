// Failure paths: unreachable backend, missing session, bad input.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use creditai_app_lib::commands::dashboard::{dashboard_snapshot, dashboard_view_open};
use creditai_app_lib::commands::demo::{
    demo_generate_score, demo_next, demo_reset, demo_state, DemoSession,
};
use creditai_app_lib::commands::documents::{documents_list, documents_upload};
use creditai_app_lib::commands::profile::profile_get;
use creditai_app_lib::commands::settings::{settings_set_theme, ThemeUpdatePayload};
use creditai_app_lib::commands::AppState;
use creditai_app_lib::error::{AppError, AppResult, RemoteErrorCode};
use creditai_app_lib::models::credit::{CreditReportRecord, ScoreHistoryEntry};
use creditai_app_lib::models::dashboard::DashboardQueryParams;
use creditai_app_lib::models::document::{DocumentInsert, DocumentRecord, StoredObject, UploadFile};
use creditai_app_lib::models::period::{DateWindow, PeriodSelection};
use creditai_app_lib::models::profile::{ProfilePatch, ProfileRecord};
use creditai_app_lib::models::session::UserSession;
use creditai_app_lib::models::settings::{SettingsPatch, StoredSettings, Theme};
use creditai_app_lib::services::backend::CreditBackend;
use creditai_app_lib::services::period_view::LoadOutcome;
use uuid::Uuid;

/// Every call fails as if the backend were down.
#[derive(Default)]
struct UnreachableBackend {
    calls: AtomicUsize,
}

impl UnreachableBackend {
    fn fail<T>(&self) -> AppResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AppError::remote_with_details(
            RemoteErrorCode::BackendUnavailable,
            "backend temporarily unavailable",
            Some("cid-test"),
            None,
        ))
    }
}

#[async_trait]
impl CreditBackend for UnreachableBackend {
    fn name(&self) -> &'static str {
        "unreachable"
    }

    async fn latest_credit_report(&self, _: &UserSession) -> AppResult<Option<CreditReportRecord>> {
        self.fail()
    }

    async fn credit_reports_in_window(
        &self,
        _: &UserSession,
        _: &DateWindow,
        _: usize,
    ) -> AppResult<Vec<CreditReportRecord>> {
        self.fail()
    }

    async fn score_history_in_window(
        &self,
        _: &UserSession,
        _: &DateWindow,
        _: usize,
    ) -> AppResult<Vec<ScoreHistoryEntry>> {
        self.fail()
    }

    async fn fetch_profile(&self, _: &UserSession) -> AppResult<Option<ProfileRecord>> {
        self.fail()
    }

    async fn update_profile(&self, _: &UserSession, _: &ProfilePatch) -> AppResult<ProfileRecord> {
        self.fail()
    }

    async fn list_documents(&self, _: &UserSession) -> AppResult<Vec<DocumentRecord>> {
        self.fail()
    }

    async fn insert_document(
        &self,
        _: &UserSession,
        _: &DocumentInsert,
    ) -> AppResult<DocumentRecord> {
        self.fail()
    }

    async fn delete_document(&self, _: &UserSession, _: Uuid) -> AppResult<()> {
        self.fail()
    }

    async fn fetch_settings(&self, _: &UserSession) -> AppResult<Option<StoredSettings>> {
        self.fail()
    }

    async fn upsert_settings(&self, _: &UserSession, _: &SettingsPatch) -> AppResult<StoredSettings> {
        self.fail()
    }

    async fn upload_object(
        &self,
        _: &UserSession,
        _: &str,
        _: &str,
        _: Vec<u8>,
        _: &str,
    ) -> AppResult<StoredObject> {
        self.fail()
    }
}

async fn signed_in_state() -> (AppState, Arc<UnreachableBackend>) {
    let backend = Arc::new(UnreachableBackend::default());
    let state = AppState::with_backend(backend.clone(), 50);
    state
        .sign_in(UserSession::new(Uuid::new_v4(), Some("ada@example.com".into()), "t"))
        .await;
    (state, backend)
}

#[tokio::test]
async fn test_commands_require_a_session() {
    let state = AppState::with_backend(Arc::new(UnreachableBackend::default()), 50);

    let error = dashboard_snapshot(&state, DashboardQueryParams::default())
        .await
        .expect_err("no session");
    assert_eq!(error.code, "UNAUTHENTICATED");
    assert!(documents_list(&state).await.is_err());
}

#[tokio::test]
async fn test_remote_failures_surface_code_and_correlation_id() {
    let (state, _backend) = signed_in_state().await;

    let error = dashboard_snapshot(&state, DashboardQueryParams::default())
        .await
        .expect_err("backend down");
    assert_eq!(error.code, "BACKEND_UNAVAILABLE");
    assert_eq!(error.details.expect("details")["correlationId"], "cid-test");
}

#[tokio::test]
async fn test_failed_reads_degrade_to_empty_views() {
    let (state, _backend) = signed_in_state().await;

    assert!(documents_list(&state).await.expect("documents").is_empty());
    let profile = profile_get(&state).await.expect("profile");
    assert_eq!(profile.first_name, "");

    let view = dashboard_view_open(&state, PeriodSelection::default()).expect("view");
    assert_eq!(view.refresh().await, LoadOutcome::KeptPrevious);
    let view_state = view.state();
    assert!(view_state.data.is_none());
    assert!(!view_state.loading);
}

#[tokio::test]
async fn test_failed_writes_notify_without_retrying() {
    let (state, backend) = signed_in_state().await;
    let before = backend.calls.load(Ordering::SeqCst);

    let outcome = documents_upload(
        &state,
        UploadFile {
            name: "statement.pdf".into(),
            mime_type: None,
            bytes: vec![1, 2, 3],
        },
    )
    .await
    .expect("upload command");

    assert!(!outcome.is_success());
    assert_eq!(outcome.notice.title, "Error");
    assert_eq!(outcome.notice.description, "Failed to upload document");
    assert_eq!(backend.calls.load(Ordering::SeqCst) - before, 1);
}

#[tokio::test]
async fn test_settings_survive_an_unreachable_store() {
    let (state, _backend) = signed_in_state().await;

    let context = state.settings().expect("settings context");
    assert_eq!(context.theme(), Theme::System);

    let update = settings_set_theme(&state, ThemeUpdatePayload { theme: Theme::Dark })
        .expect("theme command");
    assert!(update.outcome.is_success());

    let persisted = update
        .persist
        .expect("persist handle")
        .await
        .expect("persist task");
    assert!(persisted.is_err());
    assert_eq!(context.theme(), Theme::Dark);
}

#[test]
fn test_demo_score_needs_the_consent_step() {
    let demo = DemoSession::new();
    assert_eq!(demo_state(&demo).progress_percent, 25);

    let error = demo_generate_score(&demo).expect_err("too early");
    assert_eq!(error.code, "VALIDATION_ERROR");

    demo_next(&demo);
    demo_next(&demo);
    let state = demo_generate_score(&demo).expect("score");
    let score = state.score.expect("score present");
    assert!((600..800).contains(&score));
    assert_eq!(state.step, 4);
    assert_eq!(state.progress_percent, 100);

    let reset = demo_reset(&demo);
    assert_eq!(reset.step, 1);
    assert!(reset.score.is_none());
}
