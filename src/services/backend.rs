use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::credit::{CreditReportRecord, ScoreHistoryEntry};
use crate::models::document::{DocumentInsert, DocumentRecord, StoredObject};
use crate::models::period::DateWindow;
use crate::models::profile::{ProfilePatch, ProfileRecord};
use crate::models::session::UserSession;
use crate::models::settings::{SettingsPatch, StoredSettings};

pub const AVATAR_BUCKET: &str = "avatars";
pub const DOCUMENT_BUCKET: &str = "documents";

/// Row-scoped access to the account tables and the object store.
///
/// Every call is scoped to `session.user_id`. Implementations never merge or
/// reconcile: the last write to a row wins.
#[async_trait]
pub trait CreditBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Most recent report regardless of any period filter.
    async fn latest_credit_report(
        &self,
        session: &UserSession,
    ) -> AppResult<Option<CreditReportRecord>>;

    /// Up to `limit` reports dated inside `window`, newest first.
    async fn credit_reports_in_window(
        &self,
        session: &UserSession,
        window: &DateWindow,
        limit: usize,
    ) -> AppResult<Vec<CreditReportRecord>>;

    /// Up to `limit` history entries dated inside `window`, newest first.
    async fn score_history_in_window(
        &self,
        session: &UserSession,
        window: &DateWindow,
        limit: usize,
    ) -> AppResult<Vec<ScoreHistoryEntry>>;

    async fn fetch_profile(&self, session: &UserSession) -> AppResult<Option<ProfileRecord>>;

    async fn update_profile(
        &self,
        session: &UserSession,
        patch: &ProfilePatch,
    ) -> AppResult<ProfileRecord>;

    /// Newest upload first.
    async fn list_documents(&self, session: &UserSession) -> AppResult<Vec<DocumentRecord>>;

    async fn insert_document(
        &self,
        session: &UserSession,
        document: &DocumentInsert,
    ) -> AppResult<DocumentRecord>;

    async fn delete_document(&self, session: &UserSession, id: Uuid) -> AppResult<()>;

    async fn fetch_settings(&self, session: &UserSession) -> AppResult<Option<StoredSettings>>;

    async fn upsert_settings(
        &self,
        session: &UserSession,
        patch: &SettingsPatch,
    ) -> AppResult<StoredSettings>;

    async fn upload_object(
        &self,
        session: &UserSession,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> AppResult<StoredObject>;
}
