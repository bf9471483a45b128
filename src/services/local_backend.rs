//! Embedded SQLite store with the same tables as the hosted backend.
//!
//! Used in offline/demo mode and by the integration tests. Blocking rusqlite
//! calls run on the tokio blocking pool so callers never stall the runtime.

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::db::repositories::credit_report_repository::CreditReportRepository;
use crate::db::repositories::document_repository::DocumentRepository;
use crate::db::repositories::object_store_repository::ObjectStoreRepository;
use crate::db::repositories::profile_repository::ProfileRepository;
use crate::db::repositories::score_history_repository::ScoreHistoryRepository;
use crate::db::repositories::user_settings_repository::UserSettingsRepository;
use crate::db::{format_timestamp, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::credit::{CreditReportRecord, ScoreHistoryEntry};
use crate::models::document::{DocumentInsert, DocumentRecord, StoredObject};
use crate::models::period::DateWindow;
use crate::models::profile::{ProfilePatch, ProfileRecord};
use crate::models::session::UserSession;
use crate::models::settings::{SettingsPatch, StoredSettings};
use crate::services::backend::CreditBackend;

pub const LOCAL_OBJECT_SCHEME: &str = "creditai-local://";

#[derive(Debug, Clone)]
pub struct LocalBackend {
    db_pool: DbPool,
}

impl LocalBackend {
    pub fn new(db_pool: DbPool) -> Self {
        Self { db_pool }
    }

    pub fn db(&self) -> DbPool {
        self.db_pool.clone()
    }

    /// Reads back an object written through [`CreditBackend::upload_object`].
    pub async fn read_object(&self, bucket: &str, path: &str) -> AppResult<Option<Vec<u8>>> {
        let (bucket, path) = (bucket.to_string(), path.to_string());
        self.blocking(move |pool| {
            pool.with_connection(|conn| {
                Ok(ObjectStoreRepository::get(conn, &bucket, &path)?.map(|(_, bytes)| bytes))
            })
        })
        .await
    }

    async fn blocking<T, F>(&self, task: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(DbPool) -> AppResult<T> + Send + 'static,
    {
        let pool = self.db_pool.clone();
        tokio::task::spawn_blocking(move || task(pool))
            .await
            .map_err(|err| AppError::other(format!("local store task failed: {err}")))?
    }
}

pub fn local_object_url(bucket: &str, path: &str) -> String {
    format!("{LOCAL_OBJECT_SCHEME}{bucket}/{path}")
}

#[async_trait]
impl CreditBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn latest_credit_report(
        &self,
        session: &UserSession,
    ) -> AppResult<Option<CreditReportRecord>> {
        let user_id = session.user_id;
        self.blocking(move |pool| {
            pool.with_connection(|conn| CreditReportRepository::latest(conn, user_id))
        })
        .await
    }

    async fn credit_reports_in_window(
        &self,
        session: &UserSession,
        window: &DateWindow,
        limit: usize,
    ) -> AppResult<Vec<CreditReportRecord>> {
        let user_id = session.user_id;
        let (from, to) = (window.from_date(), window.to_date());
        self.blocking(move |pool| {
            pool.with_connection(|conn| {
                CreditReportRepository::list_in_range(conn, user_id, from, to, limit)
            })
        })
        .await
    }

    async fn score_history_in_window(
        &self,
        session: &UserSession,
        window: &DateWindow,
        limit: usize,
    ) -> AppResult<Vec<ScoreHistoryEntry>> {
        let user_id = session.user_id;
        let (from, to) = (window.from_date(), window.to_date());
        self.blocking(move |pool| {
            pool.with_connection(|conn| {
                ScoreHistoryRepository::list_in_range(conn, user_id, from, to, limit)
            })
        })
        .await
    }

    async fn fetch_profile(&self, session: &UserSession) -> AppResult<Option<ProfileRecord>> {
        let user_id = session.user_id;
        self.blocking(move |pool| pool.with_connection(|conn| ProfileRepository::find(conn, user_id)))
            .await
    }

    async fn update_profile(
        &self,
        session: &UserSession,
        patch: &ProfilePatch,
    ) -> AppResult<ProfileRecord> {
        let user_id = session.user_id;
        let patch = patch.clone();
        self.blocking(move |pool| {
            pool.with_connection(|conn| ProfileRepository::upsert(conn, user_id, &patch, Utc::now()))
        })
        .await
    }

    async fn list_documents(&self, session: &UserSession) -> AppResult<Vec<DocumentRecord>> {
        let user_id = session.user_id;
        self.blocking(move |pool| pool.with_connection(|conn| DocumentRepository::list(conn, user_id)))
            .await
    }

    async fn insert_document(
        &self,
        session: &UserSession,
        document: &DocumentInsert,
    ) -> AppResult<DocumentRecord> {
        let user_id = session.user_id;
        let document = document.clone();
        self.blocking(move |pool| {
            pool.with_connection(|conn| {
                DocumentRepository::insert(conn, user_id, &document, Utc::now())
            })
        })
        .await
    }

    async fn delete_document(&self, session: &UserSession, id: Uuid) -> AppResult<()> {
        let user_id = session.user_id;
        self.blocking(move |pool| {
            pool.with_connection(|conn| DocumentRepository::delete(conn, user_id, id))
        })
        .await
    }

    async fn fetch_settings(&self, session: &UserSession) -> AppResult<Option<StoredSettings>> {
        let user_id = session.user_id;
        self.blocking(move |pool| {
            pool.with_connection(|conn| UserSettingsRepository::get(conn, user_id))
        })
        .await
    }

    async fn upsert_settings(
        &self,
        session: &UserSession,
        patch: &SettingsPatch,
    ) -> AppResult<StoredSettings> {
        let user_id = session.user_id;
        let patch = patch.clone();
        self.blocking(move |pool| {
            pool.with_connection(|conn| {
                UserSettingsRepository::upsert(conn, user_id, &patch, Utc::now())
            })
        })
        .await
    }

    async fn upload_object(
        &self,
        _session: &UserSession,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> AppResult<StoredObject> {
        let stored = StoredObject {
            bucket: bucket.to_string(),
            path: path.to_string(),
            public_url: local_object_url(bucket, path),
        };
        let content_type = content_type.to_string();
        let object = stored.clone();
        self.blocking(move |pool| {
            pool.with_connection(|conn| {
                ObjectStoreRepository::put(
                    conn,
                    &object.bucket,
                    &object.path,
                    &content_type,
                    &bytes,
                    &format_timestamp(Utc::now()),
                )
            })
        })
        .await?;

        debug!(target: "app::db", bucket, path, "object stored locally");
        Ok(stored)
    }
}
