//! Hosted backend reached over its PostgREST table API and storage API.

use std::time::{Duration as StdDuration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult, RemoteErrorCode};
use crate::models::credit::{CreditReportRecord, ScoreHistoryEntry};
use crate::models::document::{DocumentInsert, DocumentRecord, StoredObject};
use crate::models::period::DateWindow;
use crate::models::profile::{ProfilePatch, ProfileRecord};
use crate::models::session::UserSession;
use crate::models::settings::{SettingsPatch, StoredSettings, ThemeColors};
use crate::services::backend::CreditBackend;
use crate::services::retry::RetryPolicy;

const REST_PATH: &str = "/rest/v1";
const STORAGE_PATH: &str = "/storage/v1/object";
const BODY_SNIPPET_LIMIT: usize = 512;

#[derive(Debug, Clone)]
pub struct RestBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl RestBackend {
    pub fn try_new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: StdDuration,
        retry: RetryPolicy,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Some(StdDuration::from_secs(90)))
            .build()
            .map_err(|err| AppError::other(format!("failed to build backend HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn public_object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}{STORAGE_PATH}/public/{bucket}/{path}", self.base_url)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}{REST_PATH}/{table}", self.base_url)
    }

    fn authorized(&self, method: Method, url: &str, session: &UserSession) -> RequestBuilder {
        let token = if session.access_token.trim().is_empty() {
            self.api_key.as_str()
        } else {
            session.access_token.as_str()
        };
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
    }

    /// Sends the request built by `build`, retrying transient failures, and
    /// decodes the JSON body.
    async fn send_json<T, F>(&self, operation: &'static str, build: F) -> AppResult<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let correlation_id = Uuid::new_v4().to_string();
        let cid = correlation_id.as_str();
        let build = &build;
        let response = self
            .retry
            .execute(operation, move |attempt| {
                Self::send_once(operation, attempt, build(), cid)
            })
            .await?;

        response.json::<T>().await.map_err(|err| {
            AppError::remote_with_details(
                RemoteErrorCode::InvalidResponse,
                format!("failed to decode {operation} response"),
                Some(cid),
                Some(json!({ "reason": err.to_string() })),
            )
        })
    }

    async fn send_empty<F>(&self, operation: &'static str, build: F) -> AppResult<()>
    where
        F: Fn() -> RequestBuilder,
    {
        let correlation_id = Uuid::new_v4().to_string();
        let cid = correlation_id.as_str();
        let build = &build;
        self.retry
            .execute(operation, move |attempt| {
                Self::send_once(operation, attempt, build(), cid)
            })
            .await?;
        Ok(())
    }

    async fn send_once(
        operation: &'static str,
        attempt: u32,
        request: RequestBuilder,
        correlation_id: &str,
    ) -> AppResult<Response> {
        debug!(
            target: "app::remote",
            operation,
            attempt,
            correlation_id = %correlation_id,
            "calling backend"
        );

        let start = Instant::now();
        match request.send().await {
            Ok(response) if response.status().is_success() => {
                debug!(
                    target: "app::remote",
                    operation,
                    correlation_id = %correlation_id,
                    status = response.status().as_u16(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "backend responded"
                );
                Ok(response)
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!(
                    target: "app::remote",
                    operation,
                    correlation_id = %correlation_id,
                    status = status.as_u16(),
                    "backend returned non-success status"
                );
                Err(map_http_error(status, correlation_id, Some(body)))
            }
            Err(err) => Err(error_from_reqwest(err, correlation_id)),
        }
    }

    async fn select_rows<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        session: &UserSession,
        table: &str,
        query: Vec<(&'static str, String)>,
    ) -> AppResult<Vec<T>> {
        let url = self.table_url(table);
        self.send_json(operation, || {
            self.authorized(Method::GET, &url, session)
                .query(&query)
        })
        .await
    }

    /// POST/PATCH/DELETE with `return=representation`; yields the affected rows.
    #[allow(clippy::too_many_arguments)]
    async fn write_rows<T, B>(
        &self,
        operation: &'static str,
        session: &UserSession,
        method: Method,
        table: &str,
        query: Vec<(&'static str, String)>,
        prefer: &'static str,
        body: Option<&B>,
    ) -> AppResult<Vec<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.table_url(table);
        self.send_json(operation, || {
            let request = self
                .authorized(method.clone(), &url, session)
                .header("Prefer", prefer)
                .query(&query);
            match body {
                Some(body) => request.json(body),
                None => request,
            }
        })
        .await
    }
}

fn window_query(
    session: &UserSession,
    column: &'static str,
    window: &DateWindow,
    limit: usize,
) -> Vec<(&'static str, String)> {
    vec![
        ("select", "*".to_string()),
        ("user_id", format!("eq.{}", session.user_id)),
        (column, format!("gte.{}", window.from_date())),
        (column, format!("lte.{}", window.to_date())),
        ("order", format!("{column}.desc")),
        ("limit", limit.to_string()),
    ]
}

fn first_row<T>(rows: Vec<T>, operation: &str) -> AppResult<T> {
    rows.into_iter().next().ok_or_else(|| {
        AppError::remote(
            RemoteErrorCode::InvalidResponse,
            format!("{operation} returned no rows"),
        )
    })
}

fn map_http_error(status: StatusCode, correlation_id: &str, body: Option<String>) -> AppError {
    let details = body
        .filter(|text| !text.trim().is_empty())
        .map(|text| {
            let snippet: String = text.chars().take(BODY_SNIPPET_LIMIT).collect();
            json!({ "status": status.as_u16(), "body": snippet })
        })
        .or_else(|| Some(json!({ "status": status.as_u16() })));

    let (code, message) = match status {
        StatusCode::UNAUTHORIZED => (
            RemoteErrorCode::Unauthorized,
            "session is not authorized for this request".to_string(),
        ),
        StatusCode::FORBIDDEN => (
            RemoteErrorCode::Forbidden,
            "access to this resource is forbidden".to_string(),
        ),
        StatusCode::TOO_MANY_REQUESTS => (
            RemoteErrorCode::RateLimited,
            "backend is throttling requests, try again shortly".to_string(),
        ),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => (
            RemoteErrorCode::HttpTimeout,
            format!("backend timed out (status {})", status.as_u16()),
        ),
        status if status.is_server_error() => (
            RemoteErrorCode::BackendUnavailable,
            format!("backend temporarily unavailable (status {})", status.as_u16()),
        ),
        status if status.is_client_error() => (
            RemoteErrorCode::InvalidRequest,
            format!("backend rejected the request (status {})", status.as_u16()),
        ),
        status => (
            RemoteErrorCode::Unknown,
            format!("unexpected backend status {}", status.as_u16()),
        ),
    };

    AppError::remote_with_details(code, message, Some(correlation_id), details)
}

fn error_from_reqwest(err: reqwest::Error, correlation_id: &str) -> AppError {
    if err.is_timeout() {
        AppError::remote_with_details(
            RemoteErrorCode::HttpTimeout,
            "backend request timed out",
            Some(correlation_id),
            None,
        )
    } else if err.is_connect() {
        AppError::remote_with_details(
            RemoteErrorCode::BackendUnavailable,
            "could not connect to backend",
            Some(correlation_id),
            None,
        )
    } else if let Some(status) = err.status() {
        map_http_error(status, correlation_id, None)
    } else {
        AppError::remote_with_details(
            RemoteErrorCode::Unknown,
            format!("backend request failed: {err}"),
            Some(correlation_id),
            None,
        )
    }
}

// Wire rows, snake_case as served by the table API.

#[derive(Debug, Deserialize)]
struct CreditReportWire {
    id: Uuid,
    user_id: Uuid,
    score: i32,
    report_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl From<CreditReportWire> for CreditReportRecord {
    fn from(row: CreditReportWire) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            score: row.score,
            report_date: row.report_date,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScoreHistoryWire {
    id: Uuid,
    user_id: Uuid,
    score: i32,
    score_date: NaiveDate,
    #[serde(default)]
    change_amount: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<ScoreHistoryWire> for ScoreHistoryEntry {
    fn from(row: ScoreHistoryWire) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            score: row.score,
            score_date: row.score_date,
            change_amount: row.change_amount.unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProfileWire {
    id: Uuid,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<ProfileWire> for ProfileRecord {
    fn from(row: ProfileWire) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            avatar_url: row.avatar_url,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct ProfileUpsertWire<'a> {
    id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<&'a str>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct DocumentWire {
    id: Uuid,
    user_id: Uuid,
    name: String,
    #[serde(rename = "type")]
    mime_type: String,
    #[serde(default)]
    file_size: u64,
    file_url: String,
    uploaded_at: DateTime<Utc>,
}

impl From<DocumentWire> for DocumentRecord {
    fn from(row: DocumentWire) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            mime_type: row.mime_type,
            file_size: row.file_size,
            file_url: row.file_url,
            uploaded_at: row.uploaded_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct DocumentInsertWire<'a> {
    user_id: Uuid,
    name: &'a str,
    #[serde(rename = "type")]
    mime_type: &'a str,
    file_size: u64,
    file_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct UserSettingsWire {
    #[serde(default)]
    theme: Option<String>,
    #[serde(default)]
    custom_theme_colors: Option<JsonValue>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<UserSettingsWire> for StoredSettings {
    fn from(row: UserSettingsWire) -> Self {
        let custom_theme_colors = row.custom_theme_colors.and_then(|value| {
            serde_json::from_value::<ThemeColors>(value)
                .map_err(|err| {
                    warn!(target: "app::remote", error = %err, "discarding malformed theme colors");
                })
                .ok()
        });
        Self {
            theme_mode: row.theme,
            custom_theme_colors,
            language: row.language,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct UserSettingsUpsertWire<'a> {
    user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    theme: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_theme_colors: Option<&'a ThemeColors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'static str>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl CreditBackend for RestBackend {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn latest_credit_report(
        &self,
        session: &UserSession,
    ) -> AppResult<Option<CreditReportRecord>> {
        let rows: Vec<CreditReportWire> = self
            .select_rows(
                "latest_credit_report",
                session,
                "credit_reports",
                vec![
                    ("select", "*".to_string()),
                    ("user_id", format!("eq.{}", session.user_id)),
                    ("order", "report_date.desc".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next().map(CreditReportRecord::from))
    }

    async fn credit_reports_in_window(
        &self,
        session: &UserSession,
        window: &DateWindow,
        limit: usize,
    ) -> AppResult<Vec<CreditReportRecord>> {
        let rows: Vec<CreditReportWire> = self
            .select_rows(
                "credit_reports_in_window",
                session,
                "credit_reports",
                window_query(session, "report_date", window, limit),
            )
            .await?;
        Ok(rows.into_iter().map(CreditReportRecord::from).collect())
    }

    async fn score_history_in_window(
        &self,
        session: &UserSession,
        window: &DateWindow,
        limit: usize,
    ) -> AppResult<Vec<ScoreHistoryEntry>> {
        let rows: Vec<ScoreHistoryWire> = self
            .select_rows(
                "score_history_in_window",
                session,
                "score_history",
                window_query(session, "score_date", window, limit),
            )
            .await?;
        Ok(rows.into_iter().map(ScoreHistoryEntry::from).collect())
    }

    async fn fetch_profile(&self, session: &UserSession) -> AppResult<Option<ProfileRecord>> {
        let rows: Vec<ProfileWire> = self
            .select_rows(
                "fetch_profile",
                session,
                "profiles",
                vec![
                    ("select", "*".to_string()),
                    ("id", format!("eq.{}", session.user_id)),
                ],
            )
            .await?;
        Ok(rows.into_iter().next().map(ProfileRecord::from))
    }

    async fn update_profile(
        &self,
        session: &UserSession,
        patch: &ProfilePatch,
    ) -> AppResult<ProfileRecord> {
        let body = ProfileUpsertWire {
            id: session.user_id,
            first_name: patch.first_name.as_deref(),
            last_name: patch.last_name.as_deref(),
            email: patch.email.as_deref(),
            avatar_url: patch.avatar_url.as_deref(),
            updated_at: Utc::now(),
        };
        let rows: Vec<ProfileWire> = self
            .write_rows(
                "update_profile",
                session,
                Method::POST,
                "profiles",
                vec![("on_conflict", "id".to_string())],
                "resolution=merge-duplicates,return=representation",
                Some(&body),
            )
            .await?;
        first_row(rows, "update_profile").map(ProfileRecord::from)
    }

    async fn list_documents(&self, session: &UserSession) -> AppResult<Vec<DocumentRecord>> {
        let rows: Vec<DocumentWire> = self
            .select_rows(
                "list_documents",
                session,
                "documents",
                vec![
                    ("select", "*".to_string()),
                    ("user_id", format!("eq.{}", session.user_id)),
                    ("order", "uploaded_at.desc".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(DocumentRecord::from).collect())
    }

    async fn insert_document(
        &self,
        session: &UserSession,
        document: &DocumentInsert,
    ) -> AppResult<DocumentRecord> {
        let body = DocumentInsertWire {
            user_id: session.user_id,
            name: &document.name,
            mime_type: &document.mime_type,
            file_size: document.file_size,
            file_url: &document.file_url,
        };
        let rows: Vec<DocumentWire> = self
            .write_rows(
                "insert_document",
                session,
                Method::POST,
                "documents",
                Vec::new(),
                "return=representation",
                Some(&body),
            )
            .await?;
        first_row(rows, "insert_document").map(DocumentRecord::from)
    }

    async fn delete_document(&self, session: &UserSession, id: Uuid) -> AppResult<()> {
        let rows: Vec<DocumentWire> = self
            .write_rows::<_, JsonValue>(
                "delete_document",
                session,
                Method::DELETE,
                "documents",
                vec![
                    ("id", format!("eq.{id}")),
                    ("user_id", format!("eq.{}", session.user_id)),
                ],
                "return=representation",
                None,
            )
            .await?;
        if rows.is_empty() {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    async fn fetch_settings(&self, session: &UserSession) -> AppResult<Option<StoredSettings>> {
        let rows: Vec<UserSettingsWire> = self
            .select_rows(
                "fetch_settings",
                session,
                "user_settings",
                vec![
                    ("select", "*".to_string()),
                    ("user_id", format!("eq.{}", session.user_id)),
                ],
            )
            .await?;
        Ok(rows.into_iter().next().map(StoredSettings::from))
    }

    async fn upsert_settings(
        &self,
        session: &UserSession,
        patch: &SettingsPatch,
    ) -> AppResult<StoredSettings> {
        let body = UserSettingsUpsertWire {
            user_id: session.user_id,
            theme: patch.theme_mode.as_deref(),
            custom_theme_colors: patch.custom_theme_colors.as_ref(),
            language: patch.language.map(|language| language.code()),
            updated_at: Utc::now(),
        };
        let rows: Vec<UserSettingsWire> = self
            .write_rows(
                "upsert_settings",
                session,
                Method::POST,
                "user_settings",
                vec![("on_conflict", "user_id".to_string())],
                "resolution=merge-duplicates,return=representation",
                Some(&body),
            )
            .await?;
        first_row(rows, "upsert_settings").map(StoredSettings::from)
    }

    async fn upload_object(
        &self,
        session: &UserSession,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> AppResult<StoredObject> {
        let url = format!("{}{STORAGE_PATH}/{bucket}/{path}", self.base_url);
        let content_type = HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

        self.send_empty("upload_object", || {
            self.authorized(Method::POST, &url, session)
                .header(CONTENT_TYPE, content_type.clone())
                .header("x-upsert", "false")
                .body(bytes.clone())
        })
        .await?;

        Ok(StoredObject {
            bucket: bucket.to_string(),
            path: path.to_string(),
            public_url: self.public_object_url(bucket, path),
        })
    }
}

/// Exposes status mapping and URL building for integration tests.
pub mod testing {
    use super::*;

    pub fn map_http_error(status: StatusCode) -> AppError {
        super::map_http_error(status, "test-correlation-id", None)
    }
}
