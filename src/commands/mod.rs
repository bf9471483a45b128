pub mod dashboard;
pub mod demo;
pub mod documents;
pub mod profile;
pub mod settings;

use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::{error, info, warn};

use crate::config::{AppConfig, BackendMode};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::session::UserSession;
use crate::services::backend::CreditBackend;
use crate::services::dashboard_service::DashboardService;
use crate::services::document_service::DocumentService;
use crate::services::local_backend::LocalBackend;
use crate::services::profile_service::ProfileService;
use crate::services::rest_backend::RestBackend;
use crate::services::settings_service::SettingsContext;

#[derive(Clone)]
pub struct AppState {
    backend: Arc<dyn CreditBackend>,
    dashboard_service: Arc<DashboardService>,
    profile_service: Arc<ProfileService>,
    document_service: Arc<DocumentService>,
    session: Arc<RwLock<Option<ActiveSession>>>,
}

struct ActiveSession {
    session: UserSession,
    settings: Arc<SettingsContext>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let backend: Arc<dyn CreditBackend> = match &config.backend {
            BackendMode::Remote { base_url, api_key } => Arc::new(RestBackend::try_new(
                base_url,
                api_key.clone(),
                config.http_timeout,
                config.retry.clone(),
            )?),
            BackendMode::Local { db_path } => {
                Arc::new(LocalBackend::new(DbPool::new(db_path.clone())?))
            }
        };

        info!(target: "app::command", backend = backend.name(), "application state ready");
        Ok(Self::with_backend(backend, config.history_limit))
    }

    pub fn with_backend(backend: Arc<dyn CreditBackend>, history_limit: usize) -> Self {
        Self {
            dashboard_service: Arc::new(DashboardService::new(
                Arc::clone(&backend),
                history_limit,
            )),
            profile_service: Arc::new(ProfileService::new(Arc::clone(&backend))),
            document_service: Arc::new(DocumentService::new(Arc::clone(&backend))),
            backend,
            session: Arc::new(RwLock::new(None)),
        }
    }

    pub fn backend(&self) -> Arc<dyn CreditBackend> {
        Arc::clone(&self.backend)
    }

    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard_service)
    }

    pub fn profile(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profile_service)
    }

    pub fn documents(&self) -> Arc<DocumentService> {
        Arc::clone(&self.document_service)
    }

    /// Starts a signed-in session and loads its settings once.
    pub async fn sign_in(&self, session: UserSession) -> Arc<SettingsContext> {
        let settings = SettingsContext::load(self.backend(), session.clone()).await;
        info!(target: "app::session", user_id = %session.user_id, "session attached");

        let mut guard = self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(ActiveSession {
            session,
            settings: Arc::clone(&settings),
        });
        settings
    }

    pub fn sign_out(&self) {
        let mut guard = self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(active) = guard.take() {
            info!(target: "app::session", user_id = %active.session.user_id, "session detached");
        }
    }

    pub fn has_session(&self) -> bool {
        self.with_session(|active| active.is_some())
    }

    pub fn require_session(&self) -> AppResult<UserSession> {
        self.with_session(|active| active.map(|active| active.session.clone()))
            .ok_or_else(AppError::unauthenticated)
    }

    pub fn settings(&self) -> AppResult<Arc<SettingsContext>> {
        self.with_session(|active| active.map(|active| Arc::clone(&active.settings)))
            .ok_or_else(AppError::unauthenticated)
    }

    fn with_session<R>(&self, f: impl FnOnce(Option<&ActiveSession>) -> R) -> R {
        match self.session.read() {
            Ok(guard) => f(guard.as_ref()),
            Err(poisoned) => f(poisoned.into_inner().as_ref()),
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Validation {
                message, details, ..
            } => CommandError::new("VALIDATION_ERROR", message, details),
            AppError::NotFound => {
                CommandError::new("NOT_FOUND", "The requested record does not exist", None)
            }
            AppError::Conflict { message } => CommandError::new("CONFLICT", message, None),
            AppError::Remote {
                code,
                message,
                correlation_id,
                details,
            } => {
                let mut merged = JsonMap::new();
                if let Some(existing) = details {
                    match existing {
                        JsonValue::Object(map) => {
                            for (key, value) in map {
                                merged.insert(key, value);
                            }
                        }
                        value => {
                            merged.insert("info".to_string(), value);
                        }
                    }
                }
                if let Some(id) = correlation_id {
                    merged.insert("correlationId".to_string(), JsonValue::String(id));
                }
                let detail_value = if merged.is_empty() {
                    None
                } else {
                    Some(JsonValue::Object(merged))
                };
                CommandError::new(code.as_str(), message, detail_value)
            }
            AppError::Unauthenticated => {
                CommandError::new("UNAUTHENTICATED", "Please sign in to continue", None)
            }
            AppError::Cancelled => CommandError::new("CANCELLED", "The request was cancelled", None),
            AppError::Database { message } => {
                error!(target: "app::command", %message, "database error in command");
                CommandError::new("UNKNOWN", message, None)
            }
            AppError::Serialization(error) => {
                error!(target: "app::command", error = %error, "serialization error in command");
                CommandError::new("UNKNOWN", "Failed to encode or decode data", None)
            }
            AppError::Io(error) => {
                error!(target: "app::command", error = %error, "io error in command");
                CommandError::new("UNKNOWN", "File system access failed", None)
            }
            AppError::Other(message) => {
                error!(target: "app::command", %message, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Success,
    Destructive,
}

/// Transient toast shown after a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Success,
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            description: description.into(),
            variant: NoticeVariant::Destructive,
        }
    }
}

/// Result of a write command: the new value when it succeeded plus the
/// notice to show either way.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    pub notice: Notice,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl<T> WriteOutcome<T> {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Folds a write result into a notice. Failures are logged and reported,
/// never retried here.
pub(crate) fn notify<T>(
    operation: &'static str,
    result: AppResult<T>,
    on_success: impl FnOnce(&T) -> Notice,
    failure_message: &str,
) -> WriteOutcome<T> {
    match result {
        Ok(value) => WriteOutcome {
            notice: on_success(&value),
            value: Some(value),
            error: None,
        },
        Err(error) => {
            warn!(target: "app::command", operation, error = %error, "write failed");
            let description = match &error {
                AppError::Validation { message, .. } => message.clone(),
                _ => failure_message.to_string(),
            };
            WriteOutcome {
                value: None,
                notice: Notice::error(description),
                error: Some(CommandError::from(error)),
            }
        }
    }
}

/// Reads degrade to an empty value; the failure is only logged.
pub(crate) fn recover<T: Default>(operation: &'static str, result: AppResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(error) => {
            warn!(target: "app::command", operation, error = %error, "read failed, using empty result");
            T::default()
        }
    }
}
