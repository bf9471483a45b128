use std::fmt;

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, error, warn};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorCode {
    Unauthorized,
    Forbidden,
    HttpTimeout,
    RateLimited,
    InvalidResponse,
    InvalidRequest,
    BackendUnavailable,
    Unknown,
}

impl RemoteErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            RemoteErrorCode::Unauthorized => "UNAUTHORIZED",
            RemoteErrorCode::Forbidden => "FORBIDDEN",
            RemoteErrorCode::HttpTimeout => "HTTP_TIMEOUT",
            RemoteErrorCode::RateLimited => "RATE_LIMITED",
            RemoteErrorCode::InvalidResponse => "INVALID_RESPONSE",
            RemoteErrorCode::InvalidRequest => "INVALID_REQUEST",
            RemoteErrorCode::BackendUnavailable => "BACKEND_UNAVAILABLE",
            RemoteErrorCode::Unknown => "UNKNOWN_REMOTE_ERROR",
        }
    }

    /// Transient failures worth another attempt at the accessor boundary.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            RemoteErrorCode::HttpTimeout
                | RemoteErrorCode::RateLimited
                | RemoteErrorCode::BackendUnavailable
        )
    }
}

impl fmt::Display for RemoteErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {message}")]
    Database { message: String },

    #[error("record not found")]
    NotFound,

    #[error("record conflict: {message}")]
    Conflict { message: String },

    #[error("validation failed: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        details: Option<JsonValue>,
    },

    #[error("{message}")]
    Remote {
        code: RemoteErrorCode,
        message: String,
        correlation_id: Option<String>,
        details: Option<JsonValue>,
    },

    #[error("not signed in")]
    Unauthenticated,

    #[error("request cancelled")]
    Cancelled,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, "validation error");
        AppError::Validation {
            message,
            source: None,
            details: None,
        }
    }

    pub fn validation_with_details(message: impl Into<String>, details: JsonValue) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, details = %details, "validation error with details");
        AppError::Validation {
            message,
            source: None,
            details: Some(details),
        }
    }

    pub fn remote(code: RemoteErrorCode, message: impl Into<String>) -> Self {
        Self::remote_with_details(code, message, None, None)
    }

    pub fn remote_with_details(
        code: RemoteErrorCode,
        message: impl Into<String>,
        correlation_id: Option<&str>,
        details: Option<JsonValue>,
    ) -> Self {
        let message = message.into();
        let correlation = correlation_id.map(|value| value.to_string());
        match (&correlation, &details) {
            (Some(id), Some(payload)) => {
                warn!(
                    target: "app::remote::error",
                    code = %code,
                    correlation_id = %id,
                    details = %payload,
                    %message
                );
            }
            (Some(id), None) => {
                warn!(
                    target: "app::remote::error",
                    code = %code,
                    correlation_id = %id,
                    %message
                );
            }
            (None, Some(payload)) => {
                warn!(target: "app::remote::error", code = %code, details = %payload, %message);
            }
            (None, None) => {
                warn!(target: "app::remote::error", code = %code, %message);
            }
        }

        AppError::Remote {
            code,
            message,
            correlation_id: correlation,
            details,
        }
    }

    pub fn remote_code(&self) -> Option<RemoteErrorCode> {
        match self {
            AppError::Remote { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.remote_code().is_some_and(RemoteErrorCode::is_transient)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::conflict", %message, "conflict error");
        AppError::Conflict { message }
    }

    pub fn not_found() -> Self {
        warn!(target: "app::database", "resource not found");
        AppError::NotFound
    }

    pub fn unauthenticated() -> Self {
        warn!(target: "app::session", "operation requires a signed-in session");
        AppError::Unauthenticated
    }

    pub fn cancelled() -> Self {
        debug!(target: "app::view", "request cancelled");
        AppError::Cancelled
    }

    pub fn database(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::database", %message, "database error");
        AppError::Database { message }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::other", %message, "other error");
        AppError::Other(message)
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        use rusqlite::Error::{QueryReturnedNoRows, SqliteFailure};
        use rusqlite::ErrorCode;

        match &error {
            QueryReturnedNoRows => AppError::not_found(),
            SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation => {
                AppError::conflict("unique or check constraint violated")
            }
            _ => {
                error!(target: "app::database", error = ?error, "sqlite error");
                AppError::database(error.to_string())
            }
        }
    }
}
