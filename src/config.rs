use std::path::PathBuf;
use std::time::Duration as StdDuration;

use tracing::warn;

use crate::services::retry::RetryPolicy;

const ENV_BACKEND_URL: &str = "CREDITAI_BACKEND_URL";
const ENV_BACKEND_KEY: &str = "CREDITAI_BACKEND_KEY";
const ENV_DATA_DIR: &str = "CREDITAI_DATA_DIR";
const ENV_HTTP_TIMEOUT_SECS: &str = "CREDITAI_HTTP_TIMEOUT_SECS";
const ENV_RETRY_MAX_ATTEMPTS: &str = "CREDITAI_RETRY_MAX_ATTEMPTS";
const ENV_RETRY_BASE_DELAY_MS: &str = "CREDITAI_RETRY_BASE_DELAY_MS";
const ENV_HISTORY_LIMIT: &str = "CREDITAI_HISTORY_LIMIT";

const DEFAULT_DATA_DIR: &str = ".creditai";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HISTORY_LIMIT: usize = 50;
const LOCAL_DB_FILE: &str = "creditai.sqlite";

/// Where rows live: the hosted backend or the embedded SQLite mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendMode {
    Remote { base_url: String, api_key: String },
    Local { db_path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendMode,
    pub data_dir: PathBuf,
    pub http_timeout: StdDuration,
    pub retry: RetryPolicy,
    pub history_limit: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let data_dir = std::env::var(ENV_DATA_DIR)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let base_url = non_empty_env(ENV_BACKEND_URL);
        let api_key = non_empty_env(ENV_BACKEND_KEY);
        let backend = match (base_url, api_key) {
            (Some(base_url), Some(api_key)) => BackendMode::Remote {
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key,
            },
            (Some(_), None) | (None, Some(_)) => {
                warn!(
                    target: "app::config",
                    "backend url and key must both be set, falling back to local store"
                );
                BackendMode::Local {
                    db_path: data_dir.join(LOCAL_DB_FILE),
                }
            }
            (None, None) => BackendMode::Local {
                db_path: data_dir.join(LOCAL_DB_FILE),
            },
        };

        let http_timeout =
            StdDuration::from_secs(parse_env(ENV_HTTP_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT_SECS));

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: parse_env(ENV_RETRY_MAX_ATTEMPTS, defaults.max_attempts).max(1),
            base_delay: StdDuration::from_millis(parse_env(
                ENV_RETRY_BASE_DELAY_MS,
                defaults.base_delay.as_millis() as u64,
            )),
            ..defaults
        };

        let history_limit = parse_env(ENV_HISTORY_LIMIT, DEFAULT_HISTORY_LIMIT).max(1);

        Self {
            backend,
            data_dir,
            http_timeout,
            retry,
            history_limit,
        }
    }

    /// Local-only configuration rooted at `data_dir`, used by tests and demo mode.
    pub fn local(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            backend: BackendMode::Local {
                db_path: data_dir.join(LOCAL_DB_FILE),
            },
            data_dir,
            http_timeout: StdDuration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match non_empty_env(key) {
        Some(raw) => match raw.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(target: "app::config", key, value = %raw, "invalid value, using default");
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_config_places_database_under_data_dir() {
        let config = AppConfig::local("/tmp/creditai-test");
        assert_eq!(
            config.backend,
            BackendMode::Local {
                db_path: PathBuf::from("/tmp/creditai-test/creditai.sqlite")
            }
        );
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/creditai-test/logs"));
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn unparsable_numbers_fall_back_to_defaults() {
        assert_eq!(parse_env("CREDITAI_TEST_UNSET_NUMBER", 7u32), 7);
    }
}
