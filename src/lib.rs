pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use tracing::info;

use crate::commands::AppState;
use crate::config::AppConfig;
use crate::error::AppResult;

/// Installs logging under the configured data directory and builds the
/// shared state for the selected backend.
pub fn bootstrap(config: &AppConfig) -> AppResult<AppState> {
    std::fs::create_dir_all(&config.data_dir)?;
    crate::utils::logger::init_logging(&config.log_dir())?;

    let state = AppState::new(config)?;
    info!(
        target: "app::bootstrap",
        data_dir = %config.data_dir.display(),
        history_limit = config.history_limit,
        "creditai core started"
    );
    Ok(state)
}
