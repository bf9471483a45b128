//! Per-session appearance and language preferences.
//!
//! Settings are read once when the session starts. Every change is applied
//! to the in-memory copy first and then persisted in the background; pages
//! read from the context and never go back to the store themselves.

use std::sync::{Arc, RwLock};

use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::models::session::UserSession;
use crate::models::settings::{Language, SettingsPatch, Theme, ThemeColors, UserSettings};
use crate::services::backend::CreditBackend;
use crate::services::i18n;

/// Completion of one background write. Awaiting it is optional; a dropped
/// handle does not cancel the write.
pub type PersistHandle = JoinHandle<AppResult<()>>;

#[derive(Debug, Clone, Default)]
struct LocalSettings {
    settings: UserSettings,
    last_custom_colors: ThemeColors,
}

pub struct SettingsContext {
    backend: Arc<dyn CreditBackend>,
    session: UserSession,
    state: RwLock<LocalSettings>,
    persist_lock: AsyncMutex<()>,
}

impl SettingsContext {
    /// Reads the stored row once. A failed read is logged and the defaults
    /// are used instead.
    pub async fn load(backend: Arc<dyn CreditBackend>, session: UserSession) -> Arc<Self> {
        let settings = match backend.fetch_settings(&session).await {
            Ok(Some(stored)) => stored.into_settings(),
            Ok(None) => {
                debug!(target: "app::settings", user_id = %session.user_id, "no stored settings, using defaults");
                UserSettings::default()
            }
            Err(error) => {
                warn!(
                    target: "app::settings",
                    user_id = %session.user_id,
                    error = %error,
                    "failed to load settings, using defaults"
                );
                UserSettings::default()
            }
        };

        Self::with_settings(backend, session, settings)
    }

    pub fn with_settings(
        backend: Arc<dyn CreditBackend>,
        session: UserSession,
        settings: UserSettings,
    ) -> Arc<Self> {
        let last_custom_colors = settings.theme.custom_colors().cloned().unwrap_or_default();
        Arc::new(Self {
            backend,
            session,
            state: RwLock::new(LocalSettings {
                settings,
                last_custom_colors,
            }),
            persist_lock: AsyncMutex::new(()),
        })
    }

    pub fn settings(&self) -> UserSettings {
        self.read(|local| local.settings.clone())
    }

    pub fn theme(&self) -> Theme {
        self.read(|local| local.settings.theme.clone())
    }

    pub fn language(&self) -> Language {
        self.read(|local| local.settings.language)
    }

    /// Colors last used for the custom theme, kept while another mode is active.
    pub fn last_custom_colors(&self) -> ThemeColors {
        self.read(|local| local.last_custom_colors.clone())
    }

    pub fn translate<'a>(&self, key: &'a str) -> &'a str {
        i18n::translate(self.language(), key)
    }

    pub fn set_theme(self: &Arc<Self>, theme: Theme) -> AppResult<PersistHandle> {
        let theme = match theme {
            Theme::Custom(colors) => {
                colors.validate()?;
                Theme::Custom(colors.normalized())
            }
            other => other,
        };

        info!(target: "app::settings", mode = theme.mode(), "theme changed");
        self.write(|local| {
            if let Some(colors) = theme.custom_colors() {
                local.last_custom_colors = colors.clone();
            }
            local.settings.theme = theme;
        });
        Ok(self.persist())
    }

    /// Switches to the custom theme with `colors`.
    pub fn set_custom_colors(self: &Arc<Self>, colors: ThemeColors) -> AppResult<PersistHandle> {
        self.set_theme(Theme::Custom(colors))
    }

    pub fn set_language(self: &Arc<Self>, language: Language) -> PersistHandle {
        info!(target: "app::settings", language = language.code(), "language changed");
        self.write(|local| local.settings.language = language);
        self.persist()
    }

    /// Writes the current local state. Writes are serialized and each one
    /// snapshots the state when it runs, so the store converges on the
    /// latest local value.
    fn persist(self: &Arc<Self>) -> PersistHandle {
        let context = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = context.persist_lock.lock().await;
            let settings = context.settings();
            let patch = SettingsPatch {
                language: Some(settings.language),
                ..SettingsPatch::theme(&settings.theme)
            };

            match context.backend.upsert_settings(&context.session, &patch).await {
                Ok(_) => {
                    debug!(target: "app::settings", user_id = %context.session.user_id, "settings persisted");
                    Ok(())
                }
                Err(error) => {
                    warn!(
                        target: "app::settings",
                        user_id = %context.session.user_id,
                        error = %error,
                        "failed to persist settings"
                    );
                    Err(error)
                }
            }
        })
    }

    fn read<R>(&self, f: impl FnOnce(&LocalSettings) -> R) -> R {
        match self.state.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn write(&self, f: impl FnOnce(&mut LocalSettings)) {
        let mut guard = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard);
    }
}
