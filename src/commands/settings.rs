use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::settings::{Language, Theme, ThemeColors, UserSettings};
use crate::services::i18n;
use crate::services::settings_service::PersistHandle;

use super::{notify, AppState, CommandResult, Notice, WriteOutcome};

/// A local settings change. The notice reflects the local update; the
/// handle resolves once the background write finishes.
pub struct SettingsUpdate {
    pub outcome: WriteOutcome<UserSettings>,
    pub persist: Option<PersistHandle>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    pub settings: UserSettings,
    pub last_custom_colors: ThemeColors,
    pub labels: Vec<TranslatedLabel>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranslatedLabel {
    pub key: &'static str,
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeUpdatePayload {
    pub theme: Theme,
}

pub fn settings_get(state: &AppState) -> CommandResult<SettingsPayload> {
    let context = state.settings()?;
    let settings = context.settings();
    let labels = i18n::keys()
        .into_iter()
        .map(|key| TranslatedLabel {
            key,
            text: i18n::translate(settings.language, key).to_string(),
        })
        .collect();

    Ok(SettingsPayload {
        last_custom_colors: context.last_custom_colors(),
        settings,
        labels,
    })
}

pub fn settings_set_theme(
    state: &AppState,
    payload: ThemeUpdatePayload,
) -> CommandResult<SettingsUpdate> {
    let context = state.settings()?;
    let mode = payload.theme.mode();
    let result = context.set_theme(payload.theme);
    Ok(into_update(
        "settings_set_theme",
        result.map(|handle| (context.settings(), handle)),
        |_| Notice::success("Theme Updated", format!("Theme changed to {mode}")),
    ))
}

pub fn settings_set_custom_colors(
    state: &AppState,
    colors: ThemeColors,
) -> CommandResult<SettingsUpdate> {
    let context = state.settings()?;
    let result = context.set_custom_colors(colors);
    Ok(into_update(
        "settings_set_custom_colors",
        result.map(|handle| (context.settings(), handle)),
        |_| {
            Notice::success(
                "Custom Colors Saved",
                "Your custom theme colors have been applied",
            )
        },
    ))
}

pub fn settings_set_language(state: &AppState, code: &str) -> CommandResult<SettingsUpdate> {
    let context = state.settings()?;
    let result = code.parse::<Language>().map(|language| {
        let handle = context.set_language(language);
        (context.settings(), handle)
    });
    Ok(into_update("settings_set_language", result, |settings| {
        Notice::success(
            "Language Updated",
            format!("Language changed to {}", settings.language.label()),
        )
    }))
}

fn into_update(
    operation: &'static str,
    result: AppResult<(UserSettings, PersistHandle)>,
    on_success: impl FnOnce(&UserSettings) -> Notice,
) -> SettingsUpdate {
    let (result, persist) = match result {
        Ok((settings, handle)) => (Ok(settings), Some(handle)),
        Err(error) => (Err(error), None),
    };
    SettingsUpdate {
        outcome: notify(operation, result, on_success, "Failed to update settings"),
        persist,
    }
}
