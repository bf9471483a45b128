use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AppError, AppResult};

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid hex color pattern"));

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            primary: "#ea580c".to_string(),
            secondary: "#2563eb".to_string(),
            accent: "#059669".to_string(),
            background: "#ffffff".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn validate(&self) -> AppResult<()> {
        for (name, value) in [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("accent", &self.accent),
            ("background", &self.background),
        ] {
            if !HEX_COLOR.is_match(value.trim()) {
                return Err(AppError::validation_with_details(
                    format!("{name} must be a #rrggbb color"),
                    serde_json::json!({ "field": name, "value": value }),
                ));
            }
        }
        Ok(())
    }

    pub fn normalized(&self) -> Self {
        Self {
            primary: self.primary.trim().to_lowercase(),
            secondary: self.secondary.trim().to_lowercase(),
            accent: self.accent.trim().to_lowercase(),
            background: self.background.trim().to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", content = "colors", rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    System,
    Custom(ThemeColors),
}

impl Default for Theme {
    fn default() -> Self {
        Theme::System
    }
}

impl Theme {
    pub fn mode(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
            Theme::Custom(_) => "custom",
        }
    }

    /// Rebuilds the theme from its two storage columns. Unknown modes fall
    /// back to `system`; a custom mode without stored colors uses the defaults.
    pub fn from_columns(mode: Option<&str>, colors: Option<ThemeColors>) -> Self {
        match mode.map(|value| value.trim().to_lowercase()).as_deref() {
            Some("light") => Theme::Light,
            Some("dark") => Theme::Dark,
            Some("custom") => Theme::Custom(colors.unwrap_or_default()),
            Some("system") | None => Theme::System,
            Some(other) => {
                warn!(target: "app::settings", theme = other, "unknown stored theme, using system");
                Theme::System
            }
        }
    }

    pub fn custom_colors(&self) -> Option<&ThemeColors> {
        match self {
            Theme::Custom(colors) => Some(colors),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    Fr,
    De,
    It,
    Pt,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::En,
        Language::Es,
        Language::Fr,
        Language::De,
        Language::It,
        Language::Pt,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
            Language::It => "it",
            Language::Pt => "pt",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Español",
            Language::Fr => "Français",
            Language::De => "Deutsch",
            Language::It => "Italiano",
            Language::Pt => "Português",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        Language::ALL
            .iter()
            .copied()
            .find(|language| language.code() == normalized)
            .ok_or_else(|| AppError::validation(format!("unsupported language: {normalized}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub theme: Theme,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            language: Language::En,
            updated_at: None,
        }
    }
}

/// Storage-level write for the `user_settings` row; absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub theme_mode: Option<String>,
    pub custom_theme_colors: Option<ThemeColors>,
    pub language: Option<Language>,
}

impl SettingsPatch {
    pub fn theme(theme: &Theme) -> Self {
        Self {
            theme_mode: Some(theme.mode().to_string()),
            custom_theme_colors: theme.custom_colors().cloned(),
            language: None,
        }
    }

    pub fn language(language: Language) -> Self {
        Self {
            language: Some(language),
            ..Self::default()
        }
    }
}

/// Raw `user_settings` columns as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSettings {
    pub theme_mode: Option<String>,
    pub custom_theme_colors: Option<ThemeColors>,
    pub language: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredSettings {
    pub fn into_settings(self) -> UserSettings {
        let language = match self.language.as_deref() {
            Some(code) => code.parse::<Language>().unwrap_or_else(|_| {
                warn!(target: "app::settings", language = code, "unknown stored language, using en");
                Language::En
            }),
            None => Language::En,
        };

        UserSettings {
            theme: Theme::from_columns(self.theme_mode.as_deref(), self.custom_theme_colors),
            language,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_round_trips_through_storage_columns() {
        let colors = ThemeColors {
            primary: "#112233".into(),
            ..ThemeColors::default()
        };
        let theme = Theme::Custom(colors.clone());
        let patch = SettingsPatch::theme(&theme);
        assert_eq!(patch.theme_mode.as_deref(), Some("custom"));
        assert_eq!(
            Theme::from_columns(patch.theme_mode.as_deref(), patch.custom_theme_colors),
            Theme::Custom(colors)
        );
        assert_eq!(Theme::from_columns(Some("neon"), None), Theme::System);
        assert_eq!(
            Theme::from_columns(Some("custom"), None),
            Theme::Custom(ThemeColors::default())
        );
    }

    #[test]
    fn theme_serializes_with_inline_colors() {
        let json = serde_json::to_value(Theme::Dark).unwrap();
        assert_eq!(json, serde_json::json!({"mode": "dark"}));
        let custom = serde_json::to_value(Theme::Custom(ThemeColors::default())).unwrap();
        assert_eq!(custom["mode"], "custom");
        assert_eq!(custom["colors"]["primary"], "#ea580c");
    }

    #[test]
    fn color_validation_rejects_short_hex() {
        let mut colors = ThemeColors::default();
        assert!(colors.validate().is_ok());
        colors.accent = "#fff".into();
        assert!(colors.validate().is_err());
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let settings = StoredSettings {
            language: Some("klingon".into()),
            ..StoredSettings::default()
        }
        .into_settings();
        assert_eq!(settings.language, Language::En);
        assert_eq!("PT".parse::<Language>().unwrap(), Language::Pt);
    }
}
