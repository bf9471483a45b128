use std::convert::TryFrom;

use chrono::{DateTime, Utc};
use rusqlite::{named_params, Connection, OptionalExtension, Row};
use tracing::warn;
use uuid::Uuid;

use crate::db::{format_timestamp, parse_timestamp};
use crate::error::{AppError, AppResult};
use crate::models::settings::{SettingsPatch, StoredSettings, ThemeColors};

#[derive(Debug, Clone)]
pub struct UserSettingsRow {
    pub theme: Option<String>,
    pub custom_theme_colors: Option<String>,
    pub language: Option<String>,
    pub updated_at: Option<String>,
}

impl TryFrom<&Row<'_>> for UserSettingsRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            theme: row.get("theme")?,
            custom_theme_colors: row.get("custom_theme_colors")?,
            language: row.get("language")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl UserSettingsRow {
    fn into_stored(self) -> Result<StoredSettings, rusqlite::Error> {
        let custom_theme_colors = self.custom_theme_colors.as_deref().and_then(|raw| {
            serde_json::from_str::<ThemeColors>(raw)
                .map_err(|err| {
                    warn!(target: "app::db", error = %err, "discarding malformed theme colors");
                })
                .ok()
        });
        Ok(StoredSettings {
            theme_mode: self.theme,
            custom_theme_colors,
            language: self.language,
            updated_at: self
                .updated_at
                .as_deref()
                .map(|raw| parse_timestamp(3, raw))
                .transpose()?,
        })
    }
}

pub struct UserSettingsRepository;

impl UserSettingsRepository {
    pub fn get(conn: &Connection, user_id: Uuid) -> AppResult<Option<StoredSettings>> {
        let row = conn
            .query_row(
                "SELECT theme, custom_theme_colors, language, updated_at FROM user_settings WHERE user_id = ?1",
                [user_id.to_string()],
                |row| UserSettingsRow::try_from(row),
            )
            .optional()?;

        match row {
            Some(row) => Ok(Some(row.into_stored()?)),
            None => Ok(None),
        }
    }

    /// Single-row upsert keyed by user; columns absent from `patch` keep
    /// their stored value.
    pub fn upsert(
        conn: &Connection,
        user_id: Uuid,
        patch: &SettingsPatch,
        now: DateTime<Utc>,
    ) -> AppResult<StoredSettings> {
        let colors = patch
            .custom_theme_colors
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        conn.execute(
            r#"
                INSERT INTO user_settings (user_id, theme, custom_theme_colors, language, updated_at)
                VALUES (:user_id, :theme, :colors, :language, :updated_at)
                ON CONFLICT(user_id) DO UPDATE SET
                    theme = COALESCE(excluded.theme, user_settings.theme),
                    custom_theme_colors = COALESCE(excluded.custom_theme_colors, user_settings.custom_theme_colors),
                    language = COALESCE(excluded.language, user_settings.language),
                    updated_at = excluded.updated_at
            "#,
            named_params! {
                ":user_id": user_id.to_string(),
                ":theme": patch.theme_mode,
                ":colors": colors,
                ":language": patch.language.map(|language| language.code()),
                ":updated_at": format_timestamp(now),
            },
        )?;

        Self::get(conn, user_id)?.ok_or(AppError::NotFound)
    }
}
