use std::convert::TryFrom;

use chrono::{DateTime, Utc};
use rusqlite::{named_params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{format_timestamp, parse_timestamp, parse_uuid};
use crate::error::{AppError, AppResult};
use crate::models::profile::{ProfilePatch, ProfileRecord};

#[derive(Debug, Clone)]
pub struct ProfileRow {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<&Row<'_>> for ProfileRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        let id: String = row.get("id")?;
        let updated_at: Option<String> = row.get("updated_at")?;
        Ok(Self {
            id: parse_uuid(0, &id)?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            email: row.get("email")?,
            avatar_url: row.get("avatar_url")?,
            updated_at: updated_at
                .as_deref()
                .map(|raw| parse_timestamp(5, raw))
                .transpose()?,
        })
    }
}

impl From<ProfileRow> for ProfileRecord {
    fn from(row: ProfileRow) -> Self {
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

pub struct ProfileRepository;

impl ProfileRepository {
    pub fn find(conn: &Connection, user_id: Uuid) -> AppResult<Option<ProfileRecord>> {
        let row = conn
            .query_row(
                "SELECT id, first_name, last_name, email, avatar_url, updated_at FROM profiles WHERE id = ?1",
                [user_id.to_string()],
                |row| ProfileRow::try_from(row),
            )
            .optional()?;
        Ok(row.map(ProfileRecord::from))
    }

    /// Writes the columns present in `patch`, creating the row on first use.
    pub fn upsert(
        conn: &Connection,
        user_id: Uuid,
        patch: &ProfilePatch,
        now: DateTime<Utc>,
    ) -> AppResult<ProfileRecord> {
        conn.execute(
            r#"
                INSERT INTO profiles (id, first_name, last_name, email, avatar_url, updated_at)
                VALUES (:id, :first_name, :last_name, :email, :avatar_url, :updated_at)
                ON CONFLICT(id) DO UPDATE SET
                    first_name = COALESCE(excluded.first_name, profiles.first_name),
                    last_name = COALESCE(excluded.last_name, profiles.last_name),
                    email = COALESCE(excluded.email, profiles.email),
                    avatar_url = COALESCE(excluded.avatar_url, profiles.avatar_url),
                    updated_at = excluded.updated_at
            "#,
            named_params! {
                ":id": user_id.to_string(),
                ":first_name": patch.first_name,
                ":last_name": patch.last_name,
                ":email": patch.email,
                ":avatar_url": patch.avatar_url,
                ":updated_at": format_timestamp(now),
            },
        )?;

        Self::find(conn, user_id)?.ok_or(AppError::NotFound)
    }
}
