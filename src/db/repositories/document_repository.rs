use std::convert::TryFrom;

use chrono::{DateTime, Utc};
use rusqlite::{named_params, Connection, Row};
use uuid::Uuid;

use crate::db::{format_timestamp, parse_timestamp, parse_uuid};
use crate::error::{AppError, AppResult};
use crate::models::document::{DocumentInsert, DocumentRecord};

#[derive(Debug, Clone)]
pub struct DocumentRow(pub DocumentRecord);

impl TryFrom<&Row<'_>> for DocumentRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        let id: String = row.get("id")?;
        let user_id: String = row.get("user_id")?;
        let file_size: i64 = row.get("file_size")?;
        let uploaded_at: String = row.get("uploaded_at")?;
        Ok(Self(DocumentRecord {
            id: parse_uuid(0, &id)?,
            user_id: parse_uuid(1, &user_id)?,
            name: row.get("name")?,
            mime_type: row.get("type")?,
            file_size: u64::try_from(file_size).unwrap_or_default(),
            file_url: row.get("file_url")?,
            uploaded_at: parse_timestamp(6, &uploaded_at)?,
        }))
    }
}

pub struct DocumentRepository;

impl DocumentRepository {
    pub fn list(conn: &Connection, user_id: Uuid) -> AppResult<Vec<DocumentRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, user_id, name, type, file_size, file_url, uploaded_at
                FROM documents
                WHERE user_id = ?1
                ORDER BY uploaded_at DESC
            "#,
        )?;
        let rows = stmt
            .query_map([user_id.to_string()], |row| DocumentRow::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().map(|row| row.0).collect())
    }

    pub fn insert(
        conn: &Connection,
        user_id: Uuid,
        document: &DocumentInsert,
        uploaded_at: DateTime<Utc>,
    ) -> AppResult<DocumentRecord> {
        let file_size = i64::try_from(document.file_size)
            .map_err(|_| AppError::validation("file size exceeds storage limits"))?;
        let record = DocumentRecord {
            id: Uuid::new_v4(),
            user_id,
            name: document.name.clone(),
            mime_type: document.mime_type.clone(),
            file_size: document.file_size,
            file_url: document.file_url.clone(),
            uploaded_at,
        };

        conn.execute(
            r#"
                INSERT INTO documents (id, user_id, name, type, file_size, file_url, uploaded_at)
                VALUES (:id, :user_id, :name, :type, :file_size, :file_url, :uploaded_at)
            "#,
            named_params! {
                ":id": record.id.to_string(),
                ":user_id": user_id.to_string(),
                ":name": record.name,
                ":type": record.mime_type,
                ":file_size": file_size,
                ":file_url": record.file_url,
                ":uploaded_at": format_timestamp(uploaded_at),
            },
        )?;

        Ok(record)
    }

    /// Deletes one of the caller's documents; other users' rows are never touched.
    pub fn delete(conn: &Connection, user_id: Uuid, id: Uuid) -> AppResult<()> {
        let affected = conn.execute(
            "DELETE FROM documents WHERE id = ?1 AND user_id = ?2",
            [id.to_string(), user_id.to_string()],
        )?;
        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }
}
