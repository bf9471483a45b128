use std::convert::TryFrom;

use chrono::NaiveDate;
use rusqlite::{named_params, Connection, Row};
use uuid::Uuid;

use crate::db::{format_date, format_timestamp, parse_date, parse_timestamp, parse_uuid};
use crate::error::AppResult;
use crate::models::credit::ScoreHistoryEntry;

#[derive(Debug, Clone)]
pub struct ScoreHistoryRow(pub ScoreHistoryEntry);

impl TryFrom<&Row<'_>> for ScoreHistoryRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        let id: String = row.get("id")?;
        let user_id: String = row.get("user_id")?;
        let score_date: String = row.get("score_date")?;
        let created_at: String = row.get("created_at")?;
        Ok(Self(ScoreHistoryEntry {
            id: parse_uuid(0, &id)?,
            user_id: parse_uuid(1, &user_id)?,
            score: row.get("score")?,
            score_date: parse_date(3, &score_date)?,
            change_amount: row.get("change_amount")?,
            created_at: parse_timestamp(5, &created_at)?,
        }))
    }
}

pub struct ScoreHistoryRepository;

impl ScoreHistoryRepository {
    pub fn insert(conn: &Connection, entry: &ScoreHistoryEntry) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO score_history (id, user_id, score, score_date, change_amount, created_at)
                VALUES (:id, :user_id, :score, :score_date, :change_amount, :created_at)
            "#,
            named_params! {
                ":id": entry.id.to_string(),
                ":user_id": entry.user_id.to_string(),
                ":score": entry.score,
                ":score_date": format_date(entry.score_date),
                ":change_amount": entry.change_amount,
                ":created_at": format_timestamp(entry.created_at),
            },
        )?;
        Ok(())
    }

    /// Newest first, `from` and `to` inclusive.
    pub fn list_in_range(
        conn: &Connection,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        limit: usize,
    ) -> AppResult<Vec<ScoreHistoryEntry>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, user_id, score, score_date, change_amount, created_at
                FROM score_history
                WHERE user_id = :user_id AND score_date >= :from AND score_date <= :to
                ORDER BY score_date DESC, created_at DESC
                LIMIT :limit
            "#,
        )?;
        let rows = stmt
            .query_map(
                named_params! {
                    ":user_id": user_id.to_string(),
                    ":from": format_date(from),
                    ":to": format_date(to),
                    ":limit": limit as i64,
                },
                |row| ScoreHistoryRow::try_from(row),
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows.into_iter().map(|row| row.0).collect())
    }
}
