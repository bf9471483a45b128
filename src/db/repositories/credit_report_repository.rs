use std::convert::TryFrom;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{named_params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{format_date, format_timestamp, parse_date, parse_timestamp, parse_uuid};
use crate::error::AppResult;
use crate::models::credit::CreditReportRecord;

const COLUMNS: &str = "id, user_id, score, report_date, created_at";

#[derive(Debug, Clone)]
pub struct CreditReportRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub score: i32,
    pub report_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&Row<'_>> for CreditReportRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        let id: String = row.get("id")?;
        let user_id: String = row.get("user_id")?;
        let report_date: String = row.get("report_date")?;
        let created_at: String = row.get("created_at")?;
        Ok(Self {
            id: parse_uuid(0, &id)?,
            user_id: parse_uuid(1, &user_id)?,
            score: row.get("score")?,
            report_date: parse_date(3, &report_date)?,
            created_at: parse_timestamp(4, &created_at)?,
        })
    }
}

impl From<CreditReportRow> for CreditReportRecord {
    fn from(row: CreditReportRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            score: row.score,
            report_date: row.report_date,
            created_at: row.created_at,
        }
    }
}

pub struct CreditReportRepository;

impl CreditReportRepository {
    pub fn insert(conn: &Connection, record: &CreditReportRecord) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO credit_reports (id, user_id, score, report_date, created_at)
                VALUES (:id, :user_id, :score, :report_date, :created_at)
            "#,
            named_params! {
                ":id": record.id.to_string(),
                ":user_id": record.user_id.to_string(),
                ":score": record.score,
                ":report_date": format_date(record.report_date),
                ":created_at": format_timestamp(record.created_at),
            },
        )?;
        Ok(())
    }

    pub fn latest(conn: &Connection, user_id: Uuid) -> AppResult<Option<CreditReportRecord>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM credit_reports WHERE user_id = ?1 \
             ORDER BY report_date DESC, created_at DESC LIMIT 1"
        );
        let row = conn
            .query_row(&sql, [user_id.to_string()], |row| CreditReportRow::try_from(row))
            .optional()?;
        Ok(row.map(CreditReportRecord::from))
    }

    /// Newest first, `from` and `to` inclusive.
    pub fn list_in_range(
        conn: &Connection,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        limit: usize,
    ) -> AppResult<Vec<CreditReportRecord>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM credit_reports \
             WHERE user_id = :user_id AND report_date >= :from AND report_date <= :to \
             ORDER BY report_date DESC, created_at DESC LIMIT :limit"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                named_params! {
                    ":user_id": user_id.to_string(),
                    ":from": format_date(from),
                    ":to": format_date(to),
                    ":limit": limit as i64,
                },
                |row| CreditReportRow::try_from(row),
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows.into_iter().map(CreditReportRecord::from).collect())
    }
}
