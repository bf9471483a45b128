use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::error::AppResult;

const USER_VERSION: i32 = 2;

#[derive(Debug)]
pub struct MigrationInfo {
    pub version: i32,
    pub description: String,
    pub applied_at: DateTime<Utc>,
}

pub fn run(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS migration_history (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL,
            rollback_sql TEXT
        );
        "#,
    )?;

    let mut current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version < 1 {
        info!(target: "app::db", version = current_version, "running migration v1");
        migrate_to_v1(conn)?;
        current_version = 1;
        conn.execute(&format!("PRAGMA user_version = {current_version}"), [])?;
        record_migration(
            conn,
            1,
            "Create profiles, credit reports and score history",
            Some(
                r#"
                DROP TABLE IF EXISTS score_history;
                DROP TABLE IF EXISTS credit_reports;
                DROP TABLE IF EXISTS profiles;
                "#,
            ),
        )?;
    }

    if current_version < 2 {
        info!(target: "app::db", version = current_version, "running migration v2");
        migrate_to_v2(conn)?;
        current_version = 2;
        conn.execute(&format!("PRAGMA user_version = {current_version}"), [])?;
        record_migration(
            conn,
            2,
            "Add documents, user settings and local object store",
            Some(
                r#"
                DROP TABLE IF EXISTS stored_objects;
                DROP TABLE IF EXISTS user_settings;
                DROP TABLE IF EXISTS documents;
                "#,
            ),
        )?;
    }

    if current_version != USER_VERSION {
        warn!(
            target: "app::db",
            found = current_version,
            expected = USER_VERSION,
            "database schema is newer than this build"
        );
    }

    Ok(())
}

fn record_migration(
    conn: &Connection,
    version: i32,
    description: &str,
    rollback_sql: Option<&str>,
) -> AppResult<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT OR REPLACE INTO migration_history (version, description, applied_at, rollback_sql) VALUES (?1, ?2, ?3, ?4)",
        (version, description, now, rollback_sql),
    )?;
    Ok(())
}

pub fn current_version(conn: &Connection) -> AppResult<i32> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

pub fn rollback_to_version(conn: &Connection, target_version: i32) -> AppResult<()> {
    let current_version = current_version(conn)?;

    if target_version >= current_version {
        warn!(
            target: "app::db",
            target_version,
            current_version,
            "rollback target is not below the current version"
        );
        return Ok(());
    }

    let mut stmt = conn.prepare(
        "SELECT version, rollback_sql FROM migration_history WHERE version > ?1 ORDER BY version DESC",
    )?;
    let scripts = stmt
        .query_map([target_version], |row| {
            Ok((row.get::<_, i32>(0)?, row.get::<_, Option<String>>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for (version, rollback_sql) in scripts {
        match rollback_sql {
            Some(sql) => {
                info!(target: "app::db", version, "rolling back migration");
                conn.execute_batch(&sql)?;
            }
            None => warn!(target: "app::db", version, "no rollback script for migration"),
        }
    }

    conn.execute(&format!("PRAGMA user_version = {target_version}"), [])?;
    conn.execute(
        "DELETE FROM migration_history WHERE version > ?1",
        [target_version],
    )?;

    Ok(())
}

pub fn get_migration_history(conn: &Connection) -> AppResult<Vec<MigrationInfo>> {
    let mut stmt = conn
        .prepare("SELECT version, description, applied_at FROM migration_history ORDER BY version")?;

    let migrations = stmt
        .query_map([], |row| {
            let applied_at: String = row.get(2)?;
            Ok(MigrationInfo {
                version: row.get(0)?,
                description: row.get(1)?,
                applied_at: super::parse_timestamp(2, &applied_at)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(migrations)
}

fn migrate_to_v1(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            first_name TEXT,
            last_name TEXT,
            email TEXT,
            avatar_url TEXT,
            updated_at TEXT
        );

        CREATE TABLE IF NOT EXISTS credit_reports (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            score INTEGER NOT NULL CHECK (score BETWEEN 0 AND 1000),
            report_date TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_credit_reports_user_date
            ON credit_reports(user_id, report_date DESC);

        CREATE TABLE IF NOT EXISTS score_history (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            score INTEGER NOT NULL,
            score_date TEXT NOT NULL,
            change_amount INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_score_history_user_date
            ON score_history(user_id, score_date DESC);
        "#,
    )?;

    Ok(())
}

fn migrate_to_v2(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            file_size INTEGER NOT NULL DEFAULT 0 CHECK (file_size >= 0),
            file_url TEXT NOT NULL,
            uploaded_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_documents_user_uploaded
            ON documents(user_id, uploaded_at DESC);

        CREATE TABLE IF NOT EXISTS user_settings (
            user_id TEXT PRIMARY KEY,
            theme TEXT,
            custom_theme_colors TEXT,
            language TEXT,
            updated_at TEXT
        );

        -- Local mirror of the object store for offline mode.
        CREATE TABLE IF NOT EXISTS stored_objects (
            bucket TEXT NOT NULL,
            path TEXT NOT NULL,
            content_type TEXT NOT NULL,
            bytes BLOB NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (bucket, path)
        );
        "#,
    )?;

    Ok(())
}
