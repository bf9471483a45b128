use chrono::{NaiveDate, Utc};
use creditai_app_lib::db::repositories::credit_report_repository::CreditReportRepository;
use creditai_app_lib::db::repositories::score_history_repository::ScoreHistoryRepository;
use creditai_app_lib::db::{migrations, DbPool};
use creditai_app_lib::error::AppError;
use creditai_app_lib::models::credit::{CreditReportRecord, ScoreHistoryEntry};
use tempfile::tempdir;
use uuid::Uuid;

fn column_names(pool: &DbPool, table: &str) -> Vec<String> {
    pool.with_connection(|conn| {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    })
    .expect("table info")
}

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

#[test]
fn test_all_tables_created() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("test.sqlite")).expect("db pool");

    let reports = column_names(&pool, "credit_reports");
    for column in ["id", "user_id", "score", "report_date", "created_at"] {
        assert!(reports.iter().any(|name| name == column), "missing {column}");
    }

    let history = column_names(&pool, "score_history");
    assert!(history.iter().any(|name| name == "change_amount"));

    let documents = column_names(&pool, "documents");
    for column in ["name", "type", "file_size", "file_url", "uploaded_at"] {
        assert!(documents.iter().any(|name| name == column), "missing {column}");
    }

    let settings = column_names(&pool, "user_settings");
    for column in ["theme", "custom_theme_colors", "language"] {
        assert!(settings.iter().any(|name| name == column), "missing {column}");
    }

    assert!(!column_names(&pool, "profiles").is_empty());
    assert!(!column_names(&pool, "stored_objects").is_empty());
}

#[test]
fn test_migrations_record_history_and_version() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("test.sqlite")).expect("db pool");

    pool.with_connection(|conn| {
        assert_eq!(migrations::current_version(conn)?, 2);
        let history = migrations::get_migration_history(conn)?;
        let versions: Vec<i32> = history.iter().map(|info| info.version).collect();
        assert_eq!(versions, vec![1, 2]);
        Ok(())
    })
    .expect("migration history");

    // Reopening must not reapply anything.
    let reopened = DbPool::new(dir.path().join("test.sqlite")).expect("reopen");
    reopened
        .with_connection(|conn| {
            assert_eq!(migrations::get_migration_history(conn)?.len(), 2);
            Ok(())
        })
        .expect("history after reopen");
}

#[test]
fn test_rollback_drops_document_tables() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("test.sqlite")).expect("db pool");

    pool.with_connection(|conn| {
        migrations::rollback_to_version(conn, 1)?;
        assert_eq!(migrations::current_version(conn)?, 1);
        Ok(())
    })
    .expect("rollback");

    assert!(column_names(&pool, "documents").is_empty());
    assert!(column_names(&pool, "user_settings").is_empty());
    assert!(!column_names(&pool, "credit_reports").is_empty());
}

#[test]
fn test_score_check_constraint_maps_to_conflict() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("test.sqlite")).expect("db pool");

    let record = CreditReportRecord {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        score: 1200,
        report_date: date(1, 1),
        created_at: Utc::now(),
    };
    let result = pool.with_connection(|conn| CreditReportRepository::insert(conn, &record));
    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[test]
fn test_range_queries_are_inclusive_scoped_and_newest_first() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("test.sqlite")).expect("db pool");
    let user = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    pool.with_connection(|conn| {
        for (owner, day, score) in [
            (user, 1, 640),
            (user, 10, 655),
            (user, 20, 690),
            (user, 28, 700),
            (stranger, 15, 810),
        ] {
            ScoreHistoryRepository::insert(
                conn,
                &ScoreHistoryEntry {
                    id: Uuid::new_v4(),
                    user_id: owner,
                    score,
                    score_date: date(2, day),
                    change_amount: 0,
                    created_at: Utc::now(),
                },
            )?;
        }

        let entries = ScoreHistoryRepository::list_in_range(conn, user, date(2, 10), date(2, 20), 10)?;
        let scores: Vec<i32> = entries.iter().map(|entry| entry.score).collect();
        assert_eq!(scores, vec![690, 655]);

        let limited = ScoreHistoryRepository::list_in_range(conn, user, date(1, 1), date(12, 31), 1)?;
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].score, 700);
        Ok(())
    })
    .expect("range query");
}

#[test]
fn test_latest_report_ignores_other_users() {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("test.sqlite")).expect("db pool");
    let user = Uuid::new_v4();

    pool.with_connection(|conn| {
        assert!(CreditReportRepository::latest(conn, user)?.is_none());
        for (owner, month, score) in [(user, 1, 700), (user, 3, 742), (Uuid::new_v4(), 6, 500)] {
            CreditReportRepository::insert(
                conn,
                &CreditReportRecord {
                    id: Uuid::new_v4(),
                    user_id: owner,
                    score,
                    report_date: date(month, 1),
                    created_at: Utc::now(),
                },
            )?;
        }
        let latest = CreditReportRepository::latest(conn, user)?.expect("latest report");
        assert_eq!(latest.score, 742);
        Ok(())
    })
    .expect("latest report");
}
