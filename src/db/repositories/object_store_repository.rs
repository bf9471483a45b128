use rusqlite::{named_params, Connection, OptionalExtension};

use crate::error::AppResult;

/// Blob rows backing the offline object store.
pub struct ObjectStoreRepository;

impl ObjectStoreRepository {
    pub fn put(
        conn: &Connection,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: &[u8],
        created_at: &str,
    ) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO stored_objects (bucket, path, content_type, bytes, created_at)
                VALUES (:bucket, :path, :content_type, :bytes, :created_at)
            "#,
            named_params! {
                ":bucket": bucket,
                ":path": path,
                ":content_type": content_type,
                ":bytes": bytes,
                ":created_at": created_at,
            },
        )?;
        Ok(())
    }

    pub fn get(conn: &Connection, bucket: &str, path: &str) -> AppResult<Option<(String, Vec<u8>)>> {
        let row = conn
            .query_row(
                "SELECT content_type, bytes FROM stored_objects WHERE bucket = ?1 AND path = ?2",
                [bucket, path],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row)
    }
}
