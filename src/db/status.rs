//! Persisted sync metadata (`sync_status` key/value table).

use crate::errors::AppResult;
use rusqlite::{Connection, OptionalExtension};

pub const LAST_SYNC: &str = "last_sync";
pub const LAST_FULL_SYNC: &str = "last_full_sync";
pub const LAST_ERROR: &str = "last_error";

pub fn get_status(conn: &Connection, key: &str) -> AppResult<Option<String>> {
    Ok(conn
        .query_row(
            "SELECT value FROM sync_status WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()?)
}

pub fn set_status(conn: &Connection, key: &str, value: &str) -> AppResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO sync_status (key, value) VALUES (?1, ?2)",
        [key, value],
    )?;
    Ok(())
}

pub fn clear_status(conn: &Connection, key: &str) -> AppResult<()> {
    conn.execute("DELETE FROM sync_status WHERE key = ?1", [key])?;
    Ok(())
}
