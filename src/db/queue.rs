//! The persisted sync queue: a FIFO of pending remote mutations.
//! Operations are never reordered or coalesced.

use crate::errors::{AppError, AppResult};
use crate::models::operation::{Collection, OpKind, QueuedOperation};
use crate::utils::time::format_ts;
use chrono::Utc;
use rusqlite::{Connection, Result, Row, params};
use serde_json::Value;

fn invalid(col: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        col,
        rusqlite::types::Type::Text,
        Box::new(AppError::Other(msg)),
    )
}

fn map_operation(row: &Row) -> Result<QueuedOperation> {
    let op_str: String = row.get("operation")?;
    let kind = OpKind::from_db_str(&op_str)
        .ok_or_else(|| invalid(1, format!("Invalid operation: {op_str}")))?;

    let table_str: String = row.get("table_name")?;
    let collection = Collection::from_db_str(&table_str)
        .ok_or_else(|| invalid(2, format!("Invalid table: {table_str}")))?;

    let data: Option<String> = row.get("data")?;
    let payload = match data {
        Some(raw) => Some(
            serde_json::from_str::<Value>(&raw).map_err(|e| invalid(4, e.to_string()))?,
        ),
        None => None,
    };

    Ok(QueuedOperation {
        sequence: row.get("id")?,
        kind,
        collection,
        target_id: row.get("record_id")?,
        payload,
        enqueued_at: row.get("created_at")?,
    })
}

/// Append an operation; returns its sequence number.
pub fn enqueue(
    conn: &Connection,
    kind: OpKind,
    collection: Collection,
    target_id: &str,
    payload: Option<&Value>,
) -> AppResult<i64> {
    let data = payload.map(serde_json::to_string).transpose()?;

    conn.execute(
        "INSERT INTO sync_queue (operation, table_name, record_id, data, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            kind.to_db_str(),
            collection.to_db_str(),
            target_id,
            data,
            format_ts(&Utc::now()),
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

/// All queued operations, oldest first.
pub fn load_queue(conn: &Connection) -> AppResult<Vec<QueuedOperation>> {
    let mut stmt = conn.prepare(
        "SELECT id, operation, table_name, record_id, data, created_at
         FROM sync_queue ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], map_operation)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Remove one operation after the remote accepted it.
pub fn ack(conn: &Connection, sequence: i64) -> AppResult<()> {
    conn.execute("DELETE FROM sync_queue WHERE id = ?1", [sequence])?;
    Ok(())
}

pub fn count_pending(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM sync_queue", [], |row| row.get(0))?)
}

/// True when some operation for this target is still waiting.
pub fn has_pending_for(conn: &Connection, collection: Collection, target_id: &str) -> AppResult<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM sync_queue WHERE table_name = ?1 AND record_id = ?2 LIMIT 1",
    )?;
    Ok(stmt.exists(params![collection.to_db_str(), target_id])?)
}
