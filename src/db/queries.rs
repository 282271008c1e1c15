use crate::errors::{AppError, AppResult};
use crate::models::entry::{Entry, SortOrder, TimeRange};
use crate::utils::time::{format_ts, parse_ts};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, Result, Row, params, params_from_iter};

const ENTRY_COLUMNS: &str =
    "id, name, type, start_time, end_time, duration_minutes, notes, synced";

fn conversion_error(col: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(err))
}

pub fn map_row(row: &Row) -> Result<Entry> {
    let start_str: String = row.get("start_time")?;
    let end_str: String = row.get("end_time")?;

    let start_time = parse_ts(&start_str).map_err(|e| conversion_error(3, e))?;
    let end_time = parse_ts(&end_str).map_err(|e| conversion_error(4, e))?;

    Ok(Entry {
        id: row.get("id")?,
        name: row.get("name")?,
        category: row.get("type")?,
        start_time,
        end_time,
        duration_minutes: row.get("duration_minutes")?,
        notes: row.get("notes")?,
        synced: row.get::<_, i32>("synced")? == 1,
    })
}

pub fn insert_entry(conn: &Connection, entry: &Entry) -> AppResult<()> {
    conn.execute(
        "INSERT INTO pomodoros (id, name, type, start_time, end_time, duration_minutes, notes, synced)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.id,
            entry.name,
            entry.category,
            format_ts(&entry.start_time),
            format_ts(&entry.end_time),
            entry.duration_minutes,
            entry.notes,
            if entry.synced { 1 } else { 0 },
        ],
    )?;
    Ok(())
}

/// Insert or replace by id.
pub fn upsert_entry(conn: &Connection, entry: &Entry) -> AppResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO pomodoros (id, name, type, start_time, end_time, duration_minutes, notes, synced)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.id,
            entry.name,
            entry.category,
            format_ts(&entry.start_time),
            format_ts(&entry.end_time),
            entry.duration_minutes,
            entry.notes,
            if entry.synced { 1 } else { 0 },
        ],
    )?;
    Ok(())
}

/// Update an entry (all fields except id). Returns false when no row matched.
pub fn update_entry(conn: &Connection, entry: &Entry) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE pomodoros
         SET name = ?1, type = ?2, start_time = ?3, end_time = ?4,
             duration_minutes = ?5, notes = ?6, synced = ?7
         WHERE id = ?8",
        params![
            entry.name,
            entry.category,
            format_ts(&entry.start_time),
            format_ts(&entry.end_time),
            entry.duration_minutes,
            entry.notes,
            if entry.synced { 1 } else { 0 },
            entry.id,
        ],
    )?;
    Ok(changed > 0)
}

pub fn delete_entry(conn: &Connection, id: &str) -> AppResult<bool> {
    let changed = conn.execute("DELETE FROM pomodoros WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

pub fn delete_all_entries(conn: &Connection) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM pomodoros", [])?)
}

pub fn load_entry(conn: &Connection, id: &str) -> AppResult<Option<Entry>> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM pomodoros WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], map_row).optional()?)
}

/// Load entries whose start time falls in `range`, in the requested order.
pub fn load_entries(conn: &Connection, range: &TimeRange, order: SortOrder) -> AppResult<Vec<Entry>> {
    let mut conditions: Vec<&str> = Vec::new();
    let mut values: Vec<SqlValue> = Vec::new();

    if let Some(from) = &range.from {
        conditions.push("start_time >= ?");
        values.push(SqlValue::Text(format_ts(from)));
    }
    if let Some(to) = &range.to {
        conditions.push("start_time < ?");
        values.push(SqlValue::Text(format_ts(to)));
    }

    let mut sql = format!("SELECT {ENTRY_COLUMNS} FROM pomodoros");
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(&format!(" ORDER BY start_time {}, id ASC", order.sql()));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count_entries(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM pomodoros", [], |row| row.get(0))?)
}

pub fn count_unsynced(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM pomodoros WHERE synced = 0",
        [],
        |row| row.get(0),
    )?)
}

pub fn mark_entry_synced(conn: &Connection, id: &str) -> AppResult<()> {
    conn.execute("UPDATE pomodoros SET synced = 1 WHERE id = ?1", [id])?;
    Ok(())
}
