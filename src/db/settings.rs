use crate::errors::AppResult;
use crate::models::settings::SettingsMap;
use rusqlite::{Connection, params};

/// Explicitly stored settings (no defaults applied).
pub fn load_settings(conn: &Connection) -> AppResult<SettingsMap> {
    let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut out = SettingsMap::new();
    for r in rows {
        let (key, raw) = r?;
        let value = serde_json::from_str(&raw)?;
        out.insert(key, value);
    }
    Ok(out)
}

/// Last write wins per key.
pub fn upsert_setting(
    conn: &Connection,
    key: &str,
    value: &serde_json::Value,
    synced: bool,
) -> AppResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO settings (key, value, synced) VALUES (?1, ?2, ?3)",
        params![key, serde_json::to_string(value)?, if synced { 1 } else { 0 }],
    )?;
    Ok(())
}

pub fn mark_settings_synced(conn: &Connection) -> AppResult<()> {
    conn.execute("UPDATE settings SET synced = 1 WHERE synced = 0", [])?;
    Ok(())
}
