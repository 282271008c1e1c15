use rusqlite::{Connection, OptionalExtension, Result};
use tracing::{debug, info};

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Check if a table exists.
fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

/// Check if `table` has a column named `column`.
fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{table}')"))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    info!(version, "migration applied");
    Ok(())
}

/// Create the cache tables: pomodoros, settings, sync_queue, sync_status.
fn create_cache_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS pomodoros (
            id               TEXT PRIMARY KEY,
            name             TEXT NOT NULL DEFAULT '',
            type             TEXT NOT NULL,
            start_time       TEXT NOT NULL,
            end_time         TEXT NOT NULL,
            duration_minutes INTEGER NOT NULL,
            notes            TEXT,
            synced           INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_pomodoros_start ON pomodoros(start_time);

        CREATE TABLE IF NOT EXISTS settings (
            key    TEXT PRIMARY KEY,
            value  TEXT NOT NULL,
            synced INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS sync_queue (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            operation  TEXT NOT NULL CHECK(operation IN ('INSERT','UPDATE','DELETE')),
            table_name TEXT NOT NULL CHECK(table_name IN ('pomodoros','settings')),
            record_id  TEXT NOT NULL,
            data       TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sync_status (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Caches created before sync support have no `synced` flag.
fn migrate_add_synced_columns(conn: &Connection) -> Result<()> {
    let version = "20250301_0002_add_synced_flags";
    if migration_applied(conn, version)? {
        return Ok(());
    }

    for table in ["pomodoros", "settings"] {
        if !has_column(conn, table, "synced")? {
            debug!(table, "adding synced column");
            conn.execute_batch(&format!(
                "ALTER TABLE {table} ADD COLUMN synced INTEGER NOT NULL DEFAULT 0;"
            ))?;
        }
    }

    mark_applied(conn, version, "Added synced flag to pomodoros and settings")
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    // 1) Ensure log table
    ensure_log_table(conn)?;

    // 2) Create cache tables if missing
    let fresh = !table_exists(conn, "pomodoros")?;
    create_cache_tables(conn)?;
    if fresh {
        debug!("created cache tables");
    }

    // 3) Column upgrades for older caches
    migrate_add_synced_columns(conn)?;

    Ok(())
}
