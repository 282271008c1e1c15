//! SQLite connection wrapper (lightweight, one per cache handle).

use crate::db::initialize::init_db;
use crate::errors::AppResult;
use rusqlite::{Connection, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a writer waits on a locked cache file before giving up.
/// The foreground path and the drain thread each hold their own connection.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct DbPool {
    pub conn: Connection,
    path: PathBuf,
}

impl DbPool {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        Ok(Self { conn, path })
    }

    /// Open the cache file and make sure the schema is current.
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let pool = Self::new(path)?;
        init_db(&pool.conn)?;
        Ok(pool)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
