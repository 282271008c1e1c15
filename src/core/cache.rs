//! Local Cache Store: the per-identity SQLite file every read is served from.
//!
//! Every mutation is committed before the call returns. While a remote store
//! is linked, the mutation and the queued operation carrying a snapshot of
//! the resulting record are written in the same transaction; otherwise the
//! record is stored as already synced and nothing is queued.

use crate::core::sync_state::SyncState;
use crate::db::pool::DbPool;
use crate::db::{queries, queue, settings as settings_db, status};
use crate::errors::{AppError, AppResult};
use crate::models::entry::{Entry, EntryUpdate, SortOrder, TimeRange};
use crate::models::operation::{Collection, OpKind, QueuedOperation};
use crate::models::settings::{ALL_SETTINGS_ID, SettingsMap, with_defaults};
use crate::models::sync_status::SyncStatus;
use crate::utils::time::format_ts;
use chrono::Utc;
use rusqlite::Connection;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub struct LocalCache {
    pool: DbPool,
    linked: bool,
    state: Arc<SyncState>,
}

impl LocalCache {
    pub fn open(path: impl AsRef<Path>, state: Arc<SyncState>) -> AppResult<Self> {
        let pool = DbPool::open(path)?;
        Ok(Self {
            pool,
            linked: false,
            state,
        })
    }

    /// Whether mutations are queued for a remote store.
    pub fn set_linked(&mut self, linked: bool) {
        self.linked = linked;
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn path(&self) -> &Path {
        self.pool.path()
    }

    pub fn conn(&self) -> &Connection {
        &self.pool.conn
    }

    pub fn pool_mut(&mut self) -> &mut DbPool {
        &mut self.pool
    }

    pub fn state(&self) -> &Arc<SyncState> {
        &self.state
    }

    // ------------------------------------------------
    // Entries
    // ------------------------------------------------

    /// Store a new entry. Returns it with its sync flag set.
    pub fn put_entry(&mut self, mut entry: Entry) -> AppResult<Entry> {
        entry.synced = !self.linked;

        let tx = self.pool.conn.transaction()?;
        queries::insert_entry(&tx, &entry)?;
        if self.linked {
            queue::enqueue(
                &tx,
                OpKind::Insert,
                Collection::Entries,
                &entry.id,
                Some(&serde_json::to_value(&entry)?),
            )?;
        }
        tx.commit()?;

        debug!(id = %entry.id, linked = self.linked, "pomodoro stored");
        Ok(entry)
    }

    pub fn update_entry(&mut self, id: &str, update: &EntryUpdate) -> AppResult<Entry> {
        let tx = self.pool.conn.transaction()?;

        let mut entry = queries::load_entry(&tx, id)?
            .ok_or_else(|| AppError::EntryNotFound(id.to_string()))?;
        entry.apply(update)?;
        entry.synced = !self.linked;

        queries::update_entry(&tx, &entry)?;
        if self.linked {
            queue::enqueue(
                &tx,
                OpKind::Update,
                Collection::Entries,
                &entry.id,
                Some(&serde_json::to_value(&entry)?),
            )?;
        }
        tx.commit()?;

        debug!(id, linked = self.linked, "pomodoro updated");
        Ok(entry)
    }

    pub fn delete_entry(&mut self, id: &str) -> AppResult<()> {
        let tx = self.pool.conn.transaction()?;

        if !queries::delete_entry(&tx, id)? {
            return Err(AppError::EntryNotFound(id.to_string()));
        }
        if self.linked {
            queue::enqueue(&tx, OpKind::Delete, Collection::Entries, id, None)?;
        }
        tx.commit()?;

        debug!(id, linked = self.linked, "pomodoro deleted");
        Ok(())
    }

    pub fn get_entry(&self, id: &str) -> AppResult<Option<Entry>> {
        queries::load_entry(&self.pool.conn, id)
    }

    pub fn list_entries(&self, range: &TimeRange, order: SortOrder) -> AppResult<Vec<Entry>> {
        queries::load_entries(&self.pool.conn, range, order)
    }

    pub fn count_entries(&self) -> AppResult<i64> {
        queries::count_entries(&self.pool.conn)
    }

    // ------------------------------------------------
    // Settings
    // ------------------------------------------------

    /// Defaults overlaid with the stored values.
    pub fn get_settings(&self) -> AppResult<SettingsMap> {
        Ok(with_defaults(self.stored_settings()?))
    }

    pub fn stored_settings(&self) -> AppResult<SettingsMap> {
        settings_db::load_settings(&self.pool.conn)
    }

    pub fn get_setting(&self, key: &str) -> AppResult<Option<Value>> {
        Ok(self.get_settings()?.remove(key))
    }

    /// Write every key (last write wins). While linked, one UPDATE carrying
    /// the full stored settings snapshot is queued under the synthetic id.
    pub fn put_settings(&mut self, values: &SettingsMap) -> AppResult<()> {
        let tx = self.pool.conn.transaction()?;
        for (key, value) in values {
            settings_db::upsert_setting(&tx, key, value, !self.linked)?;
        }
        if self.linked {
            let snapshot = settings_db::load_settings(&tx)?;
            queue::enqueue(
                &tx,
                OpKind::Update,
                Collection::Settings,
                ALL_SETTINGS_ID,
                Some(&serde_json::to_value(&snapshot)?),
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ------------------------------------------------
    // Queue
    // ------------------------------------------------

    /// Append an operation outside of a local mutation.
    pub fn enqueue_operation(
        &mut self,
        kind: OpKind,
        collection: Collection,
        target_id: &str,
        payload: Option<&Value>,
    ) -> AppResult<i64> {
        queue::enqueue(&self.pool.conn, kind, collection, target_id, payload)
    }

    /// Queued operations, oldest first.
    pub fn drain_queue_view(&self) -> AppResult<Vec<QueuedOperation>> {
        queue::load_queue(&self.pool.conn)
    }

    pub fn pending_operations(&self) -> AppResult<i64> {
        queue::count_pending(&self.pool.conn)
    }

    /// Remove an applied operation and, when nothing else is queued for the
    /// same target, flag the local record as synced. Committed on its own.
    pub fn ack_operation(&mut self, op: &QueuedOperation) -> AppResult<()> {
        let tx = self.pool.conn.transaction()?;
        queue::ack(&tx, op.sequence)?;

        if !queue::has_pending_for(&tx, op.collection, &op.target_id)? {
            match op.collection {
                Collection::Entries => queries::mark_entry_synced(&tx, &op.target_id)?,
                Collection::Settings => settings_db::mark_settings_synced(&tx)?,
            }
        }
        tx.commit()?;
        Ok(())
    }

    // ------------------------------------------------
    // Sync metadata
    // ------------------------------------------------

    /// Persist a propagation failure right away.
    pub fn record_sync_error(&self, error: &str) -> AppResult<()> {
        self.state.set_last_error(Some(error.to_string()));
        status::set_status(&self.pool.conn, status::LAST_ERROR, error)
    }

    /// Close a drain: stamp `last_sync`, and clear the last error only when
    /// the whole batch went through.
    pub fn record_sync_result(&self, clean: bool) -> AppResult<()> {
        status::set_status(&self.pool.conn, status::LAST_SYNC, &format_ts(&Utc::now()))?;
        if clean {
            self.state.set_last_error(None);
            status::clear_status(&self.pool.conn, status::LAST_ERROR)?;
        }
        Ok(())
    }

    pub fn record_full_sync(&self) -> AppResult<()> {
        status::set_status(
            &self.pool.conn,
            status::LAST_FULL_SYNC,
            &format_ts(&Utc::now()),
        )
    }

    pub fn sync_status(&self) -> AppResult<SyncStatus> {
        let conn = &self.pool.conn;
        Ok(SyncStatus {
            syncing: self.state.is_syncing(),
            pending_operations: queue::count_pending(conn)?,
            unsynced_pomodoros: queries::count_unsynced(conn)?,
            last_sync: status::get_status(conn, status::LAST_SYNC)?,
            last_full_sync: status::get_status(conn, status::LAST_FULL_SYNC)?,
            last_error: status::get_status(conn, status::LAST_ERROR)?,
            remote_connected: self.linked,
        })
    }

    // ------------------------------------------------
    // Bulk paths used by reconciliation (never queued)
    // ------------------------------------------------

    /// Upsert by id, flagged synced. Local entries missing from `entries`
    /// stay, and so do entries with a queued operation not yet pushed.
    /// Returns how many were written.
    pub fn upsert_synced_entries(&mut self, entries: &[Entry]) -> AppResult<usize> {
        let tx = self.pool.conn.transaction()?;
        let mut written = 0;
        for entry in entries {
            if queue::has_pending_for(&tx, Collection::Entries, &entry.id)? {
                debug!(id = %entry.id, "local change pending, remote copy not applied");
                continue;
            }
            let mut e = entry.clone();
            e.synced = true;
            queries::upsert_entry(&tx, &e)?;
            written += 1;
        }
        tx.commit()?;
        Ok(written)
    }

    /// Replace every local setting with `values`, flagged synced. Nothing is
    /// replaced while a settings update is still queued.
    pub fn replace_settings_synced(&mut self, values: &SettingsMap) -> AppResult<usize> {
        let tx = self.pool.conn.transaction()?;
        if queue::has_pending_for(&tx, Collection::Settings, ALL_SETTINGS_ID)? {
            debug!("local settings change pending, remote settings not applied");
            return Ok(0);
        }
        tx.execute("DELETE FROM settings", [])?;
        for (key, value) in values {
            settings_db::upsert_setting(&tx, key, value, true)?;
        }
        tx.commit()?;
        Ok(values.len())
    }

    pub fn mark_entries_synced<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) -> AppResult<()> {
        let tx = self.pool.conn.transaction()?;
        for id in ids {
            queries::mark_entry_synced(&tx, id)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn mark_settings_synced(&mut self) -> AppResult<()> {
        settings_db::mark_settings_synced(&self.pool.conn)
    }

    /// Drop every entry (shared-cache migration).
    pub fn clear_entries(&mut self) -> AppResult<usize> {
        queries::delete_all_entries(&self.pool.conn)
    }
}
