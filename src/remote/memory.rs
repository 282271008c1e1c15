//! In-process remote store with failure injection.
//! Row order is kept like a sheet: appends go to the bottom, deletes remove
//! the first row with a matching id.

use crate::errors::{AppError, AppResult};
use crate::models::entry::Entry;
use crate::models::settings::SettingsMap;
use crate::remote::{Credential, RemoteConnector, RemoteHandle, RemoteStore};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    rows: Vec<Entry>,
    settings: Vec<(String, serde_json::Value)>,
    failing_ids: HashSet<String>,
    offline: bool,
    read_only: bool,
    batch_calls: usize,
}

#[derive(Default)]
pub struct MemoryRemote {
    state: Mutex<MemoryState>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<Entry>) -> Self {
        let remote = Self::new();
        remote.lock().rows = entries.into_iter().map(strip_sync_flag).collect();
        remote
    }

    /// Every call touching `id` fails until `heal` is called.
    pub fn fail_for(&self, id: &str) {
        self.lock().failing_ids.insert(id.to_string());
    }

    pub fn heal(&self, id: &str) {
        self.lock().failing_ids.remove(id);
    }

    /// Every call fails while offline.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Reads succeed, writes fail.
    pub fn set_read_only(&self, read_only: bool) {
        self.lock().read_only = read_only;
    }

    pub fn rows(&self) -> Vec<Entry> {
        self.lock().rows.clone()
    }

    pub fn settings(&self) -> SettingsMap {
        self.lock().settings.iter().cloned().collect()
    }

    /// Number of `append_entries` calls served.
    pub fn batch_calls(&self) -> usize {
        self.lock().batch_calls
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // a panicking test thread must not hide the rows from the others
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn strip_sync_flag(mut entry: Entry) -> Entry {
    entry.synced = false;
    entry
}

impl MemoryState {
    fn check_read(&self) -> AppResult<()> {
        if self.offline {
            return Err(AppError::Remote("remote store is offline".into()));
        }
        Ok(())
    }

    fn check_write(&self, id: Option<&str>) -> AppResult<()> {
        self.check_read()?;
        if self.read_only {
            return Err(AppError::Remote("write access denied".into()));
        }
        if let Some(id) = id
            && self.failing_ids.contains(id)
        {
            return Err(AppError::Remote(format!("simulated failure for {id}")));
        }
        Ok(())
    }
}

impl RemoteStore for MemoryRemote {
    fn list_entries(&self) -> AppResult<Vec<Entry>> {
        let state = self.lock();
        state.check_read()?;
        Ok(state.rows.clone())
    }

    fn append_entry(&self, entry: &Entry) -> AppResult<()> {
        let mut state = self.lock();
        state.check_write(Some(&entry.id))?;
        state.rows.push(strip_sync_flag(entry.clone()));
        Ok(())
    }

    fn append_entries(&self, entries: &[Entry]) -> AppResult<()> {
        let mut state = self.lock();
        for e in entries {
            state.check_write(Some(&e.id))?;
        }
        state.batch_calls += 1;
        state
            .rows
            .extend(entries.iter().cloned().map(strip_sync_flag));
        Ok(())
    }

    fn update_entry(&self, entry: &Entry) -> AppResult<bool> {
        let mut state = self.lock();
        state.check_write(Some(&entry.id))?;
        match state.rows.iter_mut().find(|row| row.id == entry.id) {
            Some(row) => {
                *row = strip_sync_flag(entry.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_entry(&self, id: &str) -> AppResult<bool> {
        let mut state = self.lock();
        state.check_write(Some(id))?;
        match state.rows.iter().position(|row| row.id == id) {
            Some(index) => {
                state.rows.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn get_settings(&self) -> AppResult<SettingsMap> {
        let state = self.lock();
        state.check_read()?;
        Ok(state.settings.iter().cloned().collect())
    }

    fn upsert_settings(&self, settings: &SettingsMap) -> AppResult<()> {
        let mut state = self.lock();
        state.check_write(None)?;
        for (key, value) in settings {
            match state.settings.iter_mut().find(|(k, _)| k == key) {
                Some(slot) => slot.1 = value.clone(),
                None => state.settings.push((key.clone(), value.clone())),
            }
        }
        Ok(())
    }
}

/// Connector handing out shared `MemoryRemote`s; handles can be revoked.
#[derive(Default)]
pub struct MemoryConnector {
    stores: Mutex<HashMap<RemoteHandle, Arc<MemoryRemote>>>,
    revoked: Mutex<HashSet<RemoteHandle>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing store under `handle`.
    pub fn insert(&self, handle: RemoteHandle, store: Arc<MemoryRemote>) {
        self.stores
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(handle, store);
    }

    pub fn store(&self, handle: &RemoteHandle) -> Option<Arc<MemoryRemote>> {
        self.stores
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(handle)
            .cloned()
    }

    /// Simulate the user revoking the app's access to a store.
    pub fn revoke(&self, handle: &RemoteHandle) {
        self.revoked
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(handle.clone());
    }
}

impl RemoteConnector for MemoryConnector {
    fn open(&self, _credential: &Credential, handle: &RemoteHandle) -> AppResult<Arc<dyn RemoteStore>> {
        if self
            .revoked
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains(handle)
        {
            return Err(AppError::RemoteUnavailable(format!("access revoked for {handle}")));
        }
        let store = self
            .store(handle)
            .ok_or_else(|| AppError::RemoteUnavailable(format!("unknown remote store {handle}")))?;
        Ok(store)
    }

    fn provision(&self, _credential: &Credential) -> AppResult<RemoteHandle> {
        let handle = RemoteHandle(Uuid::new_v4().to_string());
        self.insert(handle.clone(), Arc::new(MemoryRemote::new()));
        Ok(handle)
    }
}
