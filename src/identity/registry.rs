//! Maps identities to their cache files and keeps one `SyncState` per file.
//!
//! File names are derived here and nowhere else:
//! - `pomodoros.db` for the anonymous shared cache
//! - `user_<readable>_<sha256[..12]>.db` for a signed-in identity

use crate::core::cache::LocalCache;
use crate::core::sync_state::SyncState;
use crate::core::worker::SyncWorker;
use crate::errors::AppResult;
use crate::identity::Identity;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

pub const SHARED_CACHE_FILE: &str = "pomodoros.db";

const READABLE_LEN: usize = 20;
const HASH_LEN: usize = 12;

pub struct StorageRegistry {
    data_dir: PathBuf,
    states: Mutex<HashMap<PathBuf, Arc<SyncState>>>,
}

impl StorageRegistry {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            states: Mutex::new(HashMap::new()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn shared_cache_path(&self) -> PathBuf {
        self.data_dir.join(SHARED_CACHE_FILE)
    }

    /// Cache file of `identity`, or the shared cache when nobody is signed in.
    pub fn cache_path(&self, identity: Option<&Identity>) -> PathBuf {
        match identity {
            Some(id) => self.data_dir.join(cache_file_name(id)),
            None => self.shared_cache_path(),
        }
    }

    /// The drain state shared by every handle on `path`.
    pub fn sync_state(&self, path: &Path) -> Arc<SyncState> {
        let mut states = self.states.lock().unwrap_or_else(|p| p.into_inner());
        Arc::clone(
            states
                .entry(path.to_path_buf())
                .or_insert_with(SyncState::new),
        )
    }

    pub fn open_cache(&self, identity: Option<&Identity>) -> AppResult<LocalCache> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.cache_path(identity);
        let state = self.sync_state(&path);
        debug!(cache = %path.display(), "opening cache");
        LocalCache::open(path, state)
    }

    /// The shared cache, but only when it is a different file than the
    /// identity's and already exists.
    pub fn open_shared_cache_for(&self, identity: &Identity) -> AppResult<Option<LocalCache>> {
        let shared = self.shared_cache_path();
        if shared == self.cache_path(Some(identity)) || !shared.exists() {
            return Ok(None);
        }
        self.open_cache(None).map(Some)
    }

    pub fn worker_for(&self, path: &Path) -> SyncWorker {
        SyncWorker::new(path, self.sync_state(path))
    }

    /// Delete an identity's cache file (with its WAL companions).
    /// The shared cache is never removed here.
    pub fn remove_cache(&self, identity: &Identity) -> AppResult<bool> {
        let path = self.cache_path(Some(identity));
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        for suffix in ["-wal", "-shm"] {
            let mut companion = path.clone().into_os_string();
            companion.push(suffix);
            let companion = PathBuf::from(companion);
            if companion.exists() {
                fs::remove_file(companion)?;
            }
        }
        self.states
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(&path);
        info!(%identity, "removed identity cache");
        Ok(true)
    }
}

fn cache_file_name(identity: &Identity) -> String {
    let digest = hex::encode(Sha256::digest(identity.as_str().as_bytes()));

    let readable: String = identity
        .as_str()
        .replace('@', "_at_")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .take(READABLE_LEN)
        .collect();

    format!("user_{}_{}.db", readable, &digest[..HASH_LEN])
}
