//! Remote Record Store: the user's spreadsheet-backed copy of pomodoros and
//! settings. Slow and eventually consistent from the cache's point of view;
//! only the sync worker and the reconciler talk to it.

pub mod memory;
pub mod sheet;

use crate::errors::AppResult;
use crate::models::entry::Entry;
use crate::models::settings::SettingsMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

pub use memory::{MemoryConnector, MemoryRemote};
pub use sheet::{SheetConnector, SheetRemote};

/// Opaque identifier of one remote store (a spreadsheet id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteHandle(pub String);

impl fmt::Display for RemoteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Refresh-capable credential produced by the (external) OAuth exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            refresh_token: None,
        }
    }
}

/// Record-level operations offered by a remote store.
///
/// Entry operations address rows by id. `update_entry` and `delete_entry`
/// report whether a row was found instead of failing on a miss.
pub trait RemoteStore: Send + Sync {
    fn list_entries(&self) -> AppResult<Vec<Entry>>;

    fn append_entry(&self, entry: &Entry) -> AppResult<()>;

    /// Append many rows in one remote call.
    fn append_entries(&self, entries: &[Entry]) -> AppResult<()>;

    /// Overwrite the row carrying `entry.id`.
    fn update_entry(&self, entry: &Entry) -> AppResult<bool>;

    fn delete_entry(&self, id: &str) -> AppResult<bool>;

    /// Settings explicitly stored remotely (no defaults applied).
    fn get_settings(&self) -> AppResult<SettingsMap>;

    /// Upsert every key of `settings`; keys not mentioned are left alone.
    fn upsert_settings(&self, settings: &SettingsMap) -> AppResult<()>;

    fn entry_ids(&self) -> AppResult<HashSet<String>> {
        Ok(self.list_entries()?.into_iter().map(|e| e.id).collect())
    }
}

/// Opens and provisions remote stores for a credential.
pub trait RemoteConnector: Send + Sync {
    /// Fails with `RemoteUnavailable` when the handle is gone or access was revoked.
    fn open(&self, credential: &Credential, handle: &RemoteHandle) -> AppResult<Arc<dyn RemoteStore>>;

    /// Create a fresh, empty remote store and return its handle.
    fn provision(&self, credential: &Credential) -> AppResult<RemoteHandle>;
}
