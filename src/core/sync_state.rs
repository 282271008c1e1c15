//! Per-cache, in-process drain state. One instance is shared (through the
//! storage registry) by every handle on the same cache file, so the
//! "drain in progress" test-and-set is seen by all concurrent requests.

use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Flags {
    syncing: bool,
    last_error: Option<String>,
}

#[derive(Debug, Default)]
pub struct SyncState {
    flags: Mutex<Flags>,
}

impl SyncState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, Flags> {
        self.flags.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Claim the drain slot. `None` when a drain is already running.
    pub fn try_begin(self: &Arc<Self>) -> Option<DrainGuard> {
        let mut flags = self.lock();
        if flags.syncing {
            return None;
        }
        flags.syncing = true;
        Some(DrainGuard {
            state: Arc::clone(self),
        })
    }

    pub fn is_syncing(&self) -> bool {
        self.lock().syncing
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn set_last_error(&self, error: Option<String>) {
        self.lock().last_error = error;
    }
}

/// Releases the drain slot when dropped, also when the drain panics.
#[derive(Debug)]
pub struct DrainGuard {
    state: Arc<SyncState>,
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        self.state.lock().syncing = false;
    }
}
