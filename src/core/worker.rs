//! Sync Worker: drains the queue of one cache against its remote store.
//!
//! At most one drain runs per cache file. `trigger` claims the slot in the
//! shared `SyncState` and runs the drain on its own thread with its own
//! connection; a second trigger while the slot is taken is a no-op.

use crate::core::cache::LocalCache;
use crate::core::sync_state::{DrainGuard, SyncState};
use crate::errors::{AppError, AppResult};
use crate::models::entry::Entry;
use crate::models::operation::{Collection, OpKind, QueuedOperation};
use crate::models::settings::SettingsMap;
use crate::remote::RemoteStore;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// What one drain did with the queue it found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// applied remotely and removed from the queue
    pub applied: usize,
    pub failed: usize,
    /// not attempted: an earlier operation on the same record failed
    pub deferred: usize,
    pub last_error: Option<String>,
}

impl DrainReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.deferred == 0
    }
}

/// Completion handle of a background drain.
pub struct DrainHandle {
    join: JoinHandle<AppResult<DrainReport>>,
}

impl DrainHandle {
    /// Block until the drain finishes.
    pub fn wait(self) -> AppResult<DrainReport> {
        self.join
            .join()
            .map_err(|_| AppError::Other("sync worker panicked".into()))?
    }
}

pub struct SyncWorker {
    cache_path: PathBuf,
    state: Arc<SyncState>,
}

impl SyncWorker {
    pub fn new(cache_path: impl Into<PathBuf>, state: Arc<SyncState>) -> Self {
        Self {
            cache_path: cache_path.into(),
            state,
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn is_syncing(&self) -> bool {
        self.state.is_syncing()
    }

    /// Start a drain in the background. Returns `None` when one is already
    /// running for this cache.
    pub fn trigger(&self, remote: Arc<dyn RemoteStore>) -> Option<DrainHandle> {
        let Some(guard) = self.state.try_begin() else {
            debug!(cache = %self.cache_path.display(), "drain already in progress, trigger ignored");
            return None;
        };

        let path = self.cache_path.clone();
        let state = Arc::clone(&self.state);

        let spawned = thread::Builder::new()
            .name("rpomolog-sync".into())
            .spawn(move || {
                let _guard: DrainGuard = guard;
                let mut cache = LocalCache::open(&path, state)?;
                cache.set_linked(true);
                drain(&mut cache, remote.as_ref())
            });

        match spawned {
            Ok(join) => Some(DrainHandle { join }),
            Err(e) => {
                // the guard went down with the closure, the slot is free again
                warn!(error = %e, "cannot start sync worker");
                self.state
                    .set_last_error(Some(format!("cannot start sync worker: {e}")));
                None
            }
        }
    }

    /// Drain on the caller's thread, using the caller's connection.
    pub fn drain_now(
        &self,
        cache: &mut LocalCache,
        remote: &dyn RemoteStore,
    ) -> AppResult<Option<DrainReport>> {
        let Some(_guard) = self.state.try_begin() else {
            return Ok(None);
        };
        drain(cache, remote).map(Some)
    }
}

/// Replay every queued operation in sequence order.
///
/// Each success is acked and committed before the next operation runs. A
/// failure leaves the operation queued, is written to the sync metadata, and
/// defers later operations on the same record for the rest of this drain.
fn drain(cache: &mut LocalCache, remote: &dyn RemoteStore) -> AppResult<DrainReport> {
    let ops = cache.drain_queue_view()?;
    let mut report = DrainReport::default();

    if ops.is_empty() {
        cache.record_sync_result(true)?;
        return Ok(report);
    }

    debug!(count = ops.len(), "draining sync queue");
    let mut blocked: HashSet<(Collection, String)> = HashSet::new();

    for op in &ops {
        let (collection, target) = op.target();
        if blocked.contains(&(collection, target.to_string())) {
            report.deferred += 1;
            continue;
        }

        match apply_operation(remote, op) {
            Ok(()) => {
                cache.ack_operation(op)?;
                report.applied += 1;
            }
            Err(e) => {
                let msg = format!(
                    "{} {} {}: {}",
                    op.kind.to_db_str(),
                    collection.to_db_str(),
                    target,
                    e
                );
                warn!(sequence = op.sequence, error = %msg, "queued operation failed");
                cache.record_sync_error(&msg)?;
                blocked.insert((collection, target.to_string()));
                report.failed += 1;
                report.last_error = Some(msg);
            }
        }
    }

    cache.record_sync_result(report.is_clean())?;
    info!(
        applied = report.applied,
        failed = report.failed,
        deferred = report.deferred,
        "drain finished"
    );
    Ok(report)
}

fn apply_operation(remote: &dyn RemoteStore, op: &QueuedOperation) -> AppResult<()> {
    match (op.kind, op.collection) {
        (OpKind::Insert | OpKind::Update, Collection::Entries) => {
            let entry: Entry = serde_json::from_value(payload(op)?.clone())?;
            // upsert: a replayed insert must not duplicate the row
            if !remote.update_entry(&entry)? {
                remote.append_entry(&entry)?;
            }
        }
        (OpKind::Delete, Collection::Entries) => {
            if !remote.delete_entry(&op.target_id)? {
                debug!(id = %op.target_id, "row already gone remotely");
            }
        }
        (OpKind::Insert | OpKind::Update, Collection::Settings) => {
            let settings: SettingsMap = serde_json::from_value(payload(op)?.clone())?;
            remote.upsert_settings(&settings)?;
        }
        (OpKind::Delete, Collection::Settings) => {}
    }
    Ok(())
}

fn payload(op: &QueuedOperation) -> AppResult<&serde_json::Value> {
    op.payload
        .as_ref()
        .ok_or_else(|| AppError::Other(format!("queued operation {} has no payload", op.sequence)))
}
