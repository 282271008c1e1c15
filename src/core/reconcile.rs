//! Reconciliation Engine: one-shot bulk alignment between a cache and its
//! remote store. Nothing here goes through the sync queue.

use crate::core::cache::LocalCache;
use crate::errors::{AppError, AppResult};
use crate::models::direction::{Direction, MigrationOutcome, MigrationRequest};
use crate::models::entry::{Entry, SortOrder, TimeRange};
use crate::models::settings::with_defaults;
use crate::remote::RemoteStore;
use tracing::{debug, info};

/// Entries moved by one pull or push, and those left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferCount {
    pub migrated: usize,
    pub skipped: usize,
}

pub struct Reconciler<'a> {
    remote: &'a dyn RemoteStore,
}

fn remote_err(context: &'static str) -> impl FnOnce(AppError) -> AppError {
    move |e| AppError::Reconcile(format!("{context}: {e}"))
}

impl<'a> Reconciler<'a> {
    pub fn new(remote: &'a dyn RemoteStore) -> Self {
        Self { remote }
    }

    // ------------------------------------------------
    // Pull (remote → local)
    // ------------------------------------------------

    /// Upsert every remote entry locally, marked synced. Local entries the
    /// remote does not know about are kept; entries with a local change
    /// still queued are skipped.
    pub fn pull_entries(&self, cache: &mut LocalCache) -> AppResult<TransferCount> {
        let remote_entries = self
            .remote
            .list_entries()
            .map_err(remote_err("reading remote pomodoros"))?;
        let written = cache.upsert_synced_entries(&remote_entries)?;
        debug!(count = written, "pulled pomodoros");
        Ok(TransferCount {
            migrated: written,
            skipped: remote_entries.len() - written,
        })
    }

    /// Replace local settings with the remote ones, unset keys taking defaults.
    pub fn pull_settings(&self, cache: &mut LocalCache) -> AppResult<usize> {
        let remote_settings = self
            .remote
            .get_settings()
            .map_err(remote_err("reading remote settings"))?;
        let merged = with_defaults(remote_settings);
        cache.replace_settings_synced(&merged)
    }

    /// Pull both collections and stamp `last_full_sync`. Returns the number
    /// of entries pulled.
    pub fn full_pull(&self, cache: &mut LocalCache) -> AppResult<usize> {
        let pulled = self.pull_entries(cache)?.migrated;
        self.pull_settings(cache)?;
        cache.record_full_sync()?;
        info!(pulled, "full pull completed");
        Ok(pulled)
    }

    // ------------------------------------------------
    // Push (local → remote)
    // ------------------------------------------------

    /// Upload, in one batch, the entries of `source` whose id the remote does
    /// not have yet. Returns what was uploaded alongside the counts.
    fn upload_missing(&self, source: &LocalCache) -> AppResult<(Vec<Entry>, TransferCount)> {
        let existing = self
            .remote
            .entry_ids()
            .map_err(remote_err("reading remote pomodoro ids"))?;

        let (present, missing): (Vec<Entry>, Vec<Entry>) = source
            .list_entries(&TimeRange::all(), SortOrder::OldestFirst)?
            .into_iter()
            .partition(|e| existing.contains(&e.id));

        if !missing.is_empty() {
            self.remote
                .append_entries(&missing)
                .map_err(remote_err("uploading pomodoros"))?;
        }

        let count = TransferCount {
            migrated: missing.len(),
            skipped: present.len(),
        };
        Ok((missing, count))
    }

    pub fn push_entries(&self, cache: &mut LocalCache) -> AppResult<TransferCount> {
        let (uploaded, count) = self.upload_missing(cache)?;
        cache.mark_entries_synced(uploaded.iter().map(|e| e.id.as_str()))?;
        info!(migrated = count.migrated, skipped = count.skipped, "pushed pomodoros");
        Ok(count)
    }

    /// Push the anonymous shared cache, then empty it.
    pub fn push_shared(&self, shared: &mut LocalCache) -> AppResult<TransferCount> {
        let (_, count) = self.upload_missing(shared)?;
        let cleared = shared.clear_entries()?;
        info!(
            migrated = count.migrated,
            skipped = count.skipped,
            cleared,
            "migrated shared cache"
        );
        Ok(count)
    }

    /// Overwrite the remote settings with every locally stored key.
    pub fn push_settings(&self, cache: &mut LocalCache) -> AppResult<usize> {
        let stored = cache.stored_settings()?;
        if stored.is_empty() {
            return Ok(0);
        }
        self.remote
            .upsert_settings(&stored)
            .map_err(remote_err("uploading settings"))?;
        cache.mark_settings_synced()?;
        Ok(stored.len())
    }

    // ------------------------------------------------
    // User-directed migration
    // ------------------------------------------------

    /// Apply one direction per collection. `shared` is the anonymous cache,
    /// `None` when it is the same file as `cache` or does not exist.
    pub fn migrate(
        &self,
        request: MigrationRequest,
        cache: &mut LocalCache,
        shared: Option<&mut LocalCache>,
    ) -> AppResult<MigrationOutcome> {
        if request.settings == Direction::PushShared {
            return Err(AppError::InvalidDirection(
                "settings cannot be migrated from the shared cache".into(),
            ));
        }

        let mut outcome = MigrationOutcome {
            pomodoros_direction: request.entries,
            settings_direction: request.settings,
            ..Default::default()
        };

        // 1) pomodoros
        match request.entries {
            Direction::Pull => {
                let c = self.pull_entries(cache)?;
                outcome.pomodoros_migrated = c.migrated;
                outcome.pomodoros_skipped = c.skipped;
            }
            Direction::Push => {
                let c = self.push_entries(cache)?;
                outcome.pomodoros_migrated = c.migrated;
                outcome.pomodoros_skipped = c.skipped;
            }
            Direction::PushShared => {
                if let Some(shared) = shared {
                    let c = self.push_shared(shared)?;
                    outcome.pomodoros_migrated = c.migrated;
                    outcome.pomodoros_skipped = c.skipped;
                } else {
                    debug!("no separate shared cache, nothing to migrate");
                }
            }
            Direction::Skip => {}
        }

        // 2) settings
        match request.settings {
            Direction::Pull => {
                outcome.settings_migrated = self.pull_settings(cache)?;
            }
            Direction::Push => {
                outcome.settings_migrated = self.push_settings(cache)?;
            }
            Direction::PushShared | Direction::Skip => {}
        }

        Ok(outcome)
    }
}
