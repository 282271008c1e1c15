//! `Tracker`: the operations exposed to the CLI, over the cache of whoever
//! is signed in.
//!
//! Foreground calls only touch the local cache. When a remote store is
//! linked, every mutation ends by triggering a background drain; the
//! returned handles are kept so the caller can wait before exiting.

use crate::core::cache::LocalCache;
use crate::core::link::{LinkSource, RemoteLink, current_link, link_identity};
use crate::core::reconcile::Reconciler;
use crate::core::report::{ReportWindow, build_report};
use crate::core::worker::{DrainHandle, DrainReport, SyncWorker};
use crate::db::log::ttlog;
use crate::errors::{AppError, AppResult};
use crate::export::{export_csv_file, write_csv};
use crate::identity::{Identity, IdentityProvider, StorageRegistry};
use crate::models::direction::{MigrationOutcome, MigrationRequest};
use crate::models::entry::{Entry, EntryUpdate, ManualEntry, NewEntry, SortOrder, TimeRange};
use crate::models::report::{Report, ReportPeriod};
use crate::models::settings::{POMODORO_TYPES_KEY, SettingsMap, default_settings, pomodoro_types};
use crate::models::sync_status::{SourceCounts, SyncStatus};
use crate::remote::{Credential, RemoteConnector, RemoteStore};
use crate::utils::clock::Clock;
use chrono::NaiveDate;
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Collaborators shared by every `Tracker` of a process.
#[derive(Clone)]
pub struct TrackerContext {
    pub registry: Arc<StorageRegistry>,
    pub provider: Arc<dyn IdentityProvider>,
    pub connector: Arc<dyn RemoteConnector>,
    pub clock: Arc<dyn Clock>,
    pub default_duration_minutes: i64,
}

pub struct Tracker {
    ctx: TrackerContext,
    identity: Option<Identity>,
    link: Option<RemoteLink>,
    cache: LocalCache,
    worker: SyncWorker,
    pending: Vec<DrainHandle>,
}

impl Tracker {
    /// Open the cache of the signed-in identity (the shared cache otherwise).
    pub fn open(ctx: TrackerContext) -> AppResult<Self> {
        let identity = ctx.provider.current_identity()?;
        let link = current_link(ctx.provider.as_ref())?;

        let mut cache = ctx.registry.open_cache(identity.as_ref())?;
        cache.set_linked(link.is_some());
        let worker = ctx.registry.worker_for(cache.path());

        debug!(
            identity = identity.as_ref().map(Identity::as_str),
            linked = link.is_some(),
            cache = %cache.path().display(),
            "tracker opened"
        );

        Ok(Self {
            ctx,
            identity,
            link,
            cache,
            worker,
            pending: Vec::new(),
        })
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn link(&self) -> Option<&RemoteLink> {
        self.link.as_ref()
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut LocalCache {
        &mut self.cache
    }

    fn require_link(&self) -> AppResult<&RemoteLink> {
        self.link.as_ref().ok_or(AppError::NotLoggedIn)
    }

    fn open_remote(&self) -> AppResult<Arc<dyn RemoteStore>> {
        self.require_link()?.open(self.ctx.connector.as_ref())
    }

    /// Point this tracker at another cache file.
    fn rebind(&mut self, identity: Option<Identity>, link: Option<RemoteLink>) -> AppResult<()> {
        self.wait_for_sync()?;

        let mut cache = self.ctx.registry.open_cache(identity.as_ref())?;
        cache.set_linked(link.is_some());
        self.worker = self.ctx.registry.worker_for(cache.path());
        self.cache = cache;
        self.identity = identity;
        self.link = link;
        Ok(())
    }

    // ------------------------------------------------
    // Session
    // ------------------------------------------------

    /// Sign in and link the identity's remote store (reused or provisioned).
    pub fn login(&mut self, identity: Identity, credential: Credential) -> AppResult<LinkSource> {
        self.ctx.provider.sign_in(&identity, credential.clone())?;
        let (link, source) = link_identity(
            self.ctx.provider.as_ref(),
            self.ctx.connector.as_ref(),
            &identity,
            &credential,
        )?;

        let handle = link.handle.clone();
        self.rebind(Some(identity.clone()), Some(link))?;

        let _ = ttlog(
            self.cache.conn(),
            "login",
            identity.as_str(),
            &format!("linked remote store {handle} ({source:?})"),
        );
        Ok(source)
    }

    /// Sign out, switch back to the shared cache and delete the identity's
    /// local cache. Returns who was signed in.
    pub fn logout(&mut self) -> AppResult<Option<Identity>> {
        let previous = self.ctx.provider.sign_out()?;
        // the identity's connection must be closed before its file goes away
        self.rebind(None, None)?;
        if let Some(identity) = &previous {
            self.ctx.registry.remove_cache(identity)?;
        }
        Ok(previous)
    }

    // ------------------------------------------------
    // Entries
    // ------------------------------------------------

    fn check_category(&self, category: &str) -> AppResult<()> {
        let types = pomodoro_types(&self.cache.get_settings()?);
        if types.iter().any(|t| t == category) {
            return Ok(());
        }
        Err(AppError::InvalidCategory(format!(
            "'{}' (known types: {})",
            category,
            types.join(", ")
        )))
    }

    /// Record a pomodoro that just finished: it ends now.
    pub fn create_entry(&mut self, input: NewEntry) -> AppResult<Entry> {
        self.check_category(&input.category)?;
        let duration = input
            .duration_minutes
            .unwrap_or(self.ctx.default_duration_minutes);

        let entry = Entry::completed_at(
            self.ctx.clock.now(),
            &input.category,
            duration,
            input.name,
            input.notes,
        )?;
        let stored = self.cache.put_entry(entry)?;
        self.after_mutation();
        Ok(stored)
    }

    pub fn create_manual_entry(&mut self, input: ManualEntry) -> AppResult<Entry> {
        self.check_category(&input.category)?;
        let entry = Entry::manual(input)?;
        let stored = self.cache.put_entry(entry)?;
        self.after_mutation();
        Ok(stored)
    }

    pub fn update_entry(&mut self, id: &str, update: &EntryUpdate) -> AppResult<Entry> {
        if let Some(category) = &update.category {
            let current = self
                .cache
                .get_entry(id)?
                .ok_or_else(|| AppError::EntryNotFound(id.to_string()))?;
            if &current.category != category {
                self.check_category(category)?;
            }
        }

        let updated = self.cache.update_entry(id, update)?;
        self.after_mutation();
        Ok(updated)
    }

    pub fn delete_entry(&mut self, id: &str) -> AppResult<()> {
        self.cache.delete_entry(id)?;
        self.after_mutation();
        Ok(())
    }

    pub fn get_entry(&self, id: &str) -> AppResult<Option<Entry>> {
        self.cache.get_entry(id)
    }

    pub fn list_entries(&self, range: &TimeRange, order: SortOrder) -> AppResult<Vec<Entry>> {
        self.cache.list_entries(range, order)
    }

    // ------------------------------------------------
    // Settings
    // ------------------------------------------------

    pub fn settings(&self) -> AppResult<SettingsMap> {
        self.cache.get_settings()
    }

    /// Store the given keys and return the full settings afterwards.
    pub fn save_settings(&mut self, values: &SettingsMap) -> AppResult<SettingsMap> {
        validate_settings(values)?;
        self.cache.put_settings(values)?;
        self.after_mutation();
        self.cache.get_settings()
    }

    // ------------------------------------------------
    // Reports / export
    // ------------------------------------------------

    pub fn report(&self, period: ReportPeriod, date: NaiveDate) -> AppResult<Report> {
        self.report_window(period, &ReportWindow::for_period(period, date))
    }

    pub fn report_window(&self, period: ReportPeriod, window: &ReportWindow) -> AppResult<Report> {
        let entries = self
            .cache
            .list_entries(&window.range(), SortOrder::OldestFirst)?;
        Ok(build_report(period, window, &entries))
    }

    /// Every entry as CSV, newest first.
    pub fn export_csv<W: Write>(&self, out: W) -> AppResult<usize> {
        let entries = self
            .cache
            .list_entries(&TimeRange::all(), SortOrder::NewestFirst)?;
        write_csv(out, &entries)
    }

    pub fn export_csv_file(&self, path: &Path, force: bool) -> AppResult<usize> {
        let entries = self
            .cache
            .list_entries(&TimeRange::all(), SortOrder::NewestFirst)?;
        export_csv_file(path, &entries, force)
    }

    // ------------------------------------------------
    // Sync
    // ------------------------------------------------

    pub fn sync_status(&self) -> AppResult<SyncStatus> {
        let mut status = self.cache.sync_status()?;
        if status.last_error.is_none() {
            status.last_error = self.cache.state().last_error();
        }
        Ok(status)
    }

    fn after_mutation(&mut self) {
        if self.link.is_none() {
            return;
        }
        // the local write already succeeded; sync problems only show up in the status
        if let Err(e) = self.trigger_sync() {
            warn!(error = %e, "could not trigger sync");
        }
    }

    /// Start a background drain. `Ok(false)` when not linked, when a drain
    /// is already running, or when the remote store cannot be opened (the
    /// error is recorded in the sync metadata).
    pub fn trigger_sync(&mut self) -> AppResult<bool> {
        if self.link.is_none() {
            return Ok(false);
        }

        let remote = match self.open_remote() {
            Ok(remote) => remote,
            Err(e) => {
                warn!(error = %e, "remote store unavailable, operations stay queued");
                self.cache.record_sync_error(&e.to_string())?;
                return Ok(false);
            }
        };

        match self.worker.trigger(remote) {
            Some(handle) => {
                self.pending.push(handle);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Wait for every drain started by this tracker.
    pub fn wait_for_sync(&mut self) -> AppResult<Vec<DrainReport>> {
        self.pending.drain(..).map(DrainHandle::wait).collect()
    }

    /// Drain the queue now and wait for it. `None` when another drain held
    /// the slot.
    pub fn push_pending(&mut self) -> AppResult<Option<DrainReport>> {
        self.require_link()?;
        self.wait_for_sync()?;
        let remote = self.open_remote()?;
        match self.worker.trigger(remote) {
            Some(handle) => handle.wait().map(Some),
            None => Ok(None),
        }
    }

    /// Full pull from the remote store, then a drain of local changes.
    /// Returns the number of entries pulled.
    pub fn sync_now(&mut self) -> AppResult<usize> {
        let remote = self.open_remote()?;
        let pulled = Reconciler::new(remote.as_ref()).full_pull(&mut self.cache)?;

        let _ = ttlog(
            self.cache.conn(),
            "sync",
            "full pull",
            &format!("{pulled} pomodoro(s) pulled"),
        );

        self.trigger_sync()?;
        Ok(pulled)
    }

    /// Entry counts on both sides, shown before a migration.
    pub fn check_sources(&self) -> AppResult<SourceCounts> {
        let link = self.require_link()?;
        let remote = self.open_remote()?;

        let shared_cache_count = match self.ctx.registry.open_shared_cache_for(&link.identity)? {
            Some(shared) => shared.count_entries()?,
            None => 0,
        };

        Ok(SourceCounts {
            local_count: self.cache.count_entries()?,
            shared_cache_count,
            remote_count: remote.list_entries()?.len(),
            needs_initial_sync: self.ctx.provider.needs_initial_sync()?,
        })
    }

    pub fn needs_initial_sync(&self) -> AppResult<bool> {
        self.ctx.provider.needs_initial_sync()
    }

    /// User-directed reconciliation. Clears `needs_initial_sync` once done,
    /// whatever the directions were.
    pub fn migrate(&mut self, request: MigrationRequest) -> AppResult<MigrationOutcome> {
        let identity = self.require_link()?.identity.clone();
        self.wait_for_sync()?;
        let remote = self.open_remote()?;

        let mut shared = self.ctx.registry.open_shared_cache_for(&identity)?;
        let outcome = Reconciler::new(remote.as_ref()).migrate(request, &mut self.cache, shared.as_mut())?;

        self.ctx.provider.set_needs_initial_sync(false)?;

        let _ = ttlog(
            self.cache.conn(),
            "migrate",
            identity.as_str(),
            &format!(
                "pomodoros {} ({} migrated, {} skipped), settings {} ({} migrated)",
                outcome.pomodoros_direction.as_str(),
                outcome.pomodoros_migrated,
                outcome.pomodoros_skipped,
                outcome.settings_direction.as_str(),
                outcome.settings_migrated
            ),
        );
        Ok(outcome)
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.wait() {
                warn!(error = %e, "background drain failed");
            }
        }
    }
}

/// Known keys must keep the JSON type of their default; `pomodoro_types`
/// must be a non-empty list of names.
fn validate_settings(values: &SettingsMap) -> AppResult<()> {
    let defaults = default_settings();

    for (key, value) in values {
        if key == POMODORO_TYPES_KEY {
            let ok = value.as_array().is_some_and(|items| {
                !items.is_empty()
                    && items
                        .iter()
                        .all(|v| v.as_str().is_some_and(|s| !s.trim().is_empty()))
            });
            if !ok {
                return Err(AppError::InvalidSetting(format!(
                    "{key} must be a non-empty list of names"
                )));
            }
            continue;
        }

        if let Some(default) = defaults.get(key)
            && !same_kind(default, value)
        {
            return Err(AppError::InvalidSetting(format!(
                "{key} expects a value like {default}, got {value}"
            )));
        }
    }
    Ok(())
}

fn same_kind(a: &Value, b: &Value) -> bool {
    matches!(
        (a, b),
        (Value::Bool(_), Value::Bool(_))
            | (Value::Number(_), Value::Number(_))
            | (Value::String(_), Value::String(_))
            | (Value::Array(_), Value::Array(_))
            | (Value::Object(_), Value::Object(_))
    )
}
