#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, TimeZone, Utc};
use rpomolog::core::sync_state::SyncState;
use rpomolog::core::{LocalCache, Tracker, TrackerContext};
use rpomolog::identity::{FileIdentityProvider, StorageRegistry};
use rpomolog::models::entry::Entry;
use rpomolog::remote::MemoryConnector;
use rpomolog::utils::clock::FixedClock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub fn rpo() -> Command {
    cargo_bin_cmd!("rpomolog")
}

/// `rpomolog --data-dir <dir> --test <args...>`
pub fn rpo_in(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = rpo();
    cmd.arg("--data-dir").arg(dir).arg("--test").args(args);
    cmd
}

/// 2024-03-14 10:00:00 UTC, a Thursday.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 14, 10, 0, 0).unwrap()
}

pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

/// A finished pomodoro with explicit times; the duration follows the interval.
pub fn entry(id: &str, category: &str, start: &str, end: &str) -> Entry {
    let start_time = ts(start);
    let end_time = ts(end);
    Entry {
        id: id.to_string(),
        name: format!("task {id}"),
        category: category.to_string(),
        start_time,
        end_time,
        duration_minutes: (end_time - start_time).num_minutes(),
        notes: None,
        synced: false,
    }
}

/// Short form for a 25-minute "Product" pomodoro starting at `start`.
pub fn pomodoro(id: &str, start: &str) -> Entry {
    let start_time = ts(start);
    let end = start_time + chrono::Duration::minutes(25);
    entry(id, "Product", start, &end.to_rfc3339())
}

pub fn open_cache(dir: &TempDir, name: &str, linked: bool) -> LocalCache {
    let mut cache = LocalCache::open(dir.path().join(name), SyncState::new()).unwrap();
    cache.set_linked(linked);
    cache
}

/// Everything a `Tracker` needs, backed by a temp dir and in-memory remotes.
pub struct TestEnv {
    pub dir: TempDir,
    pub registry: Arc<StorageRegistry>,
    pub provider: Arc<FileIdentityProvider>,
    pub connector: Arc<MemoryConnector>,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        Self {
            registry: Arc::new(StorageRegistry::new(dir.path())),
            provider: Arc::new(FileIdentityProvider::new(dir.path())),
            connector: Arc::new(MemoryConnector::new()),
            dir,
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn context(&self) -> TrackerContext {
        TrackerContext {
            registry: self.registry.clone(),
            provider: self.provider.clone(),
            connector: self.connector.clone(),
            clock: Arc::new(FixedClock(fixed_now())),
            default_duration_minutes: 25,
        }
    }

    pub fn tracker(&self) -> Tracker {
        Tracker::open(self.context()).unwrap()
    }
}
