use rpomolog::core::SyncWorker;
use rpomolog::errors::AppResult;
use rpomolog::models::entry::{Entry, EntryUpdate};
use rpomolog::models::operation::{Collection, OpKind};
use rpomolog::models::settings::SettingsMap;
use rpomolog::remote::{MemoryRemote, RemoteStore};
use serde_json::json;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

mod common;
use common::{open_cache, pomodoro};

/// Remote whose first write blocks until the test lets it through.
struct GatedRemote {
    inner: MemoryRemote,
    entered: Mutex<Sender<()>>,
    release: Mutex<Option<Receiver<()>>>,
}

impl GatedRemote {
    fn new() -> (Arc<Self>, Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let remote = Arc::new(Self {
            inner: MemoryRemote::new(),
            entered: Mutex::new(entered_tx),
            release: Mutex::new(Some(release_rx)),
        });
        (remote, entered_rx, release_tx)
    }

    fn gate(&self) {
        let waiting = self.release.lock().unwrap().take();
        if let Some(release) = waiting {
            self.entered.lock().unwrap().send(()).unwrap();
            release.recv().unwrap();
        }
    }
}

impl RemoteStore for GatedRemote {
    fn list_entries(&self) -> AppResult<Vec<Entry>> {
        self.inner.list_entries()
    }

    fn append_entry(&self, entry: &Entry) -> AppResult<()> {
        self.gate();
        self.inner.append_entry(entry)
    }

    fn append_entries(&self, entries: &[Entry]) -> AppResult<()> {
        self.inner.append_entries(entries)
    }

    fn update_entry(&self, entry: &Entry) -> AppResult<bool> {
        self.gate();
        self.inner.update_entry(entry)
    }

    fn delete_entry(&self, id: &str) -> AppResult<bool> {
        self.inner.delete_entry(id)
    }

    fn get_settings(&self) -> AppResult<SettingsMap> {
        self.inner.get_settings()
    }

    fn upsert_settings(&self, settings: &SettingsMap) -> AppResult<()> {
        self.inner.upsert_settings(settings)
    }
}

#[test]
fn drain_applies_every_operation_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = open_cache(&dir, "user.db", true);
    let remote = MemoryRemote::new();
    let worker = SyncWorker::new(cache.path(), cache.state().clone());

    cache.put_entry(pomodoro("a", "2024-03-14T08:00:00Z")).unwrap();
    cache.put_entry(pomodoro("b", "2024-03-14T09:00:00Z")).unwrap();
    cache
        .update_entry(
            "a",
            &EntryUpdate {
                name: Some("planning".into()),
                ..Default::default()
            },
        )
        .unwrap();
    cache.delete_entry("b").unwrap();

    let report = worker.drain_now(&mut cache, &remote).unwrap().unwrap();
    assert_eq!(report.applied, 4);
    assert!(report.is_clean());

    let rows = remote.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "a");
    assert_eq!(rows[0].name, "planning");

    let status = cache.sync_status().unwrap();
    assert_eq!(status.pending_operations, 0);
    assert_eq!(status.unsynced_pomodoros, 0);
    assert!(status.last_sync.is_some());
    assert!(status.last_error.is_none());
}

#[test]
fn failed_operation_stays_queued_and_others_go_through() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = open_cache(&dir, "user.db", true);
    let remote = MemoryRemote::new();
    let worker = SyncWorker::new(cache.path(), cache.state().clone());

    for (id, start) in [
        ("A", "2024-03-14T08:00:00Z"),
        ("B", "2024-03-14T09:00:00Z"),
        ("C", "2024-03-14T10:00:00Z"),
    ] {
        cache.put_entry(pomodoro(id, start)).unwrap();
    }
    remote.fail_for("B");

    let report = worker.drain_now(&mut cache, &remote).unwrap().unwrap();
    assert_eq!(report.applied, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.deferred, 0);
    assert!(report.last_error.as_deref().unwrap().contains("B"));

    let left: Vec<String> = cache
        .drain_queue_view()
        .unwrap()
        .into_iter()
        .map(|op| op.target_id)
        .collect();
    assert_eq!(left, vec!["B"]);

    let status = cache.sync_status().unwrap();
    assert!(status.last_error.is_some());
    assert_eq!(status.unsynced_pomodoros, 1);
    assert!(!cache.get_entry("B").unwrap().unwrap().synced);

    let ids: Vec<String> = remote.rows().into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec!["A", "C"]);

    // once the remote recovers the next drain is clean and clears the error
    remote.heal("B");
    let report = worker.drain_now(&mut cache, &remote).unwrap().unwrap();
    assert_eq!(report.applied, 1);
    assert!(report.is_clean());

    let status = cache.sync_status().unwrap();
    assert_eq!(status.pending_operations, 0);
    assert!(status.last_error.is_none());
    assert_eq!(remote.rows().len(), 3);
}

#[test]
fn later_operations_on_a_failed_record_are_deferred() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = open_cache(&dir, "user.db", true);
    let remote = MemoryRemote::new();
    let worker = SyncWorker::new(cache.path(), cache.state().clone());

    cache.put_entry(pomodoro("x", "2024-03-14T08:00:00Z")).unwrap();
    cache
        .update_entry(
            "x",
            &EntryUpdate {
                duration_minutes: Some(20),
                ..Default::default()
            },
        )
        .unwrap();
    cache.put_entry(pomodoro("y", "2024-03-14T09:00:00Z")).unwrap();
    remote.fail_for("x");

    let report = worker.drain_now(&mut cache, &remote).unwrap().unwrap();
    assert_eq!(report.applied, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.deferred, 1);

    let ops = cache.drain_queue_view().unwrap();
    let kinds: Vec<OpKind> = ops.iter().map(|op| op.kind).collect();
    assert_eq!(kinds, vec![OpKind::Insert, OpKind::Update]);
    assert!(ops.iter().all(|op| op.target_id == "x"));
}

#[test]
fn offline_remote_keeps_the_whole_queue() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = open_cache(&dir, "user.db", true);
    let remote = MemoryRemote::new();
    let worker = SyncWorker::new(cache.path(), cache.state().clone());

    cache.put_entry(pomodoro("a", "2024-03-14T08:00:00Z")).unwrap();
    cache.put_entry(pomodoro("b", "2024-03-14T09:00:00Z")).unwrap();
    remote.set_offline(true);

    let report = worker.drain_now(&mut cache, &remote).unwrap().unwrap();
    assert_eq!(report.applied, 0);
    assert_eq!(report.failed, 2);
    assert_eq!(cache.pending_operations().unwrap(), 2);
    assert_eq!(cache.count_entries().unwrap(), 2);
}

#[test]
fn replayed_insert_does_not_duplicate_the_remote_row() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = open_cache(&dir, "user.db", true);
    let worker = SyncWorker::new(cache.path(), cache.state().clone());

    let stored = cache.put_entry(pomodoro("a", "2024-03-14T08:00:00Z")).unwrap();
    // the row made it remotely but the ack was lost
    let remote = MemoryRemote::with_entries(vec![stored]);

    let report = worker.drain_now(&mut cache, &remote).unwrap().unwrap();
    assert_eq!(report.applied, 1);
    assert_eq!(remote.rows().len(), 1);
}

#[test]
fn deleting_a_row_the_remote_never_had_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = open_cache(&dir, "user.db", true);
    let remote = MemoryRemote::new();
    let worker = SyncWorker::new(cache.path(), cache.state().clone());

    cache
        .enqueue_operation(OpKind::Delete, Collection::Entries, "ghost", None)
        .unwrap();

    let report = worker.drain_now(&mut cache, &remote).unwrap().unwrap();
    assert_eq!(report.applied, 1);
    assert!(report.is_clean());
    assert_eq!(cache.pending_operations().unwrap(), 0);
}

#[test]
fn settings_snapshot_is_upserted_remotely() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = open_cache(&dir, "user.db", true);
    let remote = MemoryRemote::new();
    let worker = SyncWorker::new(cache.path(), cache.state().clone());

    let mut values = SettingsMap::new();
    values.insert("daily_minutes_goal".into(), json!(120));
    values.insert("pomodoro_types".into(), json!(["Deep work", "Admin"]));
    cache.put_settings(&values).unwrap();

    let report = worker.drain_now(&mut cache, &remote).unwrap().unwrap();
    assert_eq!(report.applied, 1);

    let remote_settings = remote.settings();
    assert_eq!(remote_settings.get("daily_minutes_goal"), Some(&json!(120)));
    assert_eq!(
        remote_settings.get("pomodoro_types"),
        Some(&json!(["Deep work", "Admin"]))
    );
    assert_eq!(cache.pending_operations().unwrap(), 0);
}

#[test]
fn background_drain_reaches_the_remote() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = open_cache(&dir, "user.db", true);
    let remote = Arc::new(MemoryRemote::new());
    let worker = SyncWorker::new(cache.path(), cache.state().clone());

    cache.put_entry(pomodoro("a", "2024-03-14T08:00:00Z")).unwrap();

    let handle = worker.trigger(remote.clone()).unwrap();
    let report = handle.wait().unwrap();
    assert_eq!(report.applied, 1);
    assert!(!worker.is_syncing());

    assert_eq!(remote.rows().len(), 1);
    // the drain ran on its own connection; this one sees the result
    assert_eq!(cache.pending_operations().unwrap(), 0);
    assert!(cache.get_entry("a").unwrap().unwrap().synced);
}

#[test]
fn second_trigger_while_draining_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = open_cache(&dir, "user.db", true);
    let worker = SyncWorker::new(cache.path(), cache.state().clone());
    let (remote, entered, release) = GatedRemote::new();

    cache.put_entry(pomodoro("a", "2024-03-14T08:00:00Z")).unwrap();

    let first = worker.trigger(remote.clone()).expect("first drain starts");
    entered
        .recv_timeout(Duration::from_secs(10))
        .expect("drain reached the remote");

    assert!(worker.is_syncing());
    assert!(cache.sync_status().unwrap().syncing);
    assert!(worker.trigger(remote.clone()).is_none());

    // a write made during the drain is queued behind it
    cache.put_entry(pomodoro("b", "2024-03-14T09:00:00Z")).unwrap();

    release.send(()).unwrap();
    let report = first.wait().unwrap();
    assert!(report.applied >= 1);
    assert!(!worker.is_syncing());

    // the slot is free again and picks up whatever is left
    let second = worker.trigger(remote.clone()).expect("slot released");
    second.wait().unwrap();

    assert_eq!(cache.pending_operations().unwrap(), 0);
    assert_eq!(remote.inner.rows().len(), 2);
}
