use rpomolog::errors::AppError;
use rpomolog::models::entry::{EntryUpdate, SortOrder, TimeRange};
use rpomolog::models::operation::{Collection, OpKind};
use rpomolog::models::settings::{ALL_SETTINGS_ID, SettingsMap, default_settings};
use serde_json::json;

mod common;
use common::{open_cache, pomodoro, ts};

#[test]
fn unlinked_writes_are_synced_and_not_queued() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = open_cache(&dir, "pomodoros.db", false);

    let stored = cache.put_entry(pomodoro("a", "2024-03-14T09:00:00Z")).unwrap();
    assert!(stored.synced);

    cache
        .update_entry(
            "a",
            &EntryUpdate {
                name: Some("renamed".into()),
                ..Default::default()
            },
        )
        .unwrap();
    cache.delete_entry("a").unwrap();

    assert_eq!(cache.pending_operations().unwrap(), 0);
    assert!(cache.drain_queue_view().unwrap().is_empty());
}

#[test]
fn linked_writes_queue_snapshots_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = open_cache(&dir, "user.db", true);

    let stored = cache.put_entry(pomodoro("a", "2024-03-14T09:00:00Z")).unwrap();
    assert!(!stored.synced);

    let updated = cache
        .update_entry(
            "a",
            &EntryUpdate {
                name: Some("deep work".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.name, "deep work");
    assert_eq!(updated.id, "a");

    cache.delete_entry("a").unwrap();

    let ops = cache.drain_queue_view().unwrap();
    let kinds: Vec<OpKind> = ops.iter().map(|op| op.kind).collect();
    assert_eq!(kinds, vec![OpKind::Insert, OpKind::Update, OpKind::Delete]);
    assert!(ops.windows(2).all(|w| w[0].sequence < w[1].sequence));
    assert!(ops.iter().all(|op| op.collection == Collection::Entries && op.target_id == "a"));

    // the update carries the record as it was after the change
    let payload = ops[1].payload.as_ref().unwrap();
    assert_eq!(payload["name"], json!("deep work"));
    assert_eq!(payload["type"], json!("Product"));
    assert!(ops[2].payload.is_none());
}

#[test]
fn update_and_delete_of_unknown_id_fail() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = open_cache(&dir, "user.db", true);

    let err = cache
        .update_entry("missing", &EntryUpdate::default())
        .unwrap_err();
    assert!(matches!(err, AppError::EntryNotFound(id) if id == "missing"));

    let err = cache.delete_entry("missing").unwrap_err();
    assert!(matches!(err, AppError::EntryNotFound(_)));

    assert_eq!(cache.pending_operations().unwrap(), 0);
}

#[test]
fn update_rejects_end_before_start() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = open_cache(&dir, "user.db", true);
    cache.put_entry(pomodoro("a", "2024-03-14T09:00:00Z")).unwrap();

    let err = cache
        .update_entry(
            "a",
            &EntryUpdate {
                end_time: Some(ts("2024-03-14T08:00:00Z")),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTime(_)));

    // nothing changed, nothing queued besides the insert
    assert_eq!(cache.pending_operations().unwrap(), 1);
    let stored = cache.get_entry("a").unwrap().unwrap();
    assert_eq!(stored.end_time, ts("2024-03-14T09:25:00Z"));
}

#[test]
fn range_listing_is_half_open_on_start_time() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = open_cache(&dir, "pomodoros.db", false);

    cache.put_entry(pomodoro("early", "2024-03-13T23:59:00Z")).unwrap();
    cache.put_entry(pomodoro("first", "2024-03-14T00:00:00Z")).unwrap();
    cache.put_entry(pomodoro("second", "2024-03-14T12:00:00Z")).unwrap();
    cache.put_entry(pomodoro("next-day", "2024-03-15T00:00:00Z")).unwrap();

    let range = TimeRange::new(
        Some(ts("2024-03-14T00:00:00Z")),
        Some(ts("2024-03-15T00:00:00Z")),
    );

    let newest: Vec<String> = cache
        .list_entries(&range, SortOrder::NewestFirst)
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(newest, vec!["second", "first"]);

    let oldest: Vec<String> = cache
        .list_entries(&range, SortOrder::OldestFirst)
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(oldest, vec!["first", "second"]);

    assert_eq!(
        cache
            .list_entries(&TimeRange::all(), SortOrder::NewestFirst)
            .unwrap()
            .len(),
        4
    );
    assert_eq!(cache.count_entries().unwrap(), 4);
}

#[test]
fn settings_overlay_defaults_and_queue_full_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = open_cache(&dir, "user.db", true);

    let defaults = cache.get_settings().unwrap();
    assert_eq!(defaults, default_settings());
    assert!(cache.stored_settings().unwrap().is_empty());

    let mut first = SettingsMap::new();
    first.insert("daily_minutes_goal".into(), json!(120));
    cache.put_settings(&first).unwrap();

    let mut second = SettingsMap::new();
    second.insert("sound_enabled".into(), json!(false));
    cache.put_settings(&second).unwrap();

    assert_eq!(cache.get_setting("daily_minutes_goal").unwrap(), Some(json!(120)));
    assert_eq!(cache.get_setting("sound_enabled").unwrap(), Some(json!(false)));
    assert_eq!(cache.get_setting("long_break_minutes").unwrap(), Some(json!(15)));

    let ops = cache.drain_queue_view().unwrap();
    assert_eq!(ops.len(), 2);
    let last = &ops[1];
    assert_eq!(last.kind, OpKind::Update);
    assert_eq!(last.collection, Collection::Settings);
    assert_eq!(last.target_id, ALL_SETTINGS_ID);

    // the snapshot holds every stored key, not just the ones of this call
    let payload = last.payload.as_ref().unwrap();
    assert_eq!(payload["daily_minutes_goal"], json!(120));
    assert_eq!(payload["sound_enabled"], json!(false));
}

#[test]
fn ack_marks_synced_only_when_nothing_else_is_queued() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = open_cache(&dir, "user.db", true);

    cache.put_entry(pomodoro("a", "2024-03-14T09:00:00Z")).unwrap();
    cache
        .update_entry(
            "a",
            &EntryUpdate {
                notes: Some(Some("interrupted twice".into())),
                ..Default::default()
            },
        )
        .unwrap();

    let ops = cache.drain_queue_view().unwrap();
    assert_eq!(ops.len(), 2);

    cache.ack_operation(&ops[0]).unwrap();
    assert!(!cache.get_entry("a").unwrap().unwrap().synced);
    assert_eq!(cache.sync_status().unwrap().unsynced_pomodoros, 1);

    cache.ack_operation(&ops[1]).unwrap();
    assert!(cache.get_entry("a").unwrap().unwrap().synced);

    let status = cache.sync_status().unwrap();
    assert_eq!(status.pending_operations, 0);
    assert_eq!(status.unsynced_pomodoros, 0);
}

#[test]
fn queue_survives_reopening_the_cache() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut cache = open_cache(&dir, "user.db", true);
        cache.put_entry(pomodoro("a", "2024-03-14T09:00:00Z")).unwrap();
        cache.put_entry(pomodoro("b", "2024-03-14T10:00:00Z")).unwrap();
    }

    let cache = open_cache(&dir, "user.db", true);
    let ids: Vec<String> = cache
        .drain_queue_view()
        .unwrap()
        .into_iter()
        .map(|op| op.target_id)
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert!(!cache.sync_status().unwrap().syncing);
}

#[test]
fn sync_metadata_tracks_errors_until_a_clean_drain() {
    let dir = tempfile::tempdir().unwrap();
    let cache = open_cache(&dir, "user.db", true);

    let status = cache.sync_status().unwrap();
    assert!(status.last_sync.is_none());
    assert!(status.last_error.is_none());
    assert!(status.remote_connected);

    cache.record_sync_error("UPDATE pomodoros a: offline").unwrap();
    cache.record_sync_result(false).unwrap();

    let status = cache.sync_status().unwrap();
    assert!(status.last_sync.is_some());
    assert_eq!(status.last_error.as_deref(), Some("UPDATE pomodoros a: offline"));

    cache.record_sync_result(true).unwrap();
    assert!(cache.sync_status().unwrap().last_error.is_none());
    assert!(cache.state().last_error().is_none());
}
