use rpomolog::errors::AppError;
use rpomolog::models::settings::SettingsMap;
use rpomolog::remote::{Credential, RemoteConnector, RemoteHandle, SheetConnector};
use serde_json::json;
use std::fs::OpenOptions;
use std::io::Write;

mod common;
use common::pomodoro;

fn connector(dir: &tempfile::TempDir) -> SheetConnector {
    SheetConnector::new(dir.path().join("sheets"))
}

#[test]
fn provisioned_store_starts_empty_and_can_be_reopened() {
    let dir = tempfile::tempdir().unwrap();
    let sheets = connector(&dir);
    let cred = Credential::new("token");

    let handle = sheets.provision(&cred).unwrap();
    let store = sheets.open(&cred, &handle).unwrap();
    assert!(store.list_entries().unwrap().is_empty());
    assert!(store.get_settings().unwrap().is_empty());

    store
        .append_entry(&pomodoro("a", "2024-03-14T09:00:00Z"))
        .unwrap();

    let again = sheets.open(&cred, &handle).unwrap();
    assert_eq!(again.list_entries().unwrap().len(), 1);
}

#[test]
fn rows_are_located_by_id() {
    let dir = tempfile::tempdir().unwrap();
    let sheets = connector(&dir);
    let cred = Credential::new("token");
    let store = sheets.open(&cred, &sheets.provision(&cred).unwrap()).unwrap();

    store
        .append_entries(&[
            pomodoro("a", "2024-03-14T09:00:00Z"),
            pomodoro("b", "2024-03-14T10:00:00Z"),
            pomodoro("c", "2024-03-14T11:00:00Z"),
        ])
        .unwrap();

    let mut changed = pomodoro("b", "2024-03-14T10:00:00Z");
    changed.name = "rewritten".into();
    changed.notes = Some("with notes".into());
    assert!(store.update_entry(&changed).unwrap());
    assert!(!store.update_entry(&pomodoro("zzz", "2024-03-14T12:00:00Z")).unwrap());

    assert!(store.delete_entry("a").unwrap());
    assert!(!store.delete_entry("a").unwrap());

    let rows = store.list_entries().unwrap();
    let ids: Vec<&str> = rows.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c"]);
    assert_eq!(rows[0].name, "rewritten");
    assert_eq!(rows[0].notes.as_deref(), Some("with notes"));
    assert_eq!(rows[1].notes, None);
    assert!(rows.iter().all(|e| !e.synced));
    assert!(store.entry_ids().unwrap().contains("c"));
}

#[test]
fn settings_are_upserted_per_key() {
    let dir = tempfile::tempdir().unwrap();
    let sheets = connector(&dir);
    let cred = Credential::new("token");
    let store = sheets.open(&cred, &sheets.provision(&cred).unwrap()).unwrap();

    let mut first = SettingsMap::new();
    first.insert("daily_minutes_goal".into(), json!(300));
    first.insert("clock_format".into(), json!("24h"));
    store.upsert_settings(&first).unwrap();

    let mut second = SettingsMap::new();
    second.insert("daily_minutes_goal".into(), json!(180));
    second.insert("pomodoro_types".into(), json!(["Deep work"]));
    store.upsert_settings(&second).unwrap();

    let settings = store.get_settings().unwrap();
    assert_eq!(settings.len(), 3);
    assert_eq!(settings.get("daily_minutes_goal"), Some(&json!(180)));
    assert_eq!(settings.get("clock_format"), Some(&json!("24h")));
    assert_eq!(settings.get("pomodoro_types"), Some(&json!(["Deep work"])));
}

fn append_raw(dir: &tempfile::TempDir, handle: &RemoteHandle, lines: &[&str]) {
    let sheet = dir.path().join("sheets").join(&handle.0).join("pomodoros.csv");
    let mut file = OpenOptions::new().append(true).open(&sheet).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
}

fn sheet_text(dir: &tempfile::TempDir, handle: &RemoteHandle) -> String {
    std::fs::read_to_string(dir.path().join("sheets").join(&handle.0).join("pomodoros.csv"))
        .unwrap()
}

#[test]
fn malformed_rows_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let sheets = connector(&dir);
    let cred = Credential::new("token");
    let handle = sheets.provision(&cred).unwrap();
    let store = sheets.open(&cred, &handle).unwrap();
    store
        .append_entry(&pomodoro("good", "2024-03-14T09:00:00Z"))
        .unwrap();

    append_raw(
        &dir,
        &handle,
        &[
            "short-row,only two",
            "bad-duration,x,Product,2024-03-14T10:00:00.000Z,2024-03-14T10:25:00.000Z,soon,",
        ],
    );

    let rows = store.list_entries().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "good");
}

#[test]
fn a_bad_timestamp_hides_only_its_own_row() {
    let dir = tempfile::tempdir().unwrap();
    let sheets = connector(&dir);
    let cred = Credential::new("token");
    let handle = sheets.provision(&cred).unwrap();
    let store = sheets.open(&cred, &handle).unwrap();
    store
        .append_entry(&pomodoro("good", "2024-03-14T09:00:00Z"))
        .unwrap();

    append_raw(
        &dir,
        &handle,
        &["bad,x,Product,tomorrow,2024-03-14T10:25:00.000Z,25,"],
    );

    let rows = store.list_entries().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "good");

    // still known by id, so a push will not add it again
    let ids = store.entry_ids().unwrap();
    assert!(ids.contains("good"));
    assert!(ids.contains("bad"));
}

#[test]
fn hand_edited_rows_survive_writes() {
    let dir = tempfile::tempdir().unwrap();
    let sheets = connector(&dir);
    let cred = Credential::new("token");
    let handle = sheets.provision(&cred).unwrap();
    let store = sheets.open(&cred, &handle).unwrap();
    store
        .append_entry(&pomodoro("good", "2024-03-14T09:00:00Z"))
        .unwrap();

    let user_row = "userrow,hand edited,Product,2024-03-14T10:00:00.000Z,2024-03-14T10:25:00.000Z,25.0,";
    append_raw(&dir, &handle, &[user_row, "short-row,only two"]);

    store
        .append_entry(&pomodoro("other", "2024-03-14T11:00:00Z"))
        .unwrap();
    let mut changed = pomodoro("good", "2024-03-14T09:00:00Z");
    changed.name = "renamed".into();
    assert!(store.update_entry(&changed).unwrap());
    assert!(store.delete_entry("other").unwrap());

    let text = sheet_text(&dir, &handle);
    assert!(text.contains(user_row), "{text}");
    assert!(text.contains("short-row,only two"), "{text}");

    let rows = store.list_entries().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "renamed");
}

#[test]
fn access_needs_a_token_and_a_known_store() {
    let dir = tempfile::tempdir().unwrap();
    let sheets = connector(&dir);

    assert!(matches!(
        sheets.provision(&Credential::new("  ")),
        Err(AppError::RemoteUnavailable(_))
    ));

    let cred = Credential::new("token");
    let handle = sheets.provision(&cred).unwrap();
    assert!(matches!(
        sheets.open(&Credential::new(""), &handle),
        Err(AppError::RemoteUnavailable(_))
    ));
    assert!(matches!(
        sheets.open(&cred, &RemoteHandle("does-not-exist".into())),
        Err(AppError::RemoteUnavailable(_))
    ));
}
