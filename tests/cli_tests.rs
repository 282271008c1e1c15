use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::{rpo, rpo_in};

#[test]
fn init_creates_the_shared_cache() {
    let dir = tempfile::tempdir().unwrap();

    rpo_in(dir.path(), &["init"])
        .assert()
        .success()
        .stdout(contains("initialization completed"))
        .stdout(contains("pomodoros.db"));

    assert!(dir.path().join("pomodoros.db").exists());
    assert!(dir.path().join("sheets").is_dir());
}

#[test]
fn add_then_list() {
    let dir = tempfile::tempdir().unwrap();

    rpo_in(dir.path(), &["add", "--type", "Product", "--name", "Write docs"])
        .assert()
        .success()
        .stdout(contains("recorded: Product"));

    rpo_in(
        dir.path(),
        &[
            "manual",
            "--type",
            "Team",
            "--start",
            "2024-03-12T14:00",
            "--end",
            "2024-03-12T14:30",
        ],
    )
    .assert()
    .success();

    rpo_in(dir.path(), &["list"])
        .assert()
        .success()
        .stdout(contains("Write docs"))
        .stdout(contains("2024-03-12 14:00"))
        .stdout(contains("2 pomodoro(s)"));

    rpo_in(dir.path(), &["list", "--from", "2024-03-12", "--to", "2024-03-13"])
        .assert()
        .success()
        .stdout(contains("1 pomodoro(s)"))
        .stdout(contains("Write docs").not());

    rpo_in(dir.path(), &["list", "--to", "2000-01-01"])
        .assert()
        .success()
        .stdout(contains("No pomodoros found."));
}

#[test]
fn unknown_type_fails() {
    let dir = tempfile::tempdir().unwrap();

    rpo_in(dir.path(), &["add", "--type", "Gardening"])
        .assert()
        .failure()
        .stderr(contains("Unknown pomodoro type"));
}

#[test]
fn huge_duration_is_an_error() {
    let dir = tempfile::tempdir().unwrap();

    rpo_in(
        dir.path(),
        &["add", "--type", "Product", "--duration", "1000000000000"],
    )
    .assert()
    .failure()
    .stderr(contains("duration out of range"));
}

#[test]
fn deleting_an_unknown_id_fails() {
    let dir = tempfile::tempdir().unwrap();

    rpo_in(dir.path(), &["del", "no-such-id"])
        .assert()
        .failure()
        .stderr(contains("Pomodoro not found: no-such-id"));
}

#[test]
fn settings_can_be_set_and_listed() {
    let dir = tempfile::tempdir().unwrap();

    rpo_in(dir.path(), &["settings", "--set", "daily_minutes_goal=120"])
        .assert()
        .success()
        .stdout(contains("1 setting(s) saved."))
        .stdout(contains("120"));

    rpo_in(dir.path(), &["settings"])
        .assert()
        .success()
        .stdout(contains("daily_minutes_goal"))
        .stdout(contains("long_break_minutes"));

    rpo_in(dir.path(), &["settings", "--set", "daily_minutes_goal=plenty"])
        .assert()
        .failure()
        .stderr(contains("Invalid setting"));
}

#[test]
fn week_report() {
    let dir = tempfile::tempdir().unwrap();

    rpo_in(
        dir.path(),
        &[
            "manual",
            "--type",
            "Product",
            "--start",
            "2024-03-12T09:00",
            "--end",
            "2024-03-12T09:25",
        ],
    )
    .assert()
    .success();

    rpo_in(dir.path(), &["report", "week", "--date", "2024-03-14"])
        .assert()
        .success()
        .stdout(contains("in 1 pomodoro(s)"))
        .stdout(contains("2024-03-11"))
        .stdout(contains("2024-03-17"))
        .stdout(contains("Product"));

    rpo_in(dir.path(), &["report", "week", "--date", "14/03/2024"])
        .assert()
        .failure()
        .stderr(contains("Invalid date format"));
}

#[test]
fn sync_status_when_not_logged_in() {
    let dir = tempfile::tempdir().unwrap();

    rpo_in(dir.path(), &["sync", "status"])
        .assert()
        .success()
        .stdout(contains("Remote connected:"))
        .stdout(contains("Pending operations:"));

    rpo_in(dir.path(), &["sync", "now"])
        .assert()
        .failure()
        .stderr(contains("Not logged in"));
}

#[test]
fn login_sync_and_logout() {
    let dir = tempfile::tempdir().unwrap();

    // work done before signing in stays in the shared cache
    rpo_in(dir.path(), &["add", "--type", "Product"])
        .assert()
        .success();

    rpo_in(
        dir.path(),
        &["login", "--identity", "alice@example.com", "--token", "t0k"],
    )
    .assert()
    .success()
    .stdout(contains("Logged in as alice@example.com"))
    .stdout(contains("new remote store"));

    rpo_in(dir.path(), &["add", "--type", "Team", "--name", "review"])
        .assert()
        .success()
        .stdout(contains("Queued for sync"));

    rpo_in(dir.path(), &["sync", "push"])
        .assert()
        .success()
        .stdout(contains("operation(s) pushed."));

    rpo_in(dir.path(), &["sync", "status"])
        .assert()
        .success()
        .stdout(contains("Pending operations:"));

    rpo_in(dir.path(), &["check"])
        .assert()
        .success()
        .stdout(contains("Shared cache pomodoros:"))
        .stdout(contains("Needs initial sync:"));

    rpo_in(dir.path(), &["migrate", "--entries", "push-shared"])
        .assert()
        .success()
        .stdout(contains("Pomodoros (shared_cache_to_sheets): 1 migrated, 0 skipped."));

    rpo_in(dir.path(), &["sync", "now"])
        .assert()
        .success()
        .stdout(contains("2 pomodoro(s) pulled"));

    rpo_in(dir.path(), &["list"])
        .assert()
        .success()
        .stdout(contains("2 pomodoro(s)"));

    rpo_in(dir.path(), &["logout"])
        .assert()
        .success()
        .stdout(contains("Logged out alice@example.com"));

    // the shared cache was emptied by the migration
    rpo_in(dir.path(), &["list"])
        .assert()
        .success()
        .stdout(contains("No pomodoros found."));

    rpo_in(dir.path(), &["logout"])
        .assert()
        .success()
        .stdout(contains("Nobody is logged in."));
}

#[test]
fn settings_cannot_be_migrated_from_the_shared_cache() {
    let dir = tempfile::tempdir().unwrap();

    rpo_in(
        dir.path(),
        &["login", "--identity", "alice@example.com", "--token", "t0k"],
    )
    .assert()
    .success();

    rpo_in(dir.path(), &["migrate", "--settings", "push-shared"])
        .assert()
        .failure()
        .stderr(contains("Invalid migration direction"));
}

#[test]
fn log_records_commands() {
    let dir = tempfile::tempdir().unwrap();

    rpo_in(dir.path(), &["init"]).assert().success();
    rpo_in(dir.path(), &["log", "--print"])
        .assert()
        .success()
        .stdout(contains("init"));
}

#[test]
fn version_flag() {
    rpo()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("rpomolog"));
}
