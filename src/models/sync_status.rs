use serde::Serialize;

/// Answer to the sync-status query.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncStatus {
    pub syncing: bool,
    pub pending_operations: i64,
    pub unsynced_pomodoros: i64,
    pub last_sync: Option<String>,
    pub last_full_sync: Option<String>,
    pub last_error: Option<String>,
    pub remote_connected: bool,
}

/// Entry counts on each side, shown before choosing a migration direction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceCounts {
    pub local_count: i64,
    pub shared_cache_count: i64,
    pub remote_count: usize,
    pub needs_initial_sync: bool,
}
