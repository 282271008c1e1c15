use serde::Serialize;

/// Direction chosen by the user for one collection during a migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
pub enum Direction {
    /// remote → local
    #[value(alias = "sheets_to_local")]
    #[serde(rename = "sheets_to_local")]
    Pull,
    /// local → remote
    #[value(alias = "local_to_sheets")]
    #[serde(rename = "local_to_sheets")]
    Push,
    /// anonymous shared cache → remote, then clear the shared cache
    #[value(alias = "shared_cache_to_sheets")]
    #[serde(rename = "shared_cache_to_sheets")]
    PushShared,
    #[default]
    #[serde(rename = "skip")]
    Skip,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Pull => "sheets_to_local",
            Direction::Push => "local_to_sheets",
            Direction::PushShared => "shared_cache_to_sheets",
            Direction::Skip => "skip",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MigrationRequest {
    pub entries: Direction,
    pub settings: Direction,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationOutcome {
    pub pomodoros_migrated: usize,
    pub pomodoros_skipped: usize,
    pub pomodoros_direction: Direction,
    pub settings_migrated: usize,
    pub settings_direction: Direction,
}
