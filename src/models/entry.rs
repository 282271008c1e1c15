use crate::errors::{AppError, AppResult};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A finished pomodoro (work or break interval).
///
/// `duration_minutes` is stored independently of `start_time`/`end_time`:
/// after a manual edit the two may disagree, and the stored duration is the
/// one used by reports and exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub category: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub synced: bool,
}

/// Input for a pomodoro recorded at timer completion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub category: String,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Input for a pomodoro entered by hand with explicit times.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub category: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update. `None` keeps the stored value.
/// `notes: Some(None)` clears the notes.
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub notes: Option<Option<String>>,
}

impl Entry {
    /// Timer-completion constructor: the pomodoro ends now and started
    /// `duration_minutes` earlier.
    pub fn completed_at(
        end_time: DateTime<Utc>,
        category: &str,
        duration_minutes: i64,
        name: Option<String>,
        notes: Option<String>,
    ) -> AppResult<Self> {
        validate_duration(duration_minutes)?;
        let start_time = TimeDelta::try_minutes(duration_minutes)
            .and_then(|d| end_time.checked_sub_signed(d))
            .ok_or_else(|| {
                AppError::InvalidTime(format!("duration out of range ({duration_minutes} minutes)"))
            })?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: name.unwrap_or_default(),
            category: category.to_string(),
            start_time,
            end_time,
            duration_minutes,
            notes: normalize_notes(notes),
            synced: false,
        })
    }

    /// Manual constructor. When no duration is given it is derived from the
    /// interval, rounded down to whole minutes.
    pub fn manual(input: ManualEntry) -> AppResult<Self> {
        validate_interval(&input.start_time, &input.end_time)?;

        let duration = input
            .duration_minutes
            .unwrap_or_else(|| (input.end_time - input.start_time).num_minutes());
        validate_duration(duration)?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: input.name.unwrap_or_default(),
            category: input.category,
            start_time: input.start_time,
            end_time: input.end_time,
            duration_minutes: duration,
            notes: normalize_notes(input.notes),
            synced: false,
        })
    }

    /// Apply a partial update in place; the id never changes.
    pub fn apply(&mut self, update: &EntryUpdate) -> AppResult<()> {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(category) = &update.category {
            self.category = category.clone();
        }
        if let Some(start) = update.start_time {
            self.start_time = start;
        }
        if let Some(end) = update.end_time {
            self.end_time = end;
        }
        if let Some(duration) = update.duration_minutes {
            validate_duration(duration)?;
            self.duration_minutes = duration;
        }
        if let Some(notes) = &update.notes {
            self.notes = normalize_notes(notes.clone());
        }

        validate_interval(&self.start_time, &self.end_time)
    }
}

fn validate_interval(start: &DateTime<Utc>, end: &DateTime<Utc>) -> AppResult<()> {
    if end < start {
        return Err(AppError::InvalidTime(format!(
            "end time {} is before start time {}",
            end, start
        )));
    }
    Ok(())
}

fn validate_duration(minutes: i64) -> AppResult<()> {
    if minutes < 0 {
        return Err(AppError::InvalidTime(format!(
            "duration must not be negative (got {minutes})"
        )));
    }
    Ok(())
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes.filter(|n| !n.trim().is_empty())
}

/// Half-open filter on `start_time`: `from <= start_time < to`.
/// Either bound may be left open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    pub fn all() -> Self {
        Self::default()
    }
}

/// Listing order on `start_time`: newest first for display, oldest first for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "DESC",
            SortOrder::OldestFirst => "ASC",
        }
    }
}
