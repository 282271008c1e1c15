//! User settings: a key → JSON value map, overlaid on a fixed default map.

use serde_json::{Value, json};
use std::collections::BTreeMap;

pub type SettingsMap = BTreeMap<String, Value>;

/// Key holding the ordered list of pomodoro types (entry categories).
pub const POMODORO_TYPES_KEY: &str = "pomodoro_types";

/// Synthetic record id used when the whole settings map is queued for sync.
pub const ALL_SETTINGS_ID: &str = "all";

pub const DEFAULT_POMODORO_TYPES: [&str; 10] = [
    "Content",
    "Customer/Partner/Community",
    "Learn/Train",
    "Product",
    "PTO",
    "Queued",
    "Social Media",
    "Team",
    "Travel",
    "Unqueued",
];

/// Values used for every key the user never set explicitly.
pub fn default_settings() -> SettingsMap {
    let mut m = SettingsMap::new();
    m.insert("timer_preset_1".into(), json!(5));
    m.insert("timer_preset_2".into(), json!(10));
    m.insert("timer_preset_3".into(), json!(15));
    m.insert("timer_preset_4".into(), json!(25));
    m.insert("short_break_minutes".into(), json!(5));
    m.insert("long_break_minutes".into(), json!(15));
    m.insert("pomodoros_until_long_break".into(), json!(4));
    m.insert("always_use_short_break".into(), json!(false));
    m.insert("sound_enabled".into(), json!(true));
    m.insert("notifications_enabled".into(), json!(true));
    m.insert(POMODORO_TYPES_KEY.into(), json!(DEFAULT_POMODORO_TYPES));
    m.insert("auto_start_after_break".into(), json!(false));
    m.insert("tick_sound_during_breaks".into(), json!(false));
    m.insert("bell_at_pomodoro_end".into(), json!(true));
    m.insert("bell_at_break_end".into(), json!(true));
    m.insert("show_notes_field".into(), json!(false));
    m.insert("working_hours_start".into(), json!("08:00"));
    m.insert("working_hours_end".into(), json!("17:00"));
    m.insert("clock_format".into(), json!("auto"));
    m.insert("period_labels".into(), json!("auto"));
    m.insert("daily_minutes_goal".into(), json!(300));
    m
}

/// Defaults overlaid with the explicitly stored values.
pub fn with_defaults(stored: SettingsMap) -> SettingsMap {
    let mut merged = default_settings();
    merged.extend(stored);
    merged
}

/// Configured pomodoro types, in display order.
/// Falls back to the defaults when the stored value is not a list of strings.
pub fn pomodoro_types(settings: &SettingsMap) -> Vec<String> {
    settings
        .get(POMODORO_TYPES_KEY)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|types| !types.is_empty())
        .unwrap_or_else(|| DEFAULT_POMODORO_TYPES.iter().map(|s| s.to_string()).collect())
}

/// Parse a value given on the command line: valid JSON is kept as-is,
/// anything else is stored as a plain string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
