//! Time utilities: parsing/formatting timestamps, formatting minutes, etc.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Canonical on-disk representation: RFC3339, UTC, millisecond precision, `Z` suffix.
/// Every timestamp written to a cache goes through here so that string order
/// in SQLite is the same as chronological order.
pub fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a timestamp coming from the user, a cache row or a remote sheet.
///
/// Accepted:
/// - RFC3339 with `Z` or an explicit offset
/// - naive `YYYY-MM-DDTHH:MM[:SS[.fff]]` (interpreted as UTC)
/// - naive `YYYY-MM-DD HH:MM[:SS]` (interpreted as UTC)
pub fn parse_ts(s: &str) -> AppResult<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }

    Err(AppError::InvalidTime(s.to_string()))
}

pub fn parse_optional_ts(input: Option<&String>) -> AppResult<Option<DateTime<Utc>>> {
    input.map(|s| parse_ts(s)).transpose()
}

/// Midnight UTC of the given day.
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC)
}

pub fn format_minutes(mins: i64) -> String {
    let sign = if mins < 0 { "-" } else { "" };
    let m = mins.abs();
    format!("{}{:02}:{:02}", sign, m / 60, m % 60)
}
