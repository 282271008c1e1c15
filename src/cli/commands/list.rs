use crate::cli::commands::print_entries;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::entry::{SortOrder, TimeRange};
use crate::open_tracker;
use crate::ui::messages::info;
use crate::utils::date;
use crate::utils::time::{day_start, parse_ts};
use chrono::{DateTime, Utc};

/// A bound given either as a day (midnight UTC) or as a full timestamp.
fn parse_bound(raw: &Option<String>) -> AppResult<Option<DateTime<Utc>>> {
    raw.as_deref()
        .map(|s| match date::parse_date(s) {
            Some(d) => Ok(day_start(d)),
            None => parse_ts(s),
        })
        .transpose()
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List { from, to, asc } = cmd {
        let range = TimeRange::new(parse_bound(from)?, parse_bound(to)?);
        let order = if *asc {
            SortOrder::OldestFirst
        } else {
            SortOrder::NewestFirst
        };

        let tracker = open_tracker(cfg)?;
        let entries = tracker.list_entries(&range, order)?;

        if entries.is_empty() {
            info("No pomodoros found.");
            return Ok(());
        }

        print_entries(&entries);
        println!("\n{} pomodoro(s)", entries.len());
    }
    Ok(())
}
