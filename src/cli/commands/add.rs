use crate::cli::commands::finish;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::entry::{Entry, ManualEntry, NewEntry};
use crate::open_tracker;
use crate::ui::messages::{queued, success};
use crate::utils::mins2readable;
use crate::utils::time::parse_ts;

fn announce(entry: &Entry, linked: bool) {
    success(format!(
        "Pomodoro {} recorded: {} {} → {} ({})",
        entry.id,
        entry.category,
        entry.start_time.format("%Y-%m-%d %H:%M"),
        entry.end_time.format("%H:%M"),
        mins2readable(entry.duration_minutes, false, false)
    ));
    queued(linked);
}

/// Handle `add` (timer completion) and `manual` (explicit times).
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let mut tracker = open_tracker(cfg)?;
    let linked = tracker.link().is_some();

    match cmd {
        Commands::Add {
            category,
            duration,
            name,
            notes,
        } => {
            let entry = tracker.create_entry(NewEntry {
                name: name.clone(),
                category: category.clone(),
                duration_minutes: *duration,
                notes: notes.clone(),
            })?;
            announce(&entry, linked);
        }
        Commands::Manual {
            category,
            start,
            end,
            duration,
            name,
            notes,
        } => {
            let entry = tracker.create_manual_entry(ManualEntry {
                name: name.clone(),
                category: category.clone(),
                start_time: parse_ts(start)?,
                end_time: parse_ts(end)?,
                duration_minutes: *duration,
                notes: notes.clone(),
            })?;
            announce(&entry, linked);
        }
        _ => return Ok(()),
    }

    finish(tracker)
}
