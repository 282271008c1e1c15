use crate::cli::commands::{finish, print_entries};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::entry::EntryUpdate;
use crate::open_tracker;
use crate::ui::messages::{info, queued, success};
use crate::utils::time::parse_optional_ts;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Edit {
        id,
        name,
        category,
        start,
        end,
        duration,
        notes,
    } = cmd
    {
        let update = EntryUpdate {
            name: name.clone(),
            category: category.clone(),
            start_time: parse_optional_ts(start.as_ref())?,
            end_time: parse_optional_ts(end.as_ref())?,
            duration_minutes: *duration,
            // `--notes ""` clears them
            notes: notes.clone().map(|n| Some(n).filter(|s| !s.is_empty())),
        };

        let mut tracker = open_tracker(cfg)?;
        let updated = tracker.update_entry(id, &update)?;

        success(format!("Pomodoro {} updated.", updated.id));
        queued(tracker.link().is_some());
        print_entries(std::slice::from_ref(&updated));
        if duration.is_none() && (start.is_some() || end.is_some()) {
            info("Duration left unchanged; pass --duration to change it.");
        }

        finish(tracker)?;
    }
    Ok(())
}
