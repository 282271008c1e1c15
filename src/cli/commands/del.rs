use crate::cli::commands::finish;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::open_tracker;
use crate::ui::messages::{queued, success};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Del { id } = cmd {
        let mut tracker = open_tracker(cfg)?;
        tracker.delete_entry(id)?;
        success(format!("Pomodoro {} has been deleted.", id));
        queued(tracker.link().is_some());
        finish(tracker)?;
    }
    Ok(())
}
