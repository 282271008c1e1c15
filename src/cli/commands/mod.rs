pub mod add;
pub mod config;
pub mod db;
pub mod del;
pub mod edit;
pub mod export;
pub mod init;
pub mod list;
pub mod log;
pub mod report;
pub mod session;
pub mod settings;
pub mod sync;

use crate::core::Tracker;
use crate::errors::AppResult;
use crate::models::entry::Entry;
use crate::ui::messages::warning;
use crate::utils::colors::{RESET, color_for_sync, colorize_optional};
use crate::utils::formatting::ellipsize;
use crate::utils::mins2readable;
use crate::utils::table::Table;

/// Wait for the drains this command started, so the process does not exit
/// mid-drain. Failures are reported, never turned into a command error:
/// the local write already happened.
pub(crate) fn finish(mut tracker: Tracker) -> AppResult<()> {
    for report in tracker.wait_for_sync()? {
        if let Some(err) = report.last_error {
            warning(format!(
                "{} operation(s) not synced yet, will retry on next sync: {}",
                report.failed + report.deferred,
                err
            ));
        }
    }
    Ok(())
}

pub(crate) fn print_entries(entries: &[Entry]) {
    let mut table = Table::new([
        "ID", "TYPE", "NAME", "START", "END", "DURATION", "SYNC", "NOTES",
    ]);

    for e in entries {
        let sync = if e.synced { "yes" } else { "pending" };
        table.add_row(vec![
            e.id.clone(),
            e.category.clone(),
            colorize_optional(&ellipsize(&e.name, 24)),
            e.start_time.format("%Y-%m-%d %H:%M").to_string(),
            e.end_time.format("%Y-%m-%d %H:%M").to_string(),
            mins2readable(e.duration_minutes, false, false),
            format!("{}{}{}", color_for_sync(e.synced), sync, RESET),
            colorize_optional(&ellipsize(e.notes.as_deref().unwrap_or(""), 30)),
        ]);
    }

    print!("{}", table.render());
}
