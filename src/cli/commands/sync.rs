use crate::cli::commands::finish;
use crate::cli::parser::{Commands, SyncAction};
use crate::config::Config;
use crate::errors::AppResult;
use crate::models::direction::MigrationRequest;
use crate::open_tracker;
use crate::ui::messages::{info, success, warning};
use crate::utils::colors::{CYAN, RESET, colorize_optional};

/// Handle `sync <action>`, `check` and `migrate`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let mut tracker = open_tracker(cfg)?;

    match cmd {
        Commands::Sync { action } => match action {
            SyncAction::Status => {
                let status = tracker.sync_status()?;
                let line = |label: &str, value: String| {
                    println!("{}• {:<20}{} {}", CYAN, label, RESET, value);
                };
                line("Remote connected:", status.remote_connected.to_string());
                line("Syncing:", status.syncing.to_string());
                line("Pending operations:", status.pending_operations.to_string());
                line("Unsynced pomodoros:", status.unsynced_pomodoros.to_string());
                line("Last sync:", colorize_optional(status.last_sync.as_deref().unwrap_or("")));
                line(
                    "Last full sync:",
                    colorize_optional(status.last_full_sync.as_deref().unwrap_or("")),
                );
                line("Last error:", colorize_optional(status.last_error.as_deref().unwrap_or("")));
            }
            SyncAction::Now => {
                let pulled = tracker.sync_now()?;
                success(format!("{pulled} pomodoro(s) pulled from the remote store."));
                finish(tracker)?;
            }
            SyncAction::Push => match tracker.push_pending()? {
                Some(report) if report.is_clean() => {
                    success(format!("{} operation(s) pushed.", report.applied));
                }
                Some(report) => {
                    warning(format!(
                        "{} pushed, {} failed, {} deferred. Last error: {}",
                        report.applied,
                        report.failed,
                        report.deferred,
                        report.last_error.unwrap_or_default()
                    ));
                }
                None => info("A sync is already running."),
            },
        },

        Commands::Check => {
            let counts = tracker.check_sources()?;
            println!("{}• Local pomodoros:{}        {}", CYAN, RESET, counts.local_count);
            println!("{}• Shared cache pomodoros:{} {}", CYAN, RESET, counts.shared_cache_count);
            println!("{}• Remote pomodoros:{}       {}", CYAN, RESET, counts.remote_count);
            println!("{}• Needs initial sync:{}     {}", CYAN, RESET, counts.needs_initial_sync);
        }

        Commands::Migrate { entries, settings } => {
            let outcome = tracker.migrate(MigrationRequest {
                entries: *entries,
                settings: *settings,
            })?;
            success(format!(
                "Pomodoros ({}): {} migrated, {} skipped. Settings ({}): {} migrated.",
                outcome.pomodoros_direction.as_str(),
                outcome.pomodoros_migrated,
                outcome.pomodoros_skipped,
                outcome.settings_direction.as_str(),
                outcome.settings_migrated
            ));
        }

        _ => {}
    }

    Ok(())
}
