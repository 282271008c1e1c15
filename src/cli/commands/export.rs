use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::open_tracker;
use crate::utils::path::expand_tilde;

/// Handle the `export` command: CSV to a file, or to stdout without --file.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export { file, force } = cmd {
        let tracker = open_tracker(cfg)?;

        match file {
            Some(path) => {
                tracker.export_csv_file(&expand_tilde(path), *force)?;
            }
            None => {
                let stdout = std::io::stdout();
                tracker.export_csv(stdout.lock())?;
            }
        }
    }
    Ok(())
}
