use crate::cli::commands::finish;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::settings::{SettingsMap, parse_value};
use crate::open_tracker;
use crate::ui::messages::success;
use crate::utils::table::Table;

fn parse_assignments(raw: &[String]) -> AppResult<SettingsMap> {
    let mut out = SettingsMap::new();
    for item in raw {
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| AppError::InvalidSetting(format!("expected KEY=VALUE, got '{item}'")))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::InvalidSetting(format!("missing key in '{item}'")));
        }
        out.insert(key.to_string(), parse_value(value.trim()));
    }
    Ok(out)
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Settings { set } = cmd {
        let mut tracker = open_tracker(cfg)?;

        let settings = if set.is_empty() {
            tracker.settings()?
        } else {
            let values = parse_assignments(set)?;
            let saved = tracker.save_settings(&values)?;
            success(format!("{} setting(s) saved.", values.len()));
            saved
        };

        let mut table = Table::new(["KEY", "VALUE"]);
        for (key, value) in &settings {
            table.add_row(vec![key.clone(), value.to_string()]);
        }
        print!("{}", table.render());

        finish(tracker)?;
    }
    Ok(())
}
