use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::load_log;
use crate::errors::AppResult;
use crate::open_tracker;
use crate::ui::messages::info;
use crate::utils::colors::{CYAN, GREEN, RESET, YELLOW};
use crate::utils::formatting::ellipsize;

fn color_for_operation(op: &str) -> &'static str {
    match op {
        "init" | "login" => GREEN,
        "migrate" | "migration_applied" => CYAN,
        _ => YELLOW,
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if !matches!(cmd, Commands::Log { print: true }) {
        info("Use --print to show the internal log.");
        return Ok(());
    }

    let tracker = open_tracker(cfg)?;
    let rows = load_log(tracker.cache().conn())?;

    if rows.is_empty() {
        info("The internal log is empty.");
        return Ok(());
    }

    println!("📜 Internal log:\n");

    let date_w = rows.iter().map(|r| r.date.len()).max().unwrap_or(10);
    for row in rows {
        let op_target = if row.target.is_empty() {
            row.operation.clone()
        } else {
            format!("{} ({})", row.operation, row.target)
        };
        println!(
            "{:<date_w$} | {}{}{} => {}",
            row.date,
            color_for_operation(&row.operation),
            ellipsize(&op_target, 60),
            RESET,
            row.message,
            date_w = date_w
        );
    }

    Ok(())
}
