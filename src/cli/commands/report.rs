use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::open_tracker;
use crate::utils::date;
use crate::utils::formatting::bold;
use crate::utils::mins2readable;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Report {
        period,
        date: date_str,
    } = cmd
    {
        let day = match date_str {
            Some(s) => date::parse_date(s).ok_or_else(|| AppError::InvalidDate(s.clone()))?,
            None => date::today(),
        };

        let tracker = open_tracker(cfg)?;
        let report = tracker.report(*period, day)?;

        println!(
            "{} report for {}\n",
            bold(&period.as_str().to_uppercase()),
            day
        );
        println!(
            "Total: {} in {} pomodoro(s)\n",
            mins2readable(report.total_minutes, false, false),
            report.total_pomodoros
        );

        if !report.by_type.is_empty() {
            let mut by_type = Table::new(["TYPE", "MINUTES"]);
            for (category, minutes) in &report.by_type {
                by_type.add_row(vec![category.clone(), minutes.to_string()]);
            }
            println!("{}", by_type.render());
        }

        let mut daily = Table::new(["DATE", "DAY", "MINUTES", "COUNT"]);
        for d in &report.daily_totals {
            daily.add_row(vec![
                d.date.to_string(),
                d.date.format("%a").to_string(),
                d.minutes.to_string(),
                d.count.to_string(),
            ]);
        }
        print!("{}", daily.render());
    }
    Ok(())
}
