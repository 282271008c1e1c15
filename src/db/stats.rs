use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &mut DbPool) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let db_path = pool.path().display().to_string();
    let file_size = fs::metadata(pool.path()).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) TOTAL POMODOROS
    //
    let count: i64 = pool
        .conn
        .query_row("SELECT COUNT(*) FROM pomodoros", [], |row| row.get(0))?;
    println!(
        "{}• Total pomodoros:{} {}{}{}",
        CYAN, RESET, GREEN, count, RESET
    );

    //
    // 3) DATE RANGE
    //
    let first: Option<String> = pool
        .conn
        .query_row(
            "SELECT substr(start_time, 1, 10) FROM pomodoros ORDER BY start_time ASC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let last: Option<String> = pool
        .conn
        .query_row(
            "SELECT substr(start_time, 1, 10) FROM pomodoros ORDER BY start_time DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let fmt_first = first.unwrap_or_else(|| format!("{GREY}--{RESET}"));
    let fmt_last = last.unwrap_or_else(|| format!("{GREY}--{RESET}"));

    println!("{}• Date range:{}", CYAN, RESET);
    println!("    from: {}", fmt_first);
    println!("    to:   {}", fmt_last);

    //
    // 4) SYNC QUEUE
    //
    let pending: i64 = pool
        .conn
        .query_row("SELECT COUNT(*) FROM sync_queue", [], |row| row.get(0))?;
    println!("{}• Pending sync operations:{} {}", CYAN, RESET, pending);

    println!();
    Ok(())
}
