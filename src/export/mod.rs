// src/export/mod.rs

pub mod csv;
mod fs_utils;

pub use self::csv::{CSV_HEADERS, export_csv_file, write_csv};

use crate::ui::messages::success;
use std::path::Path;

pub(crate) fn notify_export_success(count: usize, path: &Path) {
    success(format!(
        "CSV export completed: {} pomodoro(s) written to {}",
        count,
        path.display()
    ));
}
