use crate::errors::AppResult;
use crate::export::fs_utils::ensure_writable;
use crate::export::notify_export_success;
use crate::models::entry::Entry;
use crate::utils::time::format_ts;
use csv::{QuoteStyle, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const CSV_HEADERS: [&str; 7] = [
    "id",
    "name",
    "type",
    "start_time",
    "end_time",
    "duration_minutes",
    "notes",
];

/// Write `entries` as CSV, in the given order. Text fields are quoted,
/// the duration is not.
pub fn write_csv<W: Write>(out: W, entries: &[Entry]) -> AppResult<usize> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(out);

    wtr.write_record(CSV_HEADERS)?;

    for e in entries {
        wtr.write_record([
            e.id.as_str(),
            e.name.as_str(),
            e.category.as_str(),
            &format_ts(&e.start_time),
            &format_ts(&e.end_time),
            &e.duration_minutes.to_string(),
            e.notes.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(entries.len())
}

/// Export to a file. An existing file is only replaced with `force` or
/// after confirmation.
pub fn export_csv_file(path: &Path, entries: &[Entry], force: bool) -> AppResult<usize> {
    ensure_writable(path, force)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let n = write_csv(file, entries)?;
    notify_export_success(n, path);
    Ok(n)
}
