//! File-backed spreadsheet stand-in.
//!
//! A remote store is a directory named after its handle, holding two sheets:
//! `pomodoros.csv` (`id,name,type,start_time,end_time,duration_minutes,notes`)
//! and `settings.csv` (`key,value`, value JSON-encoded). Like a real sheet,
//! rows are located by scanning the first column and rewritten in place.
//! Rows that do not parse are hidden from readers but written back verbatim.

use crate::errors::{AppError, AppResult};
use crate::models::entry::Entry;
use crate::models::settings::SettingsMap;
use crate::remote::{Credential, RemoteConnector, RemoteHandle, RemoteStore};
use crate::utils::time::{format_ts, parse_ts};
use csv::StringRecord;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

const ENTRIES_SHEET: &str = "pomodoros.csv";
const SETTINGS_SHEET: &str = "settings.csv";
const ENTRY_HEADERS: [&str; 7] = [
    "id",
    "name",
    "type",
    "start_time",
    "end_time",
    "duration_minutes",
    "notes",
];
const SETTINGS_HEADERS: [&str; 2] = ["key", "value"];

#[derive(Debug, Deserialize)]
struct EntryRow {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    category: String,
    start_time: String,
    end_time: String,
    duration_minutes: i64,
    #[serde(default)]
    notes: String,
}

impl TryFrom<EntryRow> for Entry {
    type Error = AppError;

    fn try_from(r: EntryRow) -> AppResult<Self> {
        Ok(Entry {
            id: r.id,
            name: r.name,
            category: r.category,
            start_time: parse_ts(&r.start_time)?,
            end_time: parse_ts(&r.end_time)?,
            duration_minutes: r.duration_minutes,
            notes: if r.notes.is_empty() { None } else { Some(r.notes) },
            synced: false,
        })
    }
}

fn entry_record(e: &Entry) -> StringRecord {
    StringRecord::from(vec![
        e.id.clone(),
        e.name.clone(),
        e.category.clone(),
        format_ts(&e.start_time),
        format_ts(&e.end_time),
        e.duration_minutes.to_string(),
        e.notes.clone().unwrap_or_default(),
    ])
}

#[derive(Debug, Deserialize)]
struct SettingRow {
    key: String,
    value: String,
}

/// Raw contents of one sheet, header row first.
struct Sheet {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl Sheet {
    fn empty(headers: &[&str]) -> Self {
        Self {
            headers: StringRecord::from(headers.to_vec()),
            rows: Vec::new(),
        }
    }

    fn read(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Err(AppError::RemoteUnavailable(format!(
                "sheet not found: {}",
                path.display()
            )));
        }

        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers = rdr.headers()?.clone();
        let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    /// Rewrite the whole sheet through a temp file so readers never see half a sheet.
    fn write(&self, path: &Path) -> AppResult<()> {
        let tmp = path.with_extension("csv.tmp");
        {
            let mut wtr = csv::WriterBuilder::new().flexible(true).from_path(&tmp)?;
            wtr.write_record(&self.headers)?;
            for row in &self.rows {
                wtr.write_record(row)?;
            }
            wtr.flush()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Index of the first row whose key column (id or setting key) matches.
    fn position(&self, key: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.get(0) == Some(key))
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().filter_map(|r| r.get(0)).filter(|k| !k.is_empty())
    }

    /// Rows that deserialize; the rest are logged and left alone.
    fn parsed<T: DeserializeOwned>(&self, path: &Path) -> Vec<T> {
        let mut out = Vec::with_capacity(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            match row.deserialize::<T>(Some(&self.headers)) {
                Ok(parsed) => out.push(parsed),
                Err(e) => warn!(sheet = %path.display(), row = i + 2, error = %e, "skipping malformed row"),
            }
        }
        out
    }
}

pub struct SheetRemote {
    dir: PathBuf,
    // serializes read-modify-write cycles from this process
    lock: Mutex<()>,
}

impl SheetRemote {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entries_path(&self) -> PathBuf {
        self.dir.join(ENTRIES_SHEET)
    }

    fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_SHEET)
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn edit_entries<R>(&self, f: impl FnOnce(&mut Sheet) -> Option<R>) -> AppResult<Option<R>> {
        let _g = self.guard();
        let path = self.entries_path();
        let mut sheet = Sheet::read(&path)?;
        let out = f(&mut sheet);
        if out.is_some() {
            sheet.write(&path)?;
        }
        Ok(out)
    }
}

impl RemoteStore for SheetRemote {
    fn list_entries(&self) -> AppResult<Vec<Entry>> {
        let _g = self.guard();
        let path = self.entries_path();
        let sheet = Sheet::read(&path)?;

        let mut out = Vec::new();
        for row in sheet.parsed::<EntryRow>(&path) {
            let id = row.id.clone();
            match Entry::try_from(row) {
                Ok(entry) => out.push(entry),
                Err(e) => warn!(sheet = %path.display(), %id, error = %e, "skipping unreadable row"),
            }
        }
        Ok(out)
    }

    fn append_entry(&self, entry: &Entry) -> AppResult<()> {
        self.append_entries(std::slice::from_ref(entry))
    }

    fn append_entries(&self, entries: &[Entry]) -> AppResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        self.edit_entries(|sheet| {
            sheet.rows.extend(entries.iter().map(entry_record));
            Some(())
        })?;
        debug!(count = entries.len(), dir = %self.dir.display(), "appended rows");
        Ok(())
    }

    fn update_entry(&self, entry: &Entry) -> AppResult<bool> {
        let updated = self.edit_entries(|sheet| {
            let index = sheet.position(&entry.id)?;
            sheet.rows[index] = entry_record(entry);
            Some(())
        })?;
        Ok(updated.is_some())
    }

    fn delete_entry(&self, id: &str) -> AppResult<bool> {
        let deleted = self.edit_entries(|sheet| {
            let index = sheet.position(id)?;
            Some(sheet.rows.remove(index))
        })?;
        Ok(deleted.is_some())
    }

    fn get_settings(&self) -> AppResult<SettingsMap> {
        let _g = self.guard();
        let path = self.settings_path();
        let mut out = SettingsMap::new();
        for row in Sheet::read(&path)?.parsed::<SettingRow>(&path) {
            let value = serde_json::from_str(&row.value)
                .unwrap_or(serde_json::Value::String(row.value));
            out.insert(row.key, value);
        }
        Ok(out)
    }

    fn upsert_settings(&self, settings: &SettingsMap) -> AppResult<()> {
        let _g = self.guard();
        let path = self.settings_path();
        let mut sheet = Sheet::read(&path)?;
        for (key, value) in settings {
            let record = StringRecord::from(vec![key.clone(), serde_json::to_string(value)?]);
            match sheet.position(key) {
                Some(index) => sheet.rows[index] = record,
                None => sheet.rows.push(record),
            }
        }
        sheet.write(&path)
    }

    /// Ids straight from the id column, so rows that fail to parse still
    /// count as present and are not appended a second time.
    fn entry_ids(&self) -> AppResult<HashSet<String>> {
        let _g = self.guard();
        let sheet = Sheet::read(&self.entries_path())?;
        Ok(sheet.keys().map(str::to_string).collect())
    }
}

/// Provisions and opens sheet directories under a root folder.
pub struct SheetConnector {
    root: PathBuf,
}

impl SheetConnector {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn dir_for(&self, handle: &RemoteHandle) -> PathBuf {
        self.root.join(&handle.0)
    }
}

fn check_credential(credential: &Credential) -> AppResult<()> {
    if credential.token.trim().is_empty() {
        return Err(AppError::RemoteUnavailable("missing access token".into()));
    }
    Ok(())
}

impl RemoteConnector for SheetConnector {
    fn open(&self, credential: &Credential, handle: &RemoteHandle) -> AppResult<Arc<dyn RemoteStore>> {
        check_credential(credential)?;
        let dir = self.dir_for(handle);
        if !dir.join(ENTRIES_SHEET).exists() || !dir.join(SETTINGS_SHEET).exists() {
            return Err(AppError::RemoteUnavailable(format!(
                "cannot access remote store {handle}"
            )));
        }
        Ok(Arc::new(SheetRemote::new(dir)))
    }

    fn provision(&self, credential: &Credential) -> AppResult<RemoteHandle> {
        check_credential(credential)?;
        let handle = RemoteHandle(Uuid::new_v4().simple().to_string());
        let dir = self.dir_for(&handle);
        fs::create_dir_all(&dir)?;

        Sheet::empty(&ENTRY_HEADERS).write(&dir.join(ENTRIES_SHEET))?;
        Sheet::empty(&SETTINGS_HEADERS).write(&dir.join(SETTINGS_SHEET))?;

        debug!(%handle, dir = %dir.display(), "provisioned remote store");
        Ok(handle)
    }
}
