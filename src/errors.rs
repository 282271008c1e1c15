//! Unified application error type.
//! All modules (db, core, remote, cli, utils) return AppError to keep the
//! error handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO / serialization
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Parsing / validation errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Unknown pomodoro type: {0}")]
    InvalidCategory(String),

    #[error("Invalid report period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid migration direction: {0}")]
    InvalidDirection(String),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    // ---------------------------
    // Logic errors
    // ---------------------------
    #[error("Pomodoro not found: {0}")]
    EntryNotFound(String),

    #[error("Not logged in: link an identity first")]
    NotLoggedIn,

    // ---------------------------
    // Remote store errors
    // ---------------------------
    #[error("Remote store error: {0}")]
    Remote(String),

    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Reconciliation failed: {0}")]
    Reconcile(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
