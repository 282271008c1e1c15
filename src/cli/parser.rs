use crate::models::direction::Direction;
use crate::models::report::ReportPeriod;
use clap::{Parser, Subcommand};

/// Command-line interface definition for rpomolog
/// Pomodoro logger with a local SQLite cache synced to a spreadsheet store
#[derive(Parser)]
#[command(
    name = "rpomolog",
    version = env!("CARGO_PKG_VERSION"),
    about = "A pomodoro time logger: local SQLite cache, eventually-consistent sync to a spreadsheet store",
    long_about = None
)]
pub struct Cli {
    /// Override the data directory (useful for tests)
    #[arg(global = true, long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Also write log lines to stderr
    #[arg(global = true, long, short = 'v')]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the data directory and configuration
    Init,

    /// Show the configuration
    Config {
        #[arg(long = "print", help = "Print the effective configuration")]
        print_config: bool,
    },

    /// Maintain the local cache database
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Sign in and link the identity's remote store
    Login {
        #[arg(long, help = "Identity (e.g. an email address)")]
        identity: String,

        #[arg(long, help = "Access token for the remote store")]
        token: String,

        #[arg(long = "refresh-token")]
        refresh_token: Option<String>,
    },

    /// Sign out and delete this identity's local cache
    Logout,

    /// Record a pomodoro that just finished
    Add {
        #[arg(long = "type", short = 't', help = "Pomodoro type (see `settings`)")]
        category: String,

        #[arg(long, short = 'd', help = "Duration in minutes (default from config)")]
        duration: Option<i64>,

        #[arg(long, short = 'n')]
        name: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Record a pomodoro with explicit start and end
    Manual {
        #[arg(long = "type", short = 't')]
        category: String,

        #[arg(long, help = "Start (YYYY-MM-DDTHH:MM[:SS], RFC3339 accepted)")]
        start: String,

        #[arg(long, help = "End (YYYY-MM-DDTHH:MM[:SS], RFC3339 accepted)")]
        end: String,

        #[arg(long, short = 'd', help = "Duration in minutes (default: end - start)")]
        duration: Option<i64>,

        #[arg(long, short = 'n')]
        name: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Change fields of a pomodoro
    Edit {
        id: String,

        #[arg(long, short = 'n')]
        name: Option<String>,

        #[arg(long = "type", short = 't')]
        category: Option<String>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        #[arg(long, short = 'd')]
        duration: Option<i64>,

        #[arg(long, help = "New notes (empty string clears them)")]
        notes: Option<String>,
    },

    /// Delete a pomodoro by id
    Del { id: String },

    /// List pomodoros, newest first
    List {
        #[arg(long, help = "From (inclusive), date or timestamp")]
        from: Option<String>,

        #[arg(long, help = "To (exclusive), date or timestamp")]
        to: Option<String>,

        #[arg(long, help = "Oldest first")]
        asc: bool,
    },

    /// Show settings, or set values with --set key=json
    Settings {
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Totals for a day, week (Monday-based) or month
    Report {
        #[arg(value_enum)]
        period: ReportPeriod,

        #[arg(long, help = "Reference date (YYYY-MM-DD), default today")]
        date: Option<String>,
    },

    /// Export every pomodoro as CSV
    Export {
        #[arg(long, value_name = "FILE", help = "Output file (stdout when omitted)")]
        file: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Synchronization with the remote store
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },

    /// Compare local, shared-cache and remote entry counts
    Check,

    /// Align local data and the remote store, one direction per collection
    Migrate {
        #[arg(long, value_enum, default_value = "skip")]
        entries: Direction,

        #[arg(long, value_enum, default_value = "skip")]
        settings: Direction,
    },
}

#[derive(Subcommand, Clone, Copy)]
pub enum SyncAction {
    /// Pending operations, last sync, last error
    Status,
    /// Pull everything from the remote store, then push pending changes
    Now,
    /// Push pending changes and wait for the result
    Push,
}
