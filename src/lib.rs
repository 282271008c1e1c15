//! rpomolog library root.
//! Exposes the CLI parser, the high-level run() function, and the sync engine.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod identity;
pub mod models;
pub mod remote;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use crate::core::{Tracker, TrackerContext};
use errors::AppResult;
use identity::{FileIdentityProvider, StorageRegistry};
use remote::SheetConnector;
use std::sync::Arc;
use utils::clock::SystemClock;

/// Collaborators for the configured data directory and remote root.
pub fn tracker_context(cfg: &Config) -> TrackerContext {
    let data_dir = cfg.data_path();
    TrackerContext {
        registry: Arc::new(StorageRegistry::new(&data_dir)),
        provider: Arc::new(FileIdentityProvider::new(&data_dir)),
        connector: Arc::new(SheetConnector::new(cfg.remote_path())),
        clock: Arc::new(SystemClock),
        default_duration_minutes: cfg.default_duration_minutes,
    }
}

pub fn open_tracker(cfg: &Config) -> AppResult<Tracker> {
    Tracker::open(tracker_context(cfg))
}

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli, cfg),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => cli::commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
        Commands::Login { .. } | Commands::Logout => {
            cli::commands::session::handle(&cli.command, cfg)
        }
        Commands::Add { .. } | Commands::Manual { .. } => {
            cli::commands::add::handle(&cli.command, cfg)
        }
        Commands::Edit { .. } => cli::commands::edit::handle(&cli.command, cfg),
        Commands::Del { .. } => cli::commands::del::handle(&cli.command, cfg),
        Commands::List { .. } => cli::commands::list::handle(&cli.command, cfg),
        Commands::Settings { .. } => cli::commands::settings::handle(&cli.command, cfg),
        Commands::Report { .. } => cli::commands::report::handle(&cli.command, cfg),
        Commands::Export { .. } => cli::commands::export::handle(&cli.command, cfg),
        Commands::Sync { .. } | Commands::Check | Commands::Migrate { .. } => {
            cli::commands::sync::handle(&cli.command, cfg)
        }
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    // 1️⃣ parse CLI
    let cli = Cli::parse();

    // 2️⃣ load config once
    let mut cfg = Config::load()?;

    // 3️⃣ command-line override of the data directory
    if let Some(dir) = &cli.data_dir {
        cfg.data_dir = dir.clone();
    }

    // 4️⃣ logging; a broken log directory must not stop the command
    std::fs::create_dir_all(cfg.data_path())?;
    if let Err(e) = utils::logging::enable_logging(&cfg.data_path(), &cfg.log_level, cli.verbose) {
        ui::messages::warning(format!("Logging disabled: {e}"));
    }

    dispatch(&cli, &cfg)
}
