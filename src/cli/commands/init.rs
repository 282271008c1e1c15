use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::log;
use crate::errors::AppResult;
use crate::open_tracker;

/// Handle the `init` command
///
/// This initializes:
///  - the data directory and the remote root (if missing)
///  - the configuration file (skipped in test mode)
///  - the cache of the signed-in identity, or the shared cache
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    //
    // 1️⃣ directories + config file
    //
    cfg.init_all(cli.test)?;

    println!("⚙️  Initializing rpomolog…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("📁 Data dir    : {}", cfg.data_path().display());

    //
    // 2️⃣ open the cache: tables and migrations are created on open
    //
    let tracker = open_tracker(cfg)?;
    let cache_path = tracker.cache().path().display().to_string();

    println!("🗄️  Cache       : {}", cache_path);

    //
    // 3️⃣ internal log (non blocking)
    //
    if let Err(e) = log::ttlog(
        tracker.cache().conn(),
        "init",
        "Cache initialized",
        &format!("Cache initialized at {}", cache_path),
    ) {
        eprintln!("⚠️ Failed to write internal log: {}", e);
    }

    println!("🎉 rpomolog initialization completed!");
    Ok(())
}
