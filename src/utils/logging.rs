use crate::errors::{AppError, AppResult};
use std::path::Path;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Install the global subscriber: daily-rotated files under `<data_dir>/logs`,
/// plus stderr when `verbose` is set. `RUST_LOG` wins over `level`.
pub fn enable_logging(data_dir: &Path, level: &str, verbose: bool) -> AppResult<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(5)
        .filename_prefix(env!("CARGO_PKG_NAME"))
        .build(data_dir.join("logs"))
        .map_err(|e| AppError::Config(format!("cannot open log directory: {e}")))?;

    let stderr = std::io::stderr.with_filter(move |_| verbose);

    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::new(directives),
        Err(_) => EnvFilter::new(format!(
            "{}={level}",
            env!("CARGO_PKG_NAME").replace('-', "_"),
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(stderr.and(appender))
        .try_init()
        .map_err(|e| AppError::Other(format!("logging already initialized: {e}")))?;

    Ok(())
}
