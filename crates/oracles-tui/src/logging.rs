use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Route tracing output to a file; the terminal belongs to the UI.
/// `RUST_LOG` overrides the default filter.
pub fn init(verbose: bool) -> Result<PathBuf> {
    let log_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("oracles");
    fs::create_dir_all(&log_dir)?;

    let log_path = log_dir.join("oracles.log");
    let file = OpenOptions::new().create(true).append(true).open(&log_path)?;

    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("oracles={},oracles_core={}", level, level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("Could not install log subscriber: {}", e))?;

    Ok(log_path)
}
