//! Logging init: file under XDG state dir, or stderr when that is unavailable.
//!
//! Stdout carries results only, so nothing here ever writes to it.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,urlsum=debug,urlsum_core=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize structured logging to `~/.local/state/urlsum/urlsum.log`.
/// Returns the log path, or Err so the caller can fall back to stderr.
pub fn init_logging() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("urlsum")?;
    let log_dir = xdg_dirs.get_state_home().join("urlsum");
    fs::create_dir_all(&log_dir).with_context(|| format!("create {}", log_dir.display()))?;

    let log_file_path = log_dir.join("urlsum.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .with_context(|| format!("open {}", log_file_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;

    tracing::info!("urlsum logging initialized at {}", log_file_path.display());
    Ok(log_file_path)
}

/// Stderr-only logging. Fallback for when `init_logging()` fails.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
