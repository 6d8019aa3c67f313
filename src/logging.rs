//! Diagnostics via `tracing`, filtered by `RUST_LOG`.
//!
//! Headless runs log to stderr. The interactive screen owns the terminal, so
//! there logs go to `log_file` when one is configured and are dropped
//! otherwise.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub(crate) fn init(interactive: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match (interactive, log_file) {
        (_, Some(path)) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
                .init();
        }
        (false, None) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr).compact())
                .init();
        }
        (true, None) => {}
    }
    Ok(())
}
