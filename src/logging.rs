//! Log to a file; the terminal belongs to the UI.

use crate::config::DEFAULT_LOG_FILTER;
use crate::error::Result;
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, prelude::*};

/// Initialize logging. `RUST_LOG` overrides the default filter.
///
/// # Errors
///
/// Will return `Err` if the log file cannot be opened or a global subscriber
/// is already installed
pub fn init_logging(log_file: &str) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_line_number(true)
        .with_writer(Arc::new(file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| crate::error::Error::Custom(format!("failed to install log subscriber: {e}")))?;

    tracing::info!("Initialized logs");
    Ok(())
}
