//! Logging initialization for the command-line tool
//!
//! Diagnostics go to stderr so that stdout carries only the JSON response.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Default filter used when RUST_LOG is not set
const DEFAULT_FILTER: &str = "info";

/// Install a fmt layer on stderr filtered by RUST_LOG (default `info`)
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);

    if let Err(e) = tracing_subscriber::registry().with(fmt_layer).try_init() {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
