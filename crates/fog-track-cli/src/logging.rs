//! Logging setup for the command-line host
//!
//! Log lines go to stderr so that stdout stays clean for JSON output.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

#[cfg(debug_assertions)]
const DEFAULT_FILTER: &str = "info,fog_track_lib=debug,fog_track=debug";
#[cfg(not(debug_assertions))]
const DEFAULT_FILTER: &str = "info";

/// Initialize logging; `RUST_LOG` overrides the build's default filter
pub fn setup_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(fmt_layer).init();

    tracing::debug!("Logging initialized");
}
