//! Diagnostic logging to stderr.
//!
//! The filter comes from `DOCKERIZE_LOG`, then `RUST_LOG`, then the default
//! level. Stdout stays reserved for command output.

use std::io;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the tool's own filter directive.
pub const LOG_ENV: &str = "DOCKERIZE_LOG";

/// Builds the filter; `verbose` raises the default from `warn` to `debug`.
#[must_use]
pub fn filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "warn" };
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(verbose: bool) -> Result<(), String> {
    let layer = tracing_subscriber::fmt::layer().with_writer(io::stderr).with_target(false);
    tracing_subscriber::registry()
        .with(filter(verbose))
        .with(layer)
        .try_init()
        .map_err(|e| format!("Failed to initialise logging: {e}"))
}
