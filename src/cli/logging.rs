//! Diagnostic logging to stderr
//!
//! `--verbose` turns on `debug` for this crate. Otherwise the filter comes
//! from `FLEET_LOG` (`EnvFilter` syntax) and defaults to `warn`.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "FLEET_LOG";

fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("warn,fleetops=debug");
    }
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Installs the global subscriber
pub fn init(verbose: bool) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(filter(verbose))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init()
}
