//! Log output for the suite runner.
//!
//! The engine and the sample hooks log through the `log` facade. Records are
//! bridged into a `tracing` subscriber that writes to stderr, leaving stdout
//! to the report.

use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "SCENARIO_DEPS_LOG";

const DEFAULT_FILTER: &str = "info";

fn filter(directives: Option<&str>) -> EnvFilter {
    match directives {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// Install the stderr subscriber.
///
/// Filter precedence, highest first:
///
/// 1. `--log-level`
/// 2. `SCENARIO_DEPS_LOG`
/// 3. `info`
///
/// A subscriber installed earlier is kept.
pub fn init_logging(directives: Option<&str>) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter(directives))
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(true)
        .try_init();
    if let Err(error) = result {
        log::debug!("logging already initialised: {error}");
    }
}
