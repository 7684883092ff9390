//! Logging initialization

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured filter when it is set.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.verbose >= 1)
        .with_line_number(config.verbose >= 2)
        .init();

    debug!(verbose = config.verbose, "logging initialized");
}
