//! Logging initialisation via tracing-subscriber.
//!
//! `LOG_LEVEL` is validated by the config loader, so by the time [`init`]
//! runs the configured filter is known to parse.

use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::AppError;

const RUST_LOG: &str = "RUST_LOG";

/// Install the global subscriber: fmt output on stderr, filtered by
/// `RUST_LOG` when it is set and parses, otherwise by `config.log_level`.
pub fn init(config: &Config) -> Result<(), AppError> {
    let rust_log = std::env::var(RUST_LOG).ok();
    let filter = select_filter(&config.log_level, rust_log.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}

/// Operator override first, configured level second.
fn select_filter(configured: &str, rust_log: Option<&str>) -> Result<EnvFilter, AppError> {
    if let Some(directives) = rust_log.map(str::trim).filter(|d| !d.is_empty()) {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return Ok(filter);
        }
    }
    EnvFilter::try_new(configured)
        .map_err(|e| AppError::Logger(format!("invalid LOG_LEVEL '{configured}': {e}")))
}
