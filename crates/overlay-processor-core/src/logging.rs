//! Logging configuration and initialization

use crate::error::{ProcessingError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system.
///
/// Repeated calls (tests, embedding callers) keep the first subscriber and
/// succeed without touching it.
pub fn init_logging(verbose: bool) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| ProcessingError::LoggingError {
            message: format!("Failed to initialize logging: {}", e),
        })
}
