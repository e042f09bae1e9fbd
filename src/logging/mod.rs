// Logging module for structured logging using the tracing crate

use std::error::Error;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber for structured logging
///
/// `RUST_LOG` wins over the configured level when set. With `json` enabled
/// every event is written to stdout as one JSON object per line, which is
/// what log aggregation on the hosting platform expects.
///
/// # Errors
///
/// Returns an error if the filter directive is invalid or a global
/// subscriber is already installed.
///
/// # Examples
///
/// ```
/// use memebot::config::LoggingConfig;
/// use memebot::logging::init_subscriber;
///
/// init_subscriber(&LoggingConfig::default()).expect("Failed to initialize logging");
/// tracing::info!("Application started");
/// ```
pub fn init_subscriber(config: &LoggingConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    if config.json {
        fmt()
            .with_env_filter(env_filter)
            .json()
            .with_current_span(true)
            .try_init()
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .try_init()
    }
}

/// Best-effort initialization for CLI commands; logging setup failures are
/// reported on stderr and otherwise ignored.
pub fn init_or_warn(config: &LoggingConfig) {
    if let Err(e) = init_subscriber(config) {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
