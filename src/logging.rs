//! Log subscriber setup.
//!
//! Progress and device output go to stdout through `tracing`. `RUST_LOG`
//! wins over the configured level when it is set.

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{LinkError, LinkResult};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` if present and valid, else `level`.
pub fn env_filter(level: &str) -> LinkResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| LinkError::Logging(format!("invalid log level '{}': {}", level, e))),
    }
}

/// Install the global subscriber. Call once, before the controller starts.
pub fn init(config: &LoggingConfig) -> LinkResult<()> {
    let filter = env_filter(&config.level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false);

    let result = match config.format {
        LogFormat::Full => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };

    result.map_err(|e| LinkError::Logging(e.to_string()))
}
