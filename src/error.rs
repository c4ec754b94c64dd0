//! Crate-level error type.
//!
//! The controller never surfaces errors: it turns them into state-machine
//! events. `LinkError` covers what can still go wrong around it, at startup.

use crate::config::ConfigError;
use crate::port::PortError;
use thiserror::Error;

/// Unified application error type.
#[derive(Debug, Error)]
pub enum LinkError {
    /// A serial port operation failed.
    #[error("Serial link error: {0}")]
    Port(#[from] PortError),

    /// The configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The log subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// A specialized `Result` type for the binary and its setup code.
pub type LinkResult<T> = Result<T, LinkError>;
