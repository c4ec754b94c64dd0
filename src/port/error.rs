//! Port-specific error types.
//!
//! Kept apart from the crate-level [`LinkError`](crate::error::LinkError) so the
//! controller can classify a failure before deciding how to recover.

use thiserror::Error;

/// Errors that can occur while enumerating, opening or talking to a serial port.
#[derive(Debug, Error)]
pub enum PortError {
    /// The device path vanished between enumeration and open.
    #[error("Serial port not found: {0}")]
    NotFound(String),

    /// An I/O error occurred on an open port.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The port rejected its settings.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The device went away while the port was open.
    #[error("Device disconnected: {0}")]
    Disconnected(String),

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    /// Create a NotFound error from a port name.
    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    /// Create a Config error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a Disconnected error for the given port.
    pub fn disconnected(port_name: impl Into<String>) -> Self {
        Self::Disconnected(port_name.into())
    }

    /// Whether this failure means the link itself is gone or unusable.
    ///
    /// Transport failures close the connection and send the controller back to
    /// searching. Anything else (bad settings, a flaky enumeration) is retried
    /// in place.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::NotFound(_) | Self::Io(_) | Self::Disconnected(_) => true,
            Self::Config(_) => false,
            Self::Serial(e) => !matches!(e.kind(), serialport::ErrorKind::InvalidInput),
        }
    }

    /// Whether an I/O error only means "nothing to read yet".
    pub(crate) fn is_idle(&self) -> bool {
        matches!(
            self,
            Self::Io(e) if matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            )
        )
    }
}
