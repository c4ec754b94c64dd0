//! Serial boot watchdog library.
//!
//! Finds a microcontroller on a serial port, checks its boot banner, then
//! drives an on/off command cadence, reconnecting whenever the link drops.
//!
//! # Modules
//!
//! - `config`: TOML configuration with built-in defaults
//! - `controller`: the connection lifecycle state machine
//! - `discovery`: port enumeration and device matching
//! - `error`: crate-level error type
//! - `link`: line reading, boot validation and command exchange
//! - `logging`: tracing subscriber setup
//! - `port`: serial port abstraction with real and mock backends

pub mod config;
pub mod controller;
pub mod discovery;
pub mod error;
pub mod link;
pub mod logging;
pub mod port;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
pub use controller::{ConnectionState, Controller, ControllerStats, Event, Phase, Resume};
pub use discovery::{DevicePatterns, PortLocator};
pub use error::{LinkError, LinkResult};
pub use link::{
    BootExpectation, BootOutcome, BootValidator, CommandExchanger, Connection, LineReader,
};
pub use port::{
    MockPortProvider, MockSerialPort, PortConfiguration, PortDescriptor, PortError, PortProvider,
    SerialPortAdapter, SyncSerialPort, SystemPorts,
};
