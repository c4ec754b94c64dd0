//! Port abstraction layer for serial communication.
//!
//! Provides the adapter and provider traits plus the real and mock backends,
//! so the link and controller code never touches `serialport` directly.

pub mod error;
pub mod mock;
pub mod sync_port;
pub mod traits;

pub use error::PortError;
pub use mock::{MockPortProvider, MockSerialPort};
pub use sync_port::{SyncSerialPort, SystemPorts};
pub use traits::*;
