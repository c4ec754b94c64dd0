//! Core traits for serial port abstraction.
//!
//! `SerialPortAdapter` lets the real `serialport` backend and the mock be used
//! interchangeably by the line reader and the controller. `PortProvider` does
//! the same for enumeration and opening.

use super::error::PortError;
use std::time::Duration;

/// Settings a connection is opened with.
///
/// Framing is fixed at 8N1 with no flow control; only the rate and the
/// per-read blocking granularity vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortConfiguration {
    /// Baud rate (bits per second).
    pub baud_rate: u32,

    /// Per-read blocking timeout. Not an overall operation deadline.
    pub timeout: Duration,
}

impl Default for PortConfiguration {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            timeout: Duration::from_secs(1),
        }
    }
}

/// A serial device as seen during enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescriptor {
    /// System path of the device (e.g. `/dev/ttyUSB0` or `COM3`).
    pub device: String,
    /// Human-readable description, `"n/a"` when the system reports none.
    pub description: String,
}

impl PortDescriptor {
    pub fn new(device: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            description: description.into(),
        }
    }
}

impl From<serialport::SerialPortInfo> for PortDescriptor {
    fn from(info: serialport::SerialPortInfo) -> Self {
        let description = match info.port_type {
            serialport::SerialPortType::UsbPort(usb) => {
                let parts: Vec<String> = [usb.manufacturer, usb.product]
                    .into_iter()
                    .flatten()
                    .filter(|s| !s.is_empty())
                    .collect();
                if parts.is_empty() {
                    format!("USB VID:PID={:04X}:{:04X}", usb.vid, usb.pid)
                } else {
                    parts.join(" ")
                }
            }
            serialport::SerialPortType::BluetoothPort => "Bluetooth serial".to_string(),
            serialport::SerialPortType::PciPort | serialport::SerialPortType::Unknown => {
                "n/a".to_string()
            }
        };

        Self {
            device: info.port_name,
            description,
        }
    }
}

/// Trait for serial port I/O operations.
///
/// This trait abstracts over synchronous serial port operations, allowing both
/// real hardware ports and mock implementations for testing.
pub trait SerialPortAdapter: Send + std::fmt::Debug {
    /// Write bytes to the serial port.
    ///
    /// Returns the number of bytes actually written.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError>;

    /// Read bytes from the serial port into the provided buffer.
    ///
    /// Returns the number of bytes actually read.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Number of bytes waiting in the receive buffer.
    ///
    /// Fails when the device has gone away, which is how a poll loop notices
    /// an unplugged board.
    fn bytes_to_read(&self) -> Result<usize, PortError>;

    /// Push any buffered output to the device.
    fn flush(&mut self) -> Result<(), PortError> {
        Ok(())
    }

    /// Get the name/path of this serial port.
    fn name(&self) -> &str;

    /// Write the whole buffer, retrying short writes.
    fn write_all_bytes(&mut self, mut data: &[u8]) -> Result<(), PortError> {
        while !data.is_empty() {
            let n = self.write_bytes(data)?;
            if n == 0 {
                return Err(PortError::disconnected(self.name().to_string()));
            }
            data = &data[n..];
        }
        self.flush()
    }
}

/// Source of serial devices: lists what is plugged in and opens a chosen one.
pub trait PortProvider: Send {
    /// Enumerate system-visible serial devices.
    fn list_ports(&self) -> Result<Vec<PortDescriptor>, PortError>;

    /// Open the device at `device` with the given settings.
    fn open(
        &self,
        device: &str,
        config: PortConfiguration,
    ) -> Result<Box<dyn SerialPortAdapter>, PortError>;
}
