use crate::port::{PortConfiguration, PortError, PortProvider, SerialPortAdapter};
use std::time::Duration;
use tracing::info;

/// An open serial link to the board.
///
/// Dropping it closes the underlying port; `close` does the same but says so
/// in the log.
#[derive(Debug)]
pub struct Connection {
    port: Box<dyn SerialPortAdapter>,
    settings: PortConfiguration,
}

impl Connection {
    /// Open `device` through `provider`.
    pub fn open(
        provider: &dyn PortProvider,
        device: &str,
        settings: PortConfiguration,
    ) -> Result<Self, PortError> {
        let port = provider.open(device, settings)?;
        info!(
            device,
            baud_rate = settings.baud_rate,
            "Opened serial connection"
        );
        Ok(Self::from_port(port, settings))
    }

    /// Wrap an already open port.
    pub fn from_port(port: Box<dyn SerialPortAdapter>, settings: PortConfiguration) -> Self {
        Self { port, settings }
    }

    pub fn device(&self) -> &str {
        self.port.name()
    }

    pub fn baud_rate(&self) -> u32 {
        self.settings.baud_rate
    }

    pub fn read_timeout(&self) -> Duration {
        self.settings.timeout
    }

    /// Borrow the port for one read or exchange.
    pub fn port_mut(&mut self) -> &mut dyn SerialPortAdapter {
        self.port.as_mut()
    }

    /// Release the port.
    pub fn close(self) {
        info!(device = %self.device(), "Closed serial connection");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{MockPortProvider, PortDescriptor};

    #[test]
    fn test_open_and_close() {
        let provider = MockPortProvider::new();
        provider.set_devices(vec![PortDescriptor::new("/dev/ttyUSB0", "n/a")]);

        let connection =
            Connection::open(&provider, "/dev/ttyUSB0", PortConfiguration::default()).unwrap();
        assert_eq!(connection.device(), "/dev/ttyUSB0");
        assert_eq!(connection.baud_rate(), 9600);
        assert_eq!(connection.read_timeout(), Duration::from_secs(1));

        let handle = provider.last_opened().unwrap();
        assert!(!handle.is_closed());
        connection.close();
        assert!(handle.is_closed());
    }

    #[test]
    fn test_open_missing_device() {
        let provider = MockPortProvider::new();
        let result = Connection::open(&provider, "/dev/ttyUSB0", PortConfiguration::default());
        assert!(result.unwrap_err().is_transport());
    }
}
