//! Mock serial port and device listing for testing.
//!
//! `MockSerialPort` simulates a board without hardware: queued input, a write
//! log, canned replies to commands, one-shot faults and an unplug switch.
//! `MockPortProvider` serves a fake device listing and hands out fresh mock
//! ports on open.

use super::error::PortError;
use super::traits::{PortConfiguration, PortDescriptor, PortProvider, SerialPortAdapter};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Inner state of the mock port, protected by a mutex for interior mutability.
#[derive(Debug, Default)]
struct MockPortState {
    /// Queue of bytes to be returned by read operations.
    read_queue: VecDeque<u8>,
    /// Log of all bytes written to the port.
    write_log: Vec<Vec<u8>>,
    /// Canned replies: when a write equals the key, the value is queued for reading.
    replies: Vec<(Vec<u8>, Vec<u8>)>,
    /// Once set, every operation fails as if the cable was pulled.
    disconnected: bool,
    /// Set when the owning connection dropped the port.
    closed: bool,
    /// Fails the next operation with a non-transport error, then clears.
    fault: Option<String>,
}

/// Mock serial port implementation for testing.
///
/// Clones share state, so a test can keep a handle to a port after handing
/// it to the controller. Only the original handle counts as the open port:
/// dropping it marks the port closed, dropping a clone does not.
///
/// # Example
/// ```
/// use bootlink::port::{MockSerialPort, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.reply_to(b"LED ON\n", b"LED is ON\n");
///
/// port.write_bytes(b"LED ON\n").unwrap();
/// assert_eq!(port.bytes_to_read().unwrap(), 10);
/// assert_eq!(port.get_write_log(), vec![b"LED ON\n".to_vec()]);
/// ```
pub struct MockSerialPort {
    /// The port name/identifier.
    name: String,
    /// The internal state, wrapped in Arc<Mutex<>> for interior mutability.
    state: Arc<Mutex<MockPortState>>,
    /// False for clones.
    owner: bool,
}

impl Clone for MockSerialPort {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            state: Arc::clone(&self.state),
            owner: false,
        }
    }
}

impl MockSerialPort {
    /// Create a new mock serial port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState::default())),
            owner: true,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockPortState> {
        // A panicking test thread must not hide the port from the others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Enqueue bytes to be returned by subsequent read operations.
    pub fn enqueue_read(&mut self, data: &[u8]) {
        self.lock().read_queue.extend(data);
    }

    /// Enqueue each line followed by `\n`.
    pub fn enqueue_lines<S: AsRef<str>>(&mut self, lines: &[S]) {
        let mut state = self.lock();
        for line in lines {
            state.read_queue.extend(line.as_ref().as_bytes());
            state.read_queue.push_back(b'\n');
        }
    }

    /// Queue `reply` for reading whenever exactly `command` is written.
    pub fn reply_to(&mut self, command: &[u8], reply: &[u8]) {
        self.lock().replies.push((command.to_vec(), reply.to_vec()));
    }

    /// Get a copy of all data written to the port.
    pub fn get_write_log(&self) -> Vec<Vec<u8>> {
        self.lock().write_log.clone()
    }

    /// Written data decoded as text, one entry per write.
    pub fn written_text(&self) -> Vec<String> {
        self.lock()
            .write_log
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    /// Clear the write log.
    pub fn clear_write_log(&mut self) {
        self.lock().write_log.clear();
    }

    /// Simulate the device being unplugged (or plugged back with `false`).
    pub fn set_disconnected(&mut self, disconnected: bool) {
        self.lock().disconnected = disconnected;
    }

    /// Make the next read, write or poll fail once with a configuration
    /// error, which the controller treats as unclassified.
    pub fn fail_next(&mut self, message: impl Into<String>) {
        self.lock().fault = Some(message.into());
    }

    /// Whether the connection owning this port has released it.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Get the number of bytes available to read.
    pub fn available_bytes(&self) -> usize {
        self.lock().read_queue.len()
    }

    fn check_connected(&self, state: &mut MockPortState) -> Result<(), PortError> {
        if state.disconnected {
            return Err(PortError::disconnected(self.name.clone()));
        }
        match state.fault.take() {
            Some(message) => Err(PortError::config(message)),
            None => Ok(()),
        }
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.lock();
        self.check_connected(&mut state)?;

        state.write_log.push(data.to_vec());

        let reply = state
            .replies
            .iter()
            .find(|(command, _)| command.as_slice() == data)
            .map(|(_, reply)| reply.clone());
        if let Some(reply) = reply {
            state.read_queue.extend(reply);
        }

        Ok(data.len())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.lock();
        self.check_connected(&mut state)?;

        let mut bytes_read = 0;
        for byte in buffer.iter_mut() {
            match state.read_queue.pop_front() {
                Some(queued) => {
                    *byte = queued;
                    bytes_read += 1;
                }
                None => break,
            }
        }

        if bytes_read == 0 {
            // Same shape as a real port whose read timed out with nothing pending.
            Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "No data available",
            )))
        } else {
            Ok(bytes_read)
        }
    }

    fn bytes_to_read(&self) -> Result<usize, PortError> {
        let mut state = self.lock();
        self.check_connected(&mut state)?;
        Ok(state.read_queue.len())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for MockSerialPort {
    fn drop(&mut self) {
        if self.owner {
            self.lock().closed = true;
        }
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}

#[derive(Debug, Default)]
struct MockProviderState {
    devices: Vec<PortDescriptor>,
    /// Lines every newly opened port starts with, e.g. a boot banner.
    boot_lines: Vec<String>,
    replies: Vec<(Vec<u8>, Vec<u8>)>,
    /// Every port handed out, oldest first.
    opened: Vec<MockSerialPort>,
    list_failure: Option<String>,
    open_failure: bool,
}

/// Fake device listing that opens `MockSerialPort`s.
///
/// Clones share state, like `MockSerialPort`.
#[derive(Debug, Clone, Default)]
pub struct MockPortProvider {
    state: Arc<Mutex<MockProviderState>>,
}

impl MockPortProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockProviderState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the device listing.
    pub fn set_devices(&self, devices: Vec<PortDescriptor>) {
        self.lock().devices = devices;
    }

    /// Lines queued on every port opened from now on.
    pub fn set_boot_lines<S: Into<String>>(&self, lines: impl IntoIterator<Item = S>) {
        self.lock().boot_lines = lines.into_iter().map(Into::into).collect();
    }

    /// Canned reply installed on every port opened from now on.
    pub fn reply_to(&self, command: &[u8], reply: &[u8]) {
        self.lock().replies.push((command.to_vec(), reply.to_vec()));
    }

    /// Make enumeration fail with the given message until cleared with `None`.
    pub fn set_list_failure(&self, message: Option<&str>) {
        self.lock().list_failure = message.map(str::to_string);
    }

    /// Make `open` fail as if the device vanished.
    pub fn set_open_failure(&self, fail: bool) {
        self.lock().open_failure = fail;
    }

    /// Handles to every port opened so far.
    pub fn opened(&self) -> Vec<MockSerialPort> {
        self.lock().opened.clone()
    }

    /// Number of successful opens.
    pub fn open_count(&self) -> usize {
        self.lock().opened.len()
    }

    /// The most recently opened port.
    pub fn last_opened(&self) -> Option<MockSerialPort> {
        self.lock().opened.last().cloned()
    }
}

impl PortProvider for MockPortProvider {
    fn list_ports(&self) -> Result<Vec<PortDescriptor>, PortError> {
        let state = self.lock();
        match &state.list_failure {
            Some(message) => Err(PortError::Serial(serialport::Error::new(
                serialport::ErrorKind::Unknown,
                message.clone(),
            ))),
            None => Ok(state.devices.clone()),
        }
    }

    fn open(
        &self,
        device: &str,
        _config: PortConfiguration,
    ) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        let mut state = self.lock();
        if state.open_failure || !state.devices.iter().any(|d| d.device == device) {
            return Err(PortError::not_found(device));
        }

        let mut port = MockSerialPort::new(device);
        port.enqueue_lines(&state.boot_lines);
        for (command, reply) in &state.replies {
            port.reply_to(command, reply);
        }
        state.opened.push(port.clone());

        Ok(Box::new(port))
    }
}
