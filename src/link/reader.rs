//! Time-bounded line reading.
//!
//! The board talks in newline-terminated text. `LineReader` polls the port
//! for a fixed window and hands back whatever complete lines arrived; the
//! window, not the line count, decides when it stops.

use crate::port::{PortError, SerialPortAdapter};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

/// Default sleep between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

const READ_CHUNK: usize = 256;

/// Incremental splitter from raw bytes to trimmed text lines.
///
/// Invalid UTF-8 is dropped rather than reported, so decoding cannot fail.
/// Blank lines (after trimming) are skipped.
#[derive(Debug, Default)]
pub struct LineDecoder {
    pending: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes; complete lines are appended to `out`.
    pub fn push(&mut self, mut bytes: &[u8], out: &mut Vec<String>) {
        while let Some(pos) = memchr::memchr(b'\n', bytes) {
            if self.pending.is_empty() {
                out.extend(decode_line(&bytes[..pos]));
            } else {
                self.pending.extend_from_slice(&bytes[..pos]);
                out.extend(decode_line(&self.pending));
                self.pending.clear();
            }
            bytes = &bytes[pos + 1..];
        }
        self.pending.extend_from_slice(bytes);
    }

    /// Flush an unterminated trailing line, if any.
    pub fn finish(&mut self, out: &mut Vec<String>) {
        if !self.pending.is_empty() {
            out.extend(decode_line(&self.pending));
            self.pending.clear();
        }
    }

    /// Bytes held back waiting for a newline.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Decode one raw line, dropping invalid sequences and surrounding whitespace.
///
/// U+FFFD is also what invalid input decodes to, so a literal replacement
/// character sent by the device is dropped as well.
pub fn decode_line(raw: &[u8]) -> Option<String> {
    let text: String = String::from_utf8_lossy(raw)
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .collect();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Polls a port for lines over a bounded window.
#[derive(Debug, Clone, Copy)]
pub struct LineReader {
    poll_interval: Duration,
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl LineReader {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Collect lines until `max_duration` has elapsed.
    ///
    /// Returns after at most `max_duration` plus one poll interval. `max_lines`
    /// is advisory: every line received inside the window is returned even
    /// when there are more. A line still missing its newline when the window
    /// closes is returned as it stands.
    pub async fn read_lines(
        &self,
        port: &mut dyn SerialPortAdapter,
        max_duration: Duration,
        max_lines: usize,
    ) -> Result<Vec<String>, PortError> {
        let start = Instant::now();
        let mut decoder = LineDecoder::new();
        let mut lines = Vec::new();
        let mut buffer = [0u8; READ_CHUNK];

        while start.elapsed() < max_duration {
            while start.elapsed() < max_duration && port.bytes_to_read()? > 0 {
                match port.read_bytes(&mut buffer) {
                    Ok(0) => break,
                    Ok(n) => {
                        trace!(bytes = n, "Read from {}", port.name());
                        decoder.push(&buffer[..n], &mut lines);
                    }
                    Err(e) if e.is_idle() => break,
                    Err(e) => return Err(e),
                }
            }
            sleep(self.poll_interval).await;
        }

        decoder.finish(&mut lines);
        if lines.len() > max_lines {
            debug!(
                received = lines.len(),
                max_lines, "Line cap exceeded; keeping all lines"
            );
        }
        Ok(lines)
    }
}
