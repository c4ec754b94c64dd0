//! Command/reply exchange.

use super::reader::LineReader;
use crate::config::CommandConfig;
use crate::port::{PortError, SerialPortAdapter};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// The bytes put on the wire for `text`: the literal text and one `\n`.
pub fn frame_command(text: &str) -> Vec<u8> {
    let mut framed = Vec::with_capacity(text.len() + 1);
    framed.extend_from_slice(text.as_bytes());
    framed.push(b'\n');
    framed
}

/// Writes one command line and collects the reply.
#[derive(Debug, Clone)]
pub struct CommandExchanger {
    settle: Duration,
    reply_window: Duration,
    reply_max_lines: usize,
    reader: LineReader,
}

impl CommandExchanger {
    pub fn new(config: &CommandConfig, reader: LineReader) -> Self {
        Self {
            settle: config.settle(),
            reply_window: config.reply_window(),
            reply_max_lines: config.reply_max_lines,
            reader,
        }
    }

    /// Send `text`, give the device the settle delay, then read its reply.
    ///
    /// No reply is a valid, empty result.
    pub async fn send_command(
        &self,
        port: &mut dyn SerialPortAdapter,
        text: &str,
    ) -> Result<Vec<String>, PortError> {
        port.write_all_bytes(&frame_command(text))?;
        debug!(command = text, "Wrote command to {}", port.name());

        sleep(self.settle).await;
        let reply = self
            .reader
            .read_lines(port, self.reply_window, self.reply_max_lines)
            .await?;

        for line in &reply {
            info!(device = %port.name(), "-> {}", line);
        }
        Ok(reply)
    }
}
