//! Configuration schema definitions.
//!
//! Every section has `#[serde(default)]`, so a config file only needs the keys
//! it changes. The defaults reproduce the stock board setup: 9600 baud, the
//! four-line boot banner and the `LED ON` / `LED OFF` cadence.

use super::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial link settings
    pub serial: SerialConfig,
    /// Device discovery settings
    pub discovery: DiscoveryConfig,
    /// Boot banner validation settings
    pub boot: BootConfig,
    /// Steady-state command cadence
    pub commands: CommandConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject settings the controller cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.serial.baud_rate == 0 {
            return Err(ConfigError::validation("serial.baud_rate", "must be non-zero"));
        }
        if self.serial.poll_interval_ms == 0 {
            return Err(ConfigError::validation(
                "serial.poll_interval_ms",
                "must be non-zero",
            ));
        }
        if self.discovery.retry_interval_ms == 0 {
            return Err(ConfigError::validation(
                "discovery.retry_interval_ms",
                "must be non-zero",
            ));
        }
        if self.boot.expected_lines.is_empty() {
            return Err(ConfigError::validation(
                "boot.expected_lines",
                "at least one banner line is required",
            ));
        }
        if let Some(i) = self.boot.expected_lines.iter().position(|l| l.trim().is_empty()) {
            return Err(ConfigError::validation(
                format!("boot.expected_lines[{}]", i),
                "banner lines must not be blank",
            ));
        }
        for (key, value) in [
            ("commands.activate", &self.commands.activate),
            ("commands.deactivate", &self.commands.deactivate),
        ] {
            if value.is_empty() || value.contains('\n') {
                return Err(ConfigError::validation(
                    key,
                    "must be a non-empty single line",
                ));
            }
        }
        Ok(())
    }
}

/// Serial link section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Baud rate used when opening the device
    pub baud_rate: u32,
    /// Per-read blocking timeout in milliseconds
    pub timeout_ms: u64,
    /// Sleep between input polls in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            timeout_ms: 1000,
            poll_interval_ms: 100,
        }
    }
}

impl SerialConfig {
    /// Get the per-read timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get the poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Device discovery section.
///
/// A device matches when its description contains any of
/// `description_patterns` or its path contains any of `path_patterns`.
/// Matching is case-sensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub description_patterns: Vec<String>,
    pub path_patterns: Vec<String>,
    /// Wait between searches, and after any failure, in milliseconds
    pub retry_interval_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            description_patterns: vec!["Arduino".to_string(), "CH340".to_string()],
            path_patterns: vec!["ttyUSB".to_string()],
            retry_interval_ms: 2000,
        }
    }
}

impl DiscoveryConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

/// Boot banner section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    /// Wait after opening, while the board resets, in milliseconds
    pub settle_ms: u64,
    /// How long to collect banner lines, in milliseconds
    pub window_ms: u64,
    /// Advisory line cap for the banner read
    pub max_lines: usize,
    /// Substrings that must each appear in some banner line
    pub expected_lines: Vec<String>,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            settle_ms: 2000,
            window_ms: 5000,
            max_lines: 50,
            expected_lines: vec![
                "========== BOOT INFO ==========".to_string(),
                "Firmware Version: 1.2".to_string(),
                "System initialized successfully.".to_string(),
                "================================".to_string(),
            ],
        }
    }
}

impl BootConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

/// Steady-state command section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Command that switches the output on
    pub activate: String,
    /// Command that switches the output off
    pub deactivate: String,
    /// Wait between writing a command and reading the reply, in milliseconds
    pub settle_ms: u64,
    /// How long to collect reply lines, in milliseconds
    pub reply_window_ms: u64,
    /// Advisory line cap for replies
    pub reply_max_lines: usize,
    /// Time spent "on" before switching off, in milliseconds
    pub on_hold_ms: u64,
    /// Time spent "off" before switching on again, in milliseconds
    pub off_hold_ms: u64,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            activate: "LED ON".to_string(),
            deactivate: "LED OFF".to_string(),
            settle_ms: 500,
            reply_window_ms: 1000,
            reply_max_lines: 5,
            on_hold_ms: 5000,
            off_hold_ms: 10000,
        }
    }
}

impl CommandConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn reply_window(&self) -> Duration {
        Duration::from_millis(self.reply_window_ms)
    }

    pub fn on_hold(&self) -> Duration {
        Duration::from_millis(self.on_hold_ms)
    }

    pub fn off_hold(&self) -> Duration {
        Duration::from_millis(self.off_hold_ms)
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log format: "full", "compact", "pretty"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Full,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single line with timestamp, level and target
    #[default]
    Full,
    /// Shorter single line
    Compact,
    /// Multi-line with colors
    Pretty,
}
