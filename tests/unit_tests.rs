//! Unit tests for the configuration schema and error types.
//!
//! Tests follow the Arrange-Act-Assert pattern and cover:
//! - Defaults and partial TOML files
//! - Validation of values the controller cannot run with
//! - Failure classification used by the controller
//! - Error display and conversions

use bootlink::config::{Config, ConfigError, ConfigLoader, LogFormat};
use bootlink::error::LinkError;
use bootlink::port::PortError;
use pretty_assertions::assert_eq;
use std::io::Write;
use std::time::Duration;

// ============================================================================
// Config Tests
// ============================================================================

mod config_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_stock_board() {
        // Arrange / Act
        let config = Config::default();

        // Assert
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.serial.timeout(), Duration::from_secs(1));
        assert_eq!(config.discovery.retry_interval(), Duration::from_secs(2));
        assert_eq!(config.boot.window(), Duration::from_secs(5));
        assert_eq!(config.boot.expected_lines.len(), 4);
        assert_eq!(config.commands.activate, "LED ON");
        assert_eq!(config.commands.deactivate, "LED OFF");
        assert_eq!(config.commands.settle(), Duration::from_millis(500));
        assert_eq!(config.commands.reply_window(), Duration::from_secs(1));
        assert_eq!(config.commands.reply_max_lines, 5);
        assert_eq!(config.commands.on_hold(), Duration::from_secs(5));
        assert_eq!(config.commands.off_hold(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        // Arrange
        let toml = r#"
            [serial]
            baud_rate = 115200

            [commands]
            on_hold_ms = 250

            [logging]
            format = "compact"
        "#;

        // Act
        let config: Config = toml::from_str(toml).expect("parse partial config");

        // Assert
        assert_eq!(config.serial.baud_rate, 115200);
        assert_eq!(config.serial.timeout_ms, 1000);
        assert_eq!(config.commands.on_hold(), Duration::from_millis(250));
        assert_eq!(config.commands.off_hold(), Duration::from_secs(10));
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.boot, Config::default().boot);
    }

    #[test]
    fn test_loader_rejects_multiline_command() {
        // Arrange
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[commands]\nactivate = \"LED\\nON\"").unwrap();

        // Act
        let result = ConfigLoader::load_from(file.path());

        // Assert
        match result {
            Err(ConfigError::ValidationError { key, .. }) => {
                assert_eq!(key, "commands.activate")
            }
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_loader_rejects_blank_banner_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[boot]\nexpected_lines = [\"BOOT\", \"  \"]").unwrap();

        let err = ConfigLoader::load_from(file.path()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Invalid configuration value for 'boot.expected_lines[1]': banner lines must not be blank"
        );
    }

    #[test]
    fn test_unknown_log_format_is_a_parse_error() {
        let result: Result<Config, _> = toml::from_str("[logging]\nformat = \"json\"");
        assert!(result.is_err());
    }
}

// ============================================================================
// Error Tests
// ============================================================================

mod error_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_transport_classification() {
        // Arrange
        let transport = [
            PortError::not_found("/dev/ttyUSB0"),
            PortError::disconnected("/dev/ttyUSB0"),
            PortError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "cable pulled",
            )),
            PortError::Serial(serialport::Error::new(
                serialport::ErrorKind::NoDevice,
                "gone",
            )),
        ];
        let other = [
            PortError::config("unsupported baud rate"),
            PortError::Serial(serialport::Error::new(
                serialport::ErrorKind::InvalidInput,
                "bad parity",
            )),
        ];

        // Act / Assert
        for e in &transport {
            assert!(e.is_transport(), "{} should be transport", e);
        }
        for e in &other {
            assert!(!e.is_transport(), "{} should not be transport", e);
        }
    }

    #[test]
    fn test_link_error_from_config_error() {
        let err: LinkError = ConfigError::validation("serial.baud_rate", "must be non-zero").into();

        assert!(matches!(err, LinkError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid configuration value for 'serial.baud_rate': must be non-zero"
        );
    }

    #[test]
    fn test_port_error_display() {
        assert_eq!(
            PortError::not_found("/dev/ttyACM3").to_string(),
            "Serial port not found: /dev/ttyACM3"
        );
        assert_eq!(
            PortError::disconnected("/dev/ttyACM3").to_string(),
            "Device disconnected: /dev/ttyACM3"
        );
    }
}
