//! Shared test utilities.
//!
//! - Fake device listings and banner-emitting mock boards
//! - A fast configuration so paused-clock tests stay readable

#![allow(dead_code)]

use bootlink::config::Config;
use bootlink::port::{MockPortProvider, PortDescriptor};

/// The stock boot banner, one entry per line.
pub const BANNER: [&str; 4] = [
    "========== BOOT INFO ==========",
    "Firmware Version: 1.2",
    "System initialized successfully.",
    "================================",
];

/// A device path the default heuristic picks up.
pub const BOARD_PATH: &str = "/dev/ttyUSB0";

/// Provider listing one matching board that prints the banner on open.
pub fn board_provider() -> MockPortProvider {
    let provider = MockPortProvider::new();
    provider.set_devices(vec![
        PortDescriptor::new("/dev/ttyS0", "n/a"),
        PortDescriptor::new(BOARD_PATH, "n/a"),
    ]);
    provider.set_boot_lines(BANNER);
    provider
}

/// Provider listing only devices the default heuristic ignores.
pub fn unrelated_provider() -> MockPortProvider {
    let provider = MockPortProvider::new();
    provider.set_devices(vec![
        PortDescriptor::new("/dev/ttyS0", "n/a"),
        PortDescriptor::new("/dev/ttyAMA0", "PL011 UART"),
    ]);
    provider
}

/// Default configuration.
pub fn default_config() -> Config {
    Config::default()
}

/// Banner lines interleaved with noise, in the order the board might print them.
pub fn noisy_banner() -> Vec<String> {
    let mut lines = vec!["junk".to_string()];
    for (i, line) in BANNER.iter().enumerate() {
        lines.push(line.to_string());
        lines.push(format!("noise {}", i));
    }
    lines
}
