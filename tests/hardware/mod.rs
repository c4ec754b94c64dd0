//! Tests against a real board.
//!
//! The port comes from `TEST_PORT` when set, otherwise from the default
//! discovery heuristic.

pub mod board_tests;

use bootlink::discovery::PortLocator;
use bootlink::port::{PortConfiguration, SystemPorts};
use std::env;

/// Test port from environment, falling back to discovery.
pub fn test_port() -> Option<String> {
    env::var("TEST_PORT")
        .ok()
        .or_else(|| PortLocator::default().find_port(&SystemPorts).ok().flatten())
}

/// Port settings, honouring `TEST_BAUD`.
pub fn test_settings() -> PortConfiguration {
    let baud_rate = env::var("TEST_BAUD")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9600);
    PortConfiguration {
        baud_rate,
        ..PortConfiguration::default()
    }
}
