//! List serial ports and show which one the watchdog would pick.
//!
//! Useful when a board is plugged in but never found: the description
//! printed here is exactly what the discovery heuristic matches against.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example check_ports
//! ```

use bootlink::discovery::PortLocator;
use bootlink::port::{PortProvider, SystemPorts};

fn main() {
    println!("Serial Port Detection Utility");
    println!("{:=<70}", "");
    println!();

    let ports = match SystemPorts.list_ports() {
        Ok(ports) => ports,
        Err(e) => {
            println!("Error detecting serial ports: {}", e);
            println!();
            println!("Possible causes:");
            println!("  - Insufficient permissions");
            println!("  - Serial port drivers not installed");
            return;
        }
    };

    if ports.is_empty() {
        println!("No serial ports detected on this system");
        return;
    }

    let locator = PortLocator::default();
    let selected = locator.select(&ports).map(|p| p.device.clone());

    println!("Found {} serial port(s):", ports.len());
    println!();
    for (idx, port) in ports.iter().enumerate() {
        let marker = if selected.as_deref() == Some(port.device.as_str()) {
            "  <- selected"
        } else if locator.select(std::slice::from_ref(port)).is_some() {
            "  (matches)"
        } else {
            ""
        };
        println!("{}. {} - {}{}", idx + 1, port.device, port.description, marker);
    }
    println!();

    match selected {
        Some(device) => {
            println!("To run the hardware tests against it:");
            println!();
            println!("  export TEST_PORT={}", device);
            println!("  cargo test --features hardware-tests -- --ignored");
        }
        None => println!("No port matches the default heuristic."),
    }
}
