//! Configuration module.
//!
//! TOML-based configuration. With no file the built-in defaults apply, which
//! describe the stock board: 9600 baud, the four-line boot banner, and a
//! `LED ON` / `LED OFF` cadence of 5 s on and 10 s off.
//!
//! # Example
//!
//! ```toml
//! [discovery]
//! path_patterns = ["ttyUSB", "ttyACM"]
//!
//! [commands]
//! on_hold_ms = 1000
//! off_hold_ms = 1000
//!
//! [logging]
//! level = "debug"
//! format = "compact"
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use schema::{
    BootConfig, CommandConfig, Config, DiscoveryConfig, LogFormat, LoggingConfig, SerialConfig,
};
