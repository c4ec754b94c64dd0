//! Line-oriented exchange with the board.
//!
//! - `reader`: time-bounded line reading
//! - `boot`: boot banner validation
//! - `command`: command write + reply capture
//! - `connection`: the open link the controller owns

pub mod boot;
pub mod command;
mod connection;
pub mod reader;

pub use boot::{BootExpectation, BootOutcome, BootValidator};
pub use command::{frame_command, CommandExchanger};
pub use connection::Connection;
pub use reader::{LineDecoder, LineReader};
