//! Dock session protocol: command codes, message codec and the docking
//! handshake state machine.
pub mod command;
pub mod message;
pub mod session;

pub use command::DockCommand;
pub use message::DockMessage;
pub use session::{DockSession, DockState, SessionConfig};
