//! Data contract shared by the protocol layers: every layer consumes and
//! produces [`Event`]s, tagged with the [`Direction`] they travel in.
use alloc::vec::Vec;

use crate::error::{DockError, LinkError, ModuleError};
use crate::protocol::dock::command::DockCommand;
use crate::protocol::dock::message::DockMessage;

/// Travel direction of an event: `In` flows from the Newton towards the
/// application, `Out` from the application towards the serial port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    In,
    Out,
}

/// Unit of work exchanged between layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Raw serial bytes. Inbound chunks come from the port reader, outbound
    /// ones are complete escaped frames ready to be written.
    Serial { direction: Direction, data: Vec<u8> },
    /// Unescaped, CRC-checked frame payload (header length byte first).
    Link { direction: Direction, data: Vec<u8> },
    /// Complete Dock message, or an internal application signal.
    Dock {
        direction: Direction,
        message: DockMessage,
    },
    /// Periodic tick driving link acknowledgements and retransmission.
    KeepAlive,
    /// The link layer dropped a packet it could not handle.
    LinkFault(LinkError),
    /// The Dock session could not use an inbound message.
    SessionFault(DockError),
    /// An application module failed to handle a Dock message.
    ModuleFault(ModuleError),
}

impl Event {
    /// Chunk of bytes read from the serial port.
    pub fn serial_in(data: impl Into<Vec<u8>>) -> Self {
        Event::Serial {
            direction: Direction::In,
            data: data.into(),
        }
    }

    /// Dock message produced by the host side.
    pub fn dock_out(command: DockCommand, payload: impl Into<Vec<u8>>) -> Self {
        Event::Dock {
            direction: Direction::Out,
            message: DockMessage::new(command, payload),
        }
    }

    /// Dock message delivered towards the application.
    pub fn dock_in(command: DockCommand, payload: impl Into<Vec<u8>>) -> Self {
        Event::Dock {
            direction: Direction::In,
            message: DockMessage::new(command, payload),
        }
    }

    /// Shutdown signal: every layer resets when it sees it.
    pub fn quit() -> Self {
        Self::dock_in(DockCommand::APP_QUIT, Vec::new())
    }

    /// `true` for an inbound `APP_QUIT` Dock event.
    pub fn is_quit(&self) -> bool {
        matches!(
            self,
            Event::Dock {
                direction: Direction::In,
                message,
            } if message.command == DockCommand::APP_QUIT
        )
    }

    /// Inbound Dock message, if this event is one.
    pub fn inbound_dock(&self) -> Option<&DockMessage> {
        match self {
            Event::Dock {
                direction: Direction::In,
                message,
            } => Some(message),
            _ => None,
        }
    }
}
