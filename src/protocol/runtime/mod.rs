//! Connection pipeline.
//!
//! A [`Connection`] owns one instance of every layer and runs each event
//! through them in a fixed order: framing, link, Dock session, application
//! module. Whatever a layer emits is queued and processed after the current
//! event has visited every layer, so two events are never interleaved.
//!
//! [`Connection::pump`] drives that loop synchronously, which is what tests
//! and offline tools use. The [`runner`] module drives it from a serial port.
use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::core::Event;
use crate::protocol::dock::session::{DockSession, SessionConfig};
use crate::protocol::framing::FramingLayer;
use crate::protocol::link::{LinkConfig, LinkLayer};
use crate::protocol::modules::DockModule;

pub mod runner;

pub use runner::{run_connection, ConnectionRunner, EventChannel};

/// Settings for every layer of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectionConfig {
    pub link: LinkConfig,
    pub session: SessionConfig,
}

impl ConnectionConfig {
    pub const fn new() -> Self {
        Self {
            link: LinkConfig::new(),
            session: SessionConfig::new(),
        }
    }

    pub const fn with_link(mut self, link: LinkConfig) -> Self {
        self.link = link;
        self
    }

    pub const fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }
}

/// Protocol stack for one Newton, from serial bytes up to the module.
#[derive(Debug)]
pub struct Connection<M: DockModule = ()> {
    framing: FramingLayer,
    link: LinkLayer,
    dock: DockSession,
    module: M,
}

impl<M: DockModule> Connection<M> {
    pub fn new(config: ConnectionConfig, module: M) -> Self {
        Self {
            framing: FramingLayer::new(),
            link: LinkLayer::new(config.link),
            dock: DockSession::new(config.session),
            module,
        }
    }

    pub fn link(&self) -> &LinkLayer {
        &self.link
    }

    pub fn dock(&self) -> &DockSession {
        &self.dock
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut M {
        &mut self.module
    }

    pub fn into_module(self) -> M {
        self.module
    }

    /// Run one event through every layer and return what they emitted, in
    /// emission order.
    pub fn dispatch(&mut self, event: &Event) -> Vec<Event> {
        let mut out = Vec::new();
        self.framing.process(event, &mut out);
        self.link.process(event, &mut out);
        self.dock.process(event, &mut out);
        if let Err(err) = self.module.process(event, &mut out) {
            #[cfg(feature = "defmt")]
            defmt::warn!("module: {}", defmt::Debug2Format(&err));
            self.module.reset();
            out.push(Event::ModuleFault(err));
        }
        out
    }

    /// Process `event` and everything it causes until the pipeline is
    /// quiet. Returns every emitted event in processing order.
    pub fn pump(&mut self, event: Event) -> Vec<Event> {
        let mut queue = VecDeque::from([event]);
        let mut trace = Vec::new();
        while let Some(event) = queue.pop_front() {
            let emitted = self.dispatch(&event);
            trace.extend(emitted.iter().cloned());
            queue.extend(emitted);
        }
        trace
    }
}

/// Serial bytes to write, concatenated from the `Serial Out` events of a
/// trace.
pub fn serial_output(events: &[Event]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Serial {
                direction: crate::core::Direction::Out,
                data,
            } => Some(data.as_slice()),
            _ => None,
        })
        .flatten()
        .copied()
        .collect()
}
