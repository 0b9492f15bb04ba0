//! Information gathering: selects the first store, then lists its soups and
//! the applications installed on the Newton.
use alloc::{string::String, vec::Vec};

use super::{expect_success, DockModule};
use crate::core::Event;
use crate::error::{ModuleError, NsofError};
use crate::infra::codec::nsof::{FromNsof, ToNsof, Value};
use crate::protocol::dock::command::DockCommand;
use crate::protocol::dock::message::DockMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InfoState {
    Idle,
    GettingStoreNames,
    SelectingStore,
    GettingSoupNames,
    GettingAppList,
}

/// What the Newton told us.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoReport {
    /// Store frames, in the order the Newton listed them.
    pub stores: Vec<Value>,
    /// Soups of the selected store.
    pub soups: Vec<String>,
    /// One frame per application.
    pub apps: Vec<Value>,
    /// Set once the application list arrived.
    pub complete: bool,
}

impl InfoReport {
    /// Store the soups were listed for.
    pub fn current_store(&self) -> Option<&Value> {
        self.stores.first()
    }

    /// Names of the stores, where their frames carry one.
    pub fn store_names(&self) -> impl Iterator<Item = &str> {
        self.stores
            .iter()
            .filter_map(|store| store.slot("name").and_then(Value::as_str))
    }
}

#[derive(Debug, Clone)]
pub struct InfoModule {
    state: InfoState,
    report: InfoReport,
}

impl Default for InfoModule {
    fn default() -> Self {
        Self::new()
    }
}

impl InfoModule {
    pub fn new() -> Self {
        Self {
            state: InfoState::Idle,
            report: InfoReport::default(),
        }
    }

    pub fn state(&self) -> InfoState {
        self.state
    }

    pub fn report(&self) -> &InfoReport {
        &self.report
    }

    /// Hand over the gathered data, leaving an empty report behind.
    pub fn take_report(&mut self) -> InfoReport {
        core::mem::take(&mut self.report)
    }

    fn handle(
        &mut self,
        message: &DockMessage,
        out: &mut Vec<Event>,
    ) -> Result<(), ModuleError> {
        use InfoState::*;
        match (self.state, message.command) {
            (Idle, DockCommand::APP_CONNECTED) => {
                self.report = InfoReport::default();
                out.push(Event::dock_out(DockCommand::GET_STORE_NAMES, []));
                self.state = GettingStoreNames;
            }
            (Idle, _) => {}
            (_, DockCommand::OPERATION_CANCELED) => {
                #[cfg(feature = "defmt")]
                defmt::info!("info: canceled by the Newton");
                out.push(Event::dock_out(DockCommand::OP_CANCELED_ACK, []));
                self.state = Idle;
            }
            (GettingStoreNames, DockCommand::STORE_NAMES) => {
                let stores = Vec::<Value>::from_nsof_bytes(&message.payload)?;
                let first = stores
                    .first()
                    .ok_or(NsofError::UnexpectedValue("a non-empty store list"))?;
                out.push(Event::dock_out(
                    DockCommand::SET_CURRENT_STORE,
                    first.to_nsof_bytes(),
                ));
                self.report.stores = stores;
                self.state = SelectingStore;
            }
            (SelectingStore, DockCommand::RESULT) => {
                expect_success(message, DockCommand::SET_CURRENT_STORE)?;
                out.push(Event::dock_out(DockCommand::GET_SOUP_NAMES, []));
                self.state = GettingSoupNames;
            }
            (GettingSoupNames, DockCommand::SOUP_NAMES) => {
                self.report.soups = Vec::<String>::from_nsof_bytes(&message.payload)?;
                #[cfg(feature = "defmt")]
                defmt::info!("info: {} soups", self.report.soups.len());
                out.push(Event::dock_out(DockCommand::GET_APP_NAMES, [0, 0, 0, 0]));
                self.state = GettingAppList;
            }
            (GettingAppList, DockCommand::APP_NAMES) => {
                self.report.apps = Vec::<Value>::from_nsof_bytes(&message.payload)?;
                self.report.complete = true;
                #[cfg(feature = "defmt")]
                defmt::info!("info: {} applications", self.report.apps.len());
                out.push(Event::dock_out(DockCommand::OPERATION_DONE, []));
                self.state = Idle;
            }
            _ => {}
        }
        Ok(())
    }
}

impl DockModule for InfoModule {
    fn process(&mut self, event: &Event, out: &mut Vec<Event>) -> Result<(), ModuleError> {
        if event.is_quit() {
            self.reset();
            return Ok(());
        }
        match event.inbound_dock() {
            Some(message) => self.handle(message, out),
            None => Ok(()),
        }
    }

    /// Drops the operation in progress; the report gathered so far is kept.
    fn reset(&mut self) {
        self.state = InfoState::Idle;
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
