//! Package installation: asks the Newton to accept a package, sends it, and
//! hangs up once the Newton confirms.
use alloc::vec::Vec;

use super::{expect_success, DockModule};
use crate::core::Event;
use crate::error::ModuleError;
use crate::protocol::dock::command::DockCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InstallState {
    Idle,
    /// Request-To-Install sent.
    Requested,
    /// Package sent, waiting for the install result.
    Sent,
}

#[derive(Debug, Clone)]
pub struct InstallModule {
    package: Vec<u8>,
    state: InstallState,
    installed: bool,
}

impl InstallModule {
    /// Module that installs `package` (raw package file bytes).
    pub fn new(package: impl Into<Vec<u8>>) -> Self {
        Self {
            package: package.into(),
            state: InstallState::Idle,
            installed: false,
        }
    }

    pub fn state(&self) -> InstallState {
        self.state
    }

    pub fn package(&self) -> &[u8] {
        &self.package
    }

    /// `true` once the Newton accepted the package.
    pub fn installed(&self) -> bool {
        self.installed
    }
}

impl DockModule for InstallModule {
    fn process(&mut self, event: &Event, out: &mut Vec<Event>) -> Result<(), ModuleError> {
        if event.is_quit() {
            self.reset();
            return Ok(());
        }
        let Some(message) = event.inbound_dock() else {
            return Ok(());
        };

        use InstallState::*;
        match (self.state, message.command) {
            (Idle, DockCommand::APP_CONNECTED) => {
                self.installed = false;
                out.push(Event::dock_out(DockCommand::REQUEST_TO_INSTALL, []));
                self.state = Requested;
            }
            (Requested, DockCommand::RESULT) => {
                expect_success(message, DockCommand::REQUEST_TO_INSTALL)?;
                #[cfg(feature = "defmt")]
                defmt::info!("install: sending {} bytes", self.package.len());
                out.push(Event::dock_out(
                    DockCommand::LOAD_PACKAGE,
                    self.package.clone(),
                ));
                self.state = Sent;
            }
            (Requested | Sent, DockCommand::OPERATION_CANCELED) => {
                out.push(Event::dock_out(DockCommand::OP_CANCELED_ACK, []));
                self.state = Idle;
            }
            (Sent, DockCommand::RESULT) => {
                expect_success(message, DockCommand::LOAD_PACKAGE)?;
                #[cfg(feature = "defmt")]
                defmt::info!("install: done");
                self.installed = true;
                out.push(Event::dock_out(DockCommand::DISCONNECT, []));
                self.state = Idle;
            }
            _ => {}
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.state = InstallState::Idle;
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
