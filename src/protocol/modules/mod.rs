//! Application modules: the last stage of the pipeline. A module sees every
//! event once the Dock session has processed it and drives an operation
//! (information gathering, package install) after the session signals
//! `APP_CONNECTED`.
use alloc::vec::Vec;

use crate::core::Event;
use crate::error::ModuleError;
use crate::protocol::dock::command::DockCommand;
use crate::protocol::dock::message::DockMessage;

pub mod info;
pub mod install;

pub use info::{InfoModule, InfoReport};
pub use install::InstallModule;

/// Contract for an operation run over an established Dock session.
pub trait DockModule {
    /// Handle one event, appending replies to `out`.
    ///
    /// An error abandons the current operation; the caller reports it and
    /// calls [`DockModule::reset`].
    fn process(&mut self, event: &Event, out: &mut Vec<Event>) -> Result<(), ModuleError>;

    /// Return to the idle state.
    fn reset(&mut self) {}
}

/// No application: the connection only docks.
impl DockModule for () {
    fn process(&mut self, _event: &Event, _out: &mut Vec<Event>) -> Result<(), ModuleError> {
        Ok(())
    }
}

/// Signed result code of a Result message; zero means success.
pub(crate) fn result_code(message: &DockMessage) -> Result<i32, ModuleError> {
    Ok(message.leading_u32()? as i32)
}

/// Fail with [`ModuleError::Rejected`] unless `message` reports success.
pub(crate) fn expect_success(
    message: &DockMessage,
    request: DockCommand,
) -> Result<(), ModuleError> {
    match result_code(message)? {
        0 => Ok(()),
        code => Err(ModuleError::Rejected {
            command: request,
            code,
        }),
    }
}
