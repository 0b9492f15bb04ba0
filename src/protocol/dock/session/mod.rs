//! Docking handshake.
//!
//! The Newton opens a session with Request-To-Dock; the desktop answers each
//! step of the handshake until the Newton greets it with Hello, at which
//! point the application modules are told the connection is up.
//!
//! ```text
//! Idle --rtdk--> Initiating --name--> SentDesktopInfo --ninf--> SentWhichIcons
//!      --dres--> SentTimeout --pass--> SentPassword --helo--> Up
//! ```
//!
//! A Result while waiting for Hello means the Newton refused the password and
//! the session falls back to `Idle`. Commands that match no transition are
//! ignored.
use alloc::vec::Vec;
use des::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use des::Des;

use crate::core::{Direction, Event};
use crate::error::DockError;
use crate::infra::codec::bytes::ByteWriter;
use crate::infra::codec::nsof::{encode_versioned, Value};
use crate::protocol::dock::command::DockCommand;
use crate::protocol::dock::message::DockMessage;

//==================================================================================Constants

/// Dock protocol version announced in Desktop-Info.
pub const PROTOCOL_VERSION: u32 = 10;

/// Session timeout requested with Set-Timeout.
pub const DEFAULT_TIMEOUT_SECONDS: u32 = 10;

/// Key the Newton expects its challenge to be encrypted with.
pub const PASSWORD_KEY: [u8; 8] = [0xE4, 0x0F, 0x7E, 0x9F, 0x0A, 0x36, 0x2C, 0xFA];

/// Fixed desktop identifier sent in Desktop-Info.
pub const DESKTOP_KEY: [u8; 8] = [0x64, 0x23, 0xEF, 0x02, 0xFB, 0xCD, 0xC5, 0xA5];

/// Offset of the challenge in the Newton-Info payload.
const CHALLENGE_OFFSET: usize = 4;

//==================================================================================Configuration

/// Kind of session requested in Initiate-Docking and Desktop-Info.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum SessionType {
    None = 0,
    SettingUp = 1,
    Synchronize = 3,
    Restore = 4,
    LoadPackage = 5,
    TestComm = 6,
    LoadPatch = 7,
    UpdatingStores = 8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum DesktopType {
    Mac = 0,
    Windows = 1,
}

/// Icons the Newton should enable in its Dock application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IconMask(pub u32);

impl IconMask {
    pub const BACKUP: Self = Self(1);
    pub const RESTORE: Self = Self(2);
    pub const INSTALL: Self = Self(4);
    pub const IMPORT: Self = Self(8);
    pub const SYNC: Self = Self(16);
    pub const KEYBOARD: Self = Self(32);
    pub const ALL: Self = Self(63);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for IconMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// What the desktop announces during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionConfig {
    pub session_type: SessionType,
    pub desktop_type: DesktopType,
    pub timeout_seconds: u32,
    pub icons: IconMask,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfig {
    pub const fn new() -> Self {
        Self {
            session_type: SessionType::SettingUp,
            desktop_type: DesktopType::Mac,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            icons: IconMask::ALL,
        }
    }

    pub const fn with_session_type(mut self, session_type: SessionType) -> Self {
        self.session_type = session_type;
        self
    }

    pub const fn with_desktop_type(mut self, desktop_type: DesktopType) -> Self {
        self.desktop_type = desktop_type;
        self
    }

    pub const fn with_timeout_seconds(mut self, timeout_seconds: u32) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub const fn with_icons(mut self, icons: IconMask) -> Self {
        self.icons = icons;
        self
    }
}

//==================================================================================Session

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DockState {
    Idle,
    Initiating,
    SentDesktopInfo,
    SentWhichIcons,
    SentTimeout,
    SentPassword,
    Up,
}

/// Desktop side of the docking handshake.
#[derive(Debug, Clone)]
pub struct DockSession {
    config: SessionConfig,
    state: DockState,
    /// Challenge from Newton-Info, answered in the Password step.
    challenge: u64,
}

impl Default for DockSession {
    fn default() -> Self {
        Self::new(SessionConfig::new())
    }
}

impl DockSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: DockState::Idle,
            challenge: 0,
        }
    }

    pub fn state(&self) -> DockState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn challenge(&self) -> u64 {
        self.challenge
    }

    pub fn reset(&mut self) {
        self.state = DockState::Idle;
        self.challenge = 0;
    }

    /// Advance the handshake with an inbound Dock message. Outbound replies
    /// and the application-connected signal are appended to `out`.
    pub fn process(&mut self, event: &Event, out: &mut Vec<Event>) {
        if event.is_quit() {
            self.reset();
            return;
        }
        let Some(message) = event.inbound_dock() else {
            return;
        };
        if message.command.is_internal() {
            return;
        }
        match self.transition(message) {
            Ok(Some((next, reply))) => {
                #[cfg(feature = "defmt")]
                defmt::debug!(
                    "dock: {} in {} -> {}",
                    message.command,
                    self.state,
                    next
                );
                self.state = next;
                out.extend(reply);
            }
            Ok(None) => {}
            Err(err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("dock: {}", defmt::Debug2Format(&err));
                out.push(Event::SessionFault(err));
            }
        }
    }

    /// Next state and emitted event for `message`, or `None` when the
    /// command does not apply to the current state.
    fn transition(
        &mut self,
        message: &DockMessage,
    ) -> Result<Option<(DockState, Option<Event>)>, DockError> {
        use DockState::*;
        let step = match (self.state, message.command) {
            (Idle, DockCommand::REQUEST_TO_DOCK) => (
                Initiating,
                Some(send(DockMessage::with_u32(
                    DockCommand::INITIATE_DOCKING,
                    self.config.session_type as u32,
                ))),
            ),
            (Initiating, DockCommand::NEWTON_NAME) => (
                SentDesktopInfo,
                Some(send(desktop_info(&self.config))),
            ),
            (SentDesktopInfo, DockCommand::NEWTON_INFO) => {
                self.challenge = parse_challenge(message)?;
                (
                    SentWhichIcons,
                    Some(send(DockMessage::with_u32(
                        DockCommand::WHICH_ICONS,
                        self.config.icons.0,
                    ))),
                )
            }
            (SentWhichIcons, DockCommand::RESULT) => (
                SentTimeout,
                Some(send(DockMessage::with_u32(
                    DockCommand::SET_TIMEOUT,
                    self.config.timeout_seconds,
                ))),
            ),
            (SentTimeout, DockCommand::PASSWORD) => (
                SentPassword,
                Some(send(DockMessage::new(
                    DockCommand::PASSWORD,
                    encrypt_challenge(self.challenge),
                ))),
            ),
            (SentPassword, DockCommand::HELLO) => {
                #[cfg(feature = "defmt")]
                defmt::info!("dock: connected");
                (Up, Some(Event::dock_in(DockCommand::APP_CONNECTED, [])))
            }
            (SentPassword, DockCommand::RESULT) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("dock: password rejected");
                self.challenge = 0;
                (Idle, None)
            }
            (Up, DockCommand::DISCONNECT) => {
                self.challenge = 0;
                (Idle, None)
            }
            _ => return Ok(None),
        };
        Ok(Some(step))
    }
}

fn send(message: DockMessage) -> Event {
    Event::Dock {
        direction: Direction::Out,
        message,
    }
}

/// Eight big-endian bytes following the first word of Newton-Info.
fn parse_challenge(message: &DockMessage) -> Result<u64, DockError> {
    message
        .payload
        .get(CHALLENGE_OFFSET..CHALLENGE_OFFSET + 8)
        .and_then(|bytes| <[u8; 8]>::try_from(bytes).ok())
        .map(u64::from_be_bytes)
        .ok_or(DockError::ShortPayload {
            command: message.command,
            len: message.payload.len(),
        })
}

/// DES-ECB encryption of the challenge, as the Newton checks it.
pub fn encrypt_challenge(challenge: u64) -> [u8; 8] {
    let cipher = Des::new(GenericArray::from_slice(&PASSWORD_KEY));
    let mut block = GenericArray::from(challenge.to_be_bytes());
    cipher.encrypt_block(&mut block);
    block.into()
}

/// Applications the desktop offers, as an NSOF array of frames.
pub fn desktop_apps() -> Value {
    Value::PlainArray(alloc::vec![Value::frame([
        ("id", Value::Integer(2)),
        ("name", Value::string("Newton Connection Utilities")),
        ("version", Value::Integer(1)),
    ])])
}

/// Desktop-Info: protocol version, desktop type, desktop key, session type,
/// selective sync flag, then the application list.
pub fn desktop_info(config: &SessionConfig) -> DockMessage {
    let apps = encode_versioned(&desktop_apps());
    let mut writer = ByteWriter::with_capacity(24 + apps.len());
    writer.write_u32_be(PROTOCOL_VERSION);
    writer.write_u32_be(config.desktop_type as u32);
    writer.write_slice(&DESKTOP_KEY);
    writer.write_u32_be(config.session_type as u32);
    // Selective sync allowed.
    writer.write_u32_be(1);
    writer.write_slice(&apps);
    DockMessage::new(DockCommand::DESKTOP_INFO, writer.into_inner())
}
