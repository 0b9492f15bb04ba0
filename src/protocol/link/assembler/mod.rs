//! Dock message assembler: rebuilds Dock messages from the information
//! fields of consecutive Link Transfers.
//!
//! The first fragment starts with the 16-byte Dock header; once it has been
//! seen, fragments are appended until the declared payload length is reached.
//! Padding that a peer sends after the payload may spill into the next
//! fragment; it is skipped before the next message starts. Headers naming a
//! local signal command are rejected so a peer cannot forge them.
use alloc::vec::Vec;

use crate::error::{DockError, LinkError};
use crate::protocol::dock::message::{padded_len, DockHeader, DockMessage, DOCK_HEADER_LEN};

//==================================================================================Enums and Structs
#[derive(Debug, PartialEq, Eq)]
pub enum ProcessResult {
    /// Fragment carried nothing but padding from the previous message.
    Ignored,
    /// Fragment stored; more are needed.
    FragmentConsumed,
    /// The declared payload length has been reached.
    MessageComplete(DockMessage),
}

/// Reassembly state for one direction of a link.
#[derive(Debug, Clone, Default)]
pub struct DockAssembler {
    /// Bytes received for the current message (header included until parsed).
    buffer: Vec<u8>,
    /// Header of the message in progress, once 16 bytes have arrived.
    header: Option<DockHeader>,
    /// Padding bytes still expected from the previous message.
    pending_padding: usize,
}

impl DockAssembler {
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            header: None,
            pending_padding: 0,
        }
    }

    /// `true` when no message is in progress.
    pub fn is_idle(&self) -> bool {
        self.header.is_none() && self.buffer.is_empty()
    }

    /// Drop any partial message.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.header = None;
        self.pending_padding = 0;
    }

    //==================================================================================Process Functions
    /// Feed the information field of one Link Transfer.
    pub fn process_fragment(&mut self, info: &[u8]) -> Result<ProcessResult, LinkError> {
        let mut data = info;
        if self.pending_padding > 0 && self.is_idle() {
            // Only zero bytes count as padding; anything else starts a message.
            let skip = data
                .iter()
                .take(self.pending_padding)
                .take_while(|&&byte| byte == 0)
                .count();
            data = &data[skip..];
            if data.is_empty() {
                self.pending_padding -= skip;
                return Ok(ProcessResult::Ignored);
            }
            self.pending_padding = 0;
        }

        self.buffer.extend_from_slice(data);

        let header = match self.header {
            Some(header) => header,
            None if self.buffer.len() < DOCK_HEADER_LEN => {
                return Ok(ProcessResult::FragmentConsumed)
            }
            None => match DockHeader::parse(&self.buffer) {
                Ok(header) if header.command.is_internal() => {
                    self.reset();
                    return Err(DockError::InternalCommand(header.command).into());
                }
                Ok(header) => {
                    self.buffer.drain(..DOCK_HEADER_LEN);
                    self.header = Some(header);
                    header
                }
                Err(err) => {
                    self.reset();
                    return Err(err.into());
                }
            },
        };

        let declared = header.payload_len();
        let received = self.buffer.len();
        if received > padded_len(declared) {
            self.reset();
            return Err(LinkError::ReassemblyOverflow { declared, received });
        }
        if received < declared {
            return Ok(ProcessResult::FragmentConsumed);
        }

        let mut payload = core::mem::take(&mut self.buffer);
        payload.truncate(declared);
        self.header = None;
        self.pending_padding = padded_len(declared) - received;
        Ok(ProcessResult::MessageComplete(DockMessage::new(
            header.command,
            payload,
        )))
    }
}
