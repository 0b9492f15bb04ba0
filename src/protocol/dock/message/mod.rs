//! Dock message codec.
//!
//! On the wire a message is `"newt" "dock" <command:u32> <length:u32>
//! <payload>` followed by zero padding up to a multiple of four bytes. The
//! length field counts the payload only, without padding.
use alloc::vec::Vec;

use super::command::DockCommand;
use crate::error::DockError;
use crate::infra::codec::bytes::{ByteReader, ByteWriter};

pub const NEWT_MAGIC: [u8; 4] = *b"newt";
pub const DOCK_MAGIC: [u8; 4] = *b"dock";

/// Size of the fixed header.
pub const DOCK_HEADER_LEN: usize = 16;

/// Round `len` up to the 4-byte boundary messages are padded to. Saturates
/// instead of overflowing near `usize::MAX`.
pub const fn padded_len(len: usize) -> usize {
    len.saturating_add(3) & !3
}

//==================================================================================Header

/// Decoded fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DockHeader {
    pub command: DockCommand,
    /// Payload length, padding excluded.
    pub length: u32,
}

impl DockHeader {
    /// Parse the first 16 bytes of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, DockError> {
        let mut reader = ByteReader::new(bytes);
        let magic = reader
            .read_array::<8>()
            .map_err(|_| DockError::TruncatedHeader(bytes.len()))?;
        if magic[..4] != NEWT_MAGIC || magic[4..] != DOCK_MAGIC {
            return Err(DockError::BadMagic);
        }
        let command = reader.read_u32_be();
        let length = reader.read_u32_be();
        match (command, length) {
            (Ok(command), Ok(length)) => Ok(Self {
                command: DockCommand(command),
                length,
            }),
            _ => Err(DockError::TruncatedHeader(bytes.len())),
        }
    }

    /// Declared payload length as a `usize`.
    pub fn payload_len(&self) -> usize {
        self.length as usize
    }
}

//==================================================================================Message

/// Command plus payload, the unit the session layer and modules work with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockMessage {
    pub command: DockCommand,
    pub payload: Vec<u8>,
}

impl DockMessage {
    pub fn new(command: DockCommand, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            command,
            payload: payload.into(),
        }
    }

    /// Message without payload.
    pub fn empty(command: DockCommand) -> Self {
        Self::new(command, Vec::new())
    }

    /// Message whose payload is a single big-endian `u32`.
    pub fn with_u32(command: DockCommand, value: u32) -> Self {
        Self::new(command, value.to_be_bytes())
    }

    pub fn header(&self) -> DockHeader {
        DockHeader {
            command: self.command,
            length: self.payload.len() as u32,
        }
    }

    /// Encoded size, padding included.
    pub fn encoded_len(&self) -> usize {
        DOCK_HEADER_LEN + padded_len(self.payload.len())
    }

    /// Serialize with header and padding.
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(self.encoded_len());
        writer.write_slice(&NEWT_MAGIC);
        writer.write_slice(&DOCK_MAGIC);
        writer.write_u32_be(self.command.0);
        writer.write_u32_be(self.payload.len() as u32);
        writer.write_slice(&self.payload);
        while writer.len() < self.encoded_len() {
            writer.write_u8(0);
        }
        writer.into_inner()
    }

    /// Parse a complete message. Bytes past the declared length (padding)
    /// are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, DockError> {
        let header = DockHeader::parse(bytes)?;
        let available = bytes.len() - DOCK_HEADER_LEN;
        let declared = header.payload_len();
        if declared > available {
            return Err(DockError::TruncatedPayload {
                declared,
                available,
            });
        }
        Ok(Self::new(
            header.command,
            &bytes[DOCK_HEADER_LEN..DOCK_HEADER_LEN + declared],
        ))
    }

    /// Leading big-endian `u32` of the payload, as used by result codes and
    /// counters.
    pub fn leading_u32(&self) -> Result<u32, DockError> {
        ByteReader::new(&self.payload)
            .read_u32_be()
            .map_err(|_| DockError::ShortPayload {
                command: self.command,
                len: self.payload.len(),
            })
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
