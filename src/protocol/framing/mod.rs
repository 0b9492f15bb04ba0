//! MNP framing: delimits packets on the raw serial byte stream.
//!
//! On the wire a frame is `SYN DLE STX <payload> DLE ETX <crc lo> <crc hi>`.
//! Every DLE inside the payload is doubled. The CRC covers the unescaped
//! payload and the ETX byte.
//!
//! Inbound, [`FrameParser`] is fed one byte at a time and yields the payload
//! of every frame whose checksum verifies; corrupted frames are dropped and
//! left to the link layer's retransmission. Outbound, [`encode_frame`] wraps a
//! payload for transmission.
use alloc::vec::Vec;

use crate::core::{Direction, Event};
use crate::error::FrameError;
use crate::infra::codec::crc16::crc16;

//==================================================================================Constants

pub const SYN: u8 = 0x16;
pub const DLE: u8 = 0x10;
pub const STX: u8 = 0x02;
pub const ETX: u8 = 0x03;

/// Header length byte announcing a 16-bit length.
pub const EXTENDED_HEADER: u8 = 0xFF;

//==================================================================================Parser

/// Position of the parser within the frame grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramingState {
    OutsidePacket,
    StartSyn,
    StartDle,
    InsidePacket,
    DleInPacket,
    EndEtx,
    EndCrc1,
    PacketEnd,
}

/// Byte-at-a-time frame delimiter.
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: FramingState,
    buffer: Vec<u8>,
    crc: u16,
    received_crc: u16,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub const fn new() -> Self {
        Self {
            state: FramingState::OutsidePacket,
            buffer: Vec::new(),
            crc: 0,
            received_crc: 0,
        }
    }

    pub fn state(&self) -> FramingState {
        self.state
    }

    /// Forget any partially received frame.
    pub fn reset(&mut self) {
        self.state = FramingState::OutsidePacket;
        self.buffer.clear();
        self.crc = 0;
        self.received_crc = 0;
    }

    /// Advance the state machine by one byte.
    ///
    /// Returns `Ok(Some(payload))` when the byte closes a frame with a valid
    /// checksum, and an error when the frame being received has to be dropped.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Vec<u8>>, FrameError> {
        use FramingState::*;

        match (self.state, byte) {
            (OutsidePacket | PacketEnd, SYN) => self.state = StartSyn,
            (OutsidePacket | PacketEnd, _) => self.state = OutsidePacket,
            (StartSyn, DLE) => self.state = StartDle,
            (StartSyn, _) => self.state = OutsidePacket,
            (StartDle, STX) => {
                self.buffer.clear();
                self.crc = 0;
                self.state = InsidePacket;
            }
            (StartDle, _) => self.state = OutsidePacket,
            (InsidePacket, DLE) => self.state = DleInPacket,
            (InsidePacket, _) => self.push(byte),
            (DleInPacket, DLE) => {
                self.push(DLE);
                self.state = InsidePacket;
            }
            (DleInPacket, ETX) => {
                self.crc = crc16(ETX, self.crc);
                self.state = EndEtx;
            }
            (DleInPacket, other) => {
                self.state = OutsidePacket;
                return Err(FrameError::UnexpectedEscape(other));
            }
            (EndEtx, low) => {
                self.received_crc = u16::from(low);
                self.state = EndCrc1;
            }
            (EndCrc1, high) => {
                self.received_crc |= u16::from(high) << 8;
                self.state = PacketEnd;
                if self.received_crc != self.crc {
                    return Err(FrameError::CrcMismatch {
                        computed: self.crc,
                        received: self.received_crc,
                    });
                }
                return Ok(Some(core::mem::take(&mut self.buffer)));
            }
        }
        Ok(None)
    }

    fn push(&mut self, byte: u8) {
        self.buffer.push(byte);
        self.crc = crc16(byte, self.crc);
    }
}

//==================================================================================Encoding

/// Wrap `payload` into an escaped, checksummed frame.
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + 8);
    frame.extend_from_slice(&[SYN, DLE, STX]);
    let mut crc = 0;
    for &byte in payload {
        if byte == DLE {
            frame.push(DLE);
        }
        frame.push(byte);
        crc = crc16(byte, crc);
    }
    crc = crc16(ETX, crc);
    frame.extend_from_slice(&[DLE, ETX]);
    frame.extend_from_slice(&crc.to_le_bytes());
    frame
}

//==================================================================================Header split

/// Frame payload split into its header and information field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameParts<'a> {
    pub packet_type: u8,
    /// Header bytes following the type byte.
    pub header: &'a [u8],
    /// Information field following the header.
    pub info: &'a [u8],
}

/// Split a frame payload using its header length byte. A length byte of
/// `0xFF` is followed by a 16-bit big-endian length. A length running past
/// the end of the frame is clamped, leaving an empty information field.
pub fn split_header(payload: &[u8]) -> Result<FrameParts<'_>, FrameError> {
    let (&first, rest) = payload.split_first().ok_or(FrameError::EmptyFrame)?;
    let (declared, rest) = if first == EXTENDED_HEADER {
        match rest {
            [high, low, tail @ ..] => (usize::from(u16::from_be_bytes([*high, *low])), tail),
            _ => {
                return Err(FrameError::TruncatedHeader {
                    declared: 2,
                    available: rest.len(),
                })
            }
        }
    } else {
        (usize::from(first), rest)
    };
    let (header, info) = rest.split_at(declared.min(rest.len()));
    let (&packet_type, header) = header.split_first().ok_or(FrameError::EmptyFrame)?;
    Ok(FrameParts {
        packet_type,
        header,
        info,
    })
}

//==================================================================================Layer

/// Event-level wrapper: turns inbound serial chunks into link frames and
/// outbound link frames into serial bytes.
#[derive(Debug, Clone, Default)]
pub struct FramingLayer {
    parser: FrameParser,
}

impl FramingLayer {
    pub const fn new() -> Self {
        Self {
            parser: FrameParser::new(),
        }
    }

    pub fn process(&mut self, event: &Event, out: &mut Vec<Event>) {
        match event {
            Event::Serial {
                direction: Direction::In,
                data,
            } => {
                for &byte in data {
                    match self.parser.feed(byte) {
                        Ok(Some(payload)) => out.push(Event::Link {
                            direction: Direction::In,
                            data: payload,
                        }),
                        Ok(None) => {}
                        Err(_err) => {
                            #[cfg(feature = "defmt")]
                            defmt::debug!("framing: dropped frame: {}", _err);
                        }
                    }
                }
            }
            Event::Link {
                direction: Direction::Out,
                data,
            } => out.push(Event::Serial {
                direction: Direction::Out,
                data: encode_frame(data),
            }),
            quit if quit.is_quit() => self.parser.reset(),
            _ => {}
        }
    }
}
