//! MNP link packets: parsing of inbound frame payloads and construction of
//! the packets the desktop sends back.
use alloc::vec::Vec;

use crate::error::LinkError;
use crate::protocol::framing::split_header;

//==================================================================================Packet types

/// Link packet type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LinkPacketType {
    LinkRequest = 0x01,
    LinkDisconnect = 0x02,
    LinkTransfer = 0x04,
    LinkAck = 0x05,
}

impl TryFrom<u8> for LinkPacketType {
    type Error = LinkError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::LinkRequest),
            0x02 => Ok(Self::LinkDisconnect),
            0x04 => Ok(Self::LinkTransfer),
            0x05 => Ok(Self::LinkAck),
            other => Err(LinkError::UnknownPacketType(other)),
        }
    }
}

//==================================================================================Link request

/// LR option types.
mod option {
    pub const FRAMING_MODE: u8 = 0x02;
    pub const MAX_OUTSTANDING: u8 = 0x03;
    pub const MAX_INFO_LENGTH: u8 = 0x04;
    pub const DATA_PHASE_OPTIONS: u8 = 0x08;
}

/// Data phase option bit allowing 256-byte information fields.
pub const DPO_MAX_INFO_256: u8 = 0x01;

/// Information field size used with the 256-byte data phase option.
pub const LARGE_INFO_LENGTH: usize = 256;

/// Information field size used when the peer announces none.
pub const FALLBACK_INFO_LENGTH: usize = 64;

/// Parameters a peer proposes in a Link Request. Options it omits stay zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkRequestParams {
    pub framing_mode: u8,
    pub max_outstanding: u8,
    /// Raw max-info-length option bytes, echoed back verbatim.
    pub max_info_length: [u8; 2],
    pub data_phase_options: u8,
}

impl LinkRequestParams {
    /// Read the option list of an LR header (bytes after the type byte).
    /// The first byte is a constant parameter; options follow as
    /// type/length/value triples. Unknown or truncated options are skipped.
    pub fn parse(header: &[u8]) -> Self {
        let mut params = Self::default();
        let mut options = header.get(1..).unwrap_or_default();
        while let [kind, len, rest @ ..] = options {
            let len = usize::from(*len);
            let Some(value) = rest.get(..len) else {
                break;
            };
            match (*kind, value) {
                (option::FRAMING_MODE, [mode, ..]) => params.framing_mode = *mode,
                (option::MAX_OUTSTANDING, [window, ..]) => params.max_outstanding = *window,
                (option::MAX_INFO_LENGTH, [high, low, ..]) => {
                    params.max_info_length = [*high, *low]
                }
                (option::DATA_PHASE_OPTIONS, [dpo, ..]) => params.data_phase_options = *dpo,
                _ => {}
            }
            options = &rest[len..];
        }
        params
    }

    /// Largest information field either side may send.
    pub fn negotiated_info_length(&self) -> usize {
        if self.data_phase_options & DPO_MAX_INFO_256 != 0 {
            return LARGE_INFO_LENGTH;
        }
        match usize::from(u16::from_be_bytes(self.max_info_length)) {
            0 => FALLBACK_INFO_LENGTH,
            announced => announced,
        }
    }
}

//==================================================================================Parsing

/// Decoded link packet, borrowing the information field of transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPacket<'a> {
    Request(LinkRequestParams),
    Disconnect,
    Transfer { sequence: u8, info: &'a [u8] },
    Ack { sequence: u8, credit: u8 },
}

impl<'a> LinkPacket<'a> {
    /// Parse an unescaped frame payload.
    pub fn parse(payload: &'a [u8]) -> Result<Self, LinkError> {
        let parts = split_header(payload)?;
        let short = || LinkError::ShortHeader {
            packet_type: parts.packet_type,
        };
        match LinkPacketType::try_from(parts.packet_type)? {
            LinkPacketType::LinkRequest => Ok(Self::Request(LinkRequestParams::parse(parts.header))),
            LinkPacketType::LinkDisconnect => Ok(Self::Disconnect),
            LinkPacketType::LinkTransfer => {
                let &sequence = parts.header.first().ok_or_else(short)?;
                Ok(Self::Transfer {
                    sequence,
                    info: parts.info,
                })
            }
            LinkPacketType::LinkAck => match parts.header {
                [sequence, credit, ..] => Ok(Self::Ack {
                    sequence: *sequence,
                    credit: *credit,
                }),
                _ => Err(short()),
            },
        }
    }
}

//==================================================================================Construction

/// Constant parameter block opening an LR response.
const LR_PREAMBLE: [u8; 9] = [0x02, 0x01, 0x06, 0x01, 0x00, 0x00, 0x00, 0x00, 0xFF];

/// Link Request response echoing the peer's parameters with the negotiated
/// window.
pub fn link_request_response(params: &LinkRequestParams, window: u8) -> Vec<u8> {
    let mut packet = Vec::with_capacity(24);
    packet.push(23);
    packet.push(LinkPacketType::LinkRequest as u8);
    packet.extend_from_slice(&LR_PREAMBLE);
    packet.extend_from_slice(&[option::FRAMING_MODE, 1, params.framing_mode]);
    packet.extend_from_slice(&[option::MAX_OUTSTANDING, 1, window]);
    packet.extend_from_slice(&[option::MAX_INFO_LENGTH, 2]);
    packet.extend_from_slice(&params.max_info_length);
    packet.extend_from_slice(&[option::DATA_PHASE_OPTIONS, 1, params.data_phase_options]);
    packet
}

/// Link Acknowledgement of `sequence` granting `credit` more transfers.
pub fn link_ack(sequence: u8, credit: u8) -> Vec<u8> {
    Vec::from([3, LinkPacketType::LinkAck as u8, sequence, credit])
}

/// Link Transfer carrying one fragment.
pub fn link_transfer(sequence: u8, info: &[u8]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(info.len() + 3);
    packet.extend_from_slice(&[2, LinkPacketType::LinkTransfer as u8, sequence]);
    packet.extend_from_slice(info);
    packet
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
