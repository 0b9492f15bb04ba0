//! Link Transfer generator: cuts an encoded Dock message into information
//! fields no longer than the negotiated maximum and numbers them.
use alloc::vec::Vec;

use super::packet::link_transfer;

/// Sequenced Link Transfer ready to be sent or retransmitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutstandingPacket {
    pub sequence: u8,
    /// Complete link payload (`[2, LT, seq, info...]`).
    pub data: Vec<u8>,
}

#[derive(Debug)]
/// Parameters shared by all transfers of one message.
pub struct TransferBuilder<'a> {
    payload: &'a [u8],
    max_info_length: usize,
    last_sequence: u8,
}

/// Lazy iterator yielding transfers one by one.
pub struct TransferIterator<'a> {
    builder: TransferBuilder<'a>,
    bytes_sent: usize,
}

impl<'a> TransferBuilder<'a> {
    /// `last_sequence` is the number of the previous transfer; the first
    /// fragment gets the next one.
    pub fn new(payload: &'a [u8], max_info_length: usize, last_sequence: u8) -> Self {
        Self {
            payload,
            max_info_length: max_info_length.max(1),
            last_sequence,
        }
    }

    pub fn build(self) -> TransferIterator<'a> {
        TransferIterator {
            builder: self,
            bytes_sent: 0,
        }
    }
}

impl Iterator for TransferIterator<'_> {
    type Item = OutstandingPacket;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = &self.builder.payload[self.bytes_sent..];
        if remaining.is_empty() {
            return None;
        }
        let chunk = &remaining[..remaining.len().min(self.builder.max_info_length)];
        self.bytes_sent += chunk.len();
        self.builder.last_sequence = self.builder.last_sequence.wrapping_add(1);
        Some(OutstandingPacket {
            sequence: self.builder.last_sequence,
            data: link_transfer(self.builder.last_sequence, chunk),
        })
    }
}
