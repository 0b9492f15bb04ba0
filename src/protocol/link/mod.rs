//! MNP reliable link layer.
//!
//! Negotiates link parameters with the peer, acknowledges every inbound Link
//! Transfer, reassembles Dock messages from their fragments, and fragments
//! outbound Dock messages into numbered transfers that stay outstanding until
//! the peer acknowledges them.
//!
//! Flow control follows the peer's credit: at most `window` transfers are in
//! flight, further fragments wait in a pending queue. Unacknowledged
//! transfers are sent again when the peer repeats its last acknowledgement or
//! after a configurable number of keep-alive ticks without progress.
use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::core::{Direction, Event};
use crate::protocol::dock::command::DockCommand;
use crate::protocol::dock::message::DockMessage;

pub mod assembler;
pub mod builder;
pub mod packet;

use assembler::{DockAssembler, ProcessResult};
use builder::{OutstandingPacket, TransferBuilder};
use packet::{link_ack, link_request_response, LinkPacket, LinkRequestParams};

//==================================================================================Configuration

/// Credit granted to the peer in every acknowledgement.
pub const DEFAULT_ACK_CREDIT: u8 = 8;

/// Keep-alive ticks without acknowledgement progress before retransmitting.
pub const DEFAULT_RETRANSMIT_TICKS: u8 = 2;

/// Link tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Force a window of one transfer regardless of what the peer offers.
    pub reduced_window: bool,
    /// Credit advertised in outbound acknowledgements.
    pub ack_credit: u8,
    /// Ticks without progress before outstanding transfers are resent;
    /// zero disables tick-driven retransmission.
    pub retransmit_after_ticks: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkConfig {
    pub const fn new() -> Self {
        Self {
            reduced_window: true,
            ack_credit: DEFAULT_ACK_CREDIT,
            retransmit_after_ticks: DEFAULT_RETRANSMIT_TICKS,
        }
    }

    pub const fn with_reduced_window(mut self, reduced_window: bool) -> Self {
        self.reduced_window = reduced_window;
        self
    }

    pub const fn with_ack_credit(mut self, ack_credit: u8) -> Self {
        self.ack_credit = ack_credit;
        self
    }

    pub const fn with_retransmit_after_ticks(mut self, ticks: u8) -> Self {
        self.retransmit_after_ticks = ticks;
        self
    }
}

//==================================================================================State

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    Idle,
    /// Our LR response is out, waiting for the peer's first acknowledgement.
    LinkRequest,
    DataPhase,
    /// A Dock disconnect has been queued; waiting for the peer to drop the link.
    Disconnecting,
}

/// Link layer state machine.
#[derive(Debug, Clone)]
pub struct LinkLayer {
    config: LinkConfig,
    state: LinkState,
    window: u8,
    max_info_length: usize,
    /// Number of the last transfer we assigned.
    local_sequence: u8,
    /// Number of the last transfer received from the peer.
    peer_sequence: u8,
    /// `false` until the first transfer of the link has been received.
    peer_sequence_valid: bool,
    /// Last sequence number the peer acknowledged.
    last_acked: u8,
    /// Transfers we may still send before the next acknowledgement.
    send_credit: u8,
    /// Sent, not yet acknowledged, in ascending sequence order.
    outstanding: Vec<OutstandingPacket>,
    /// Numbered, not yet sent.
    pending: VecDeque<OutstandingPacket>,
    assembler: DockAssembler,
    /// Keep-alive ticks since the last acknowledgement progress.
    stalled_ticks: u8,
}

impl Default for LinkLayer {
    fn default() -> Self {
        Self::new(LinkConfig::new())
    }
}

impl LinkLayer {
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            state: LinkState::Idle,
            window: 1,
            max_info_length: packet::FALLBACK_INFO_LENGTH,
            local_sequence: 0,
            peer_sequence: 0,
            peer_sequence_valid: false,
            last_acked: 0,
            send_credit: 0,
            outstanding: Vec::new(),
            pending: VecDeque::new(),
            assembler: DockAssembler::new(),
            stalled_ticks: 0,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Negotiated number of transfers allowed in flight.
    pub fn window(&self) -> u8 {
        self.window
    }

    pub fn max_info_length(&self) -> usize {
        self.max_info_length
    }

    pub fn send_credit(&self) -> u8 {
        self.send_credit
    }

    /// Sent transfers awaiting acknowledgement.
    pub fn outstanding(&self) -> &[OutstandingPacket] {
        &self.outstanding
    }

    /// Transfers waiting for credit.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Return to `Idle`, dropping every transfer and partial message.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    //==================================================================================Event processing
    pub fn process(&mut self, event: &Event, out: &mut Vec<Event>) {
        match event {
            Event::Link {
                direction: Direction::In,
                data,
            } => self.process_in(data, out),
            Event::Dock {
                direction: Direction::Out,
                message,
            } => self.process_out(message, out),
            Event::KeepAlive => self.keep_alive(out),
            quit if quit.is_quit() => self.reset(),
            _ => {}
        }
    }

    fn process_in(&mut self, data: &[u8], out: &mut Vec<Event>) {
        let packet = match LinkPacket::parse(data) {
            Ok(packet) => packet,
            Err(err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("link: dropped packet: {}", defmt::Debug2Format(&err));
                out.push(Event::LinkFault(err));
                return;
            }
        };

        use LinkState::*;
        match (self.state, packet) {
            (Idle | LinkRequest, LinkPacket::Request(params)) => self.negotiate(&params, out),
            (Idle, _) => {}
            (LinkRequest, LinkPacket::Ack { .. }) => {
                #[cfg(feature = "defmt")]
                defmt::info!(
                    "link: data phase, window {}, max info {}",
                    self.window,
                    self.max_info_length
                );
                self.state = DataPhase;
            }
            (LinkRequest, LinkPacket::Disconnect | LinkPacket::Transfer { .. }) => self.reset(),
            (DataPhase | Disconnecting, LinkPacket::Request(_)) => self.reset(),
            (DataPhase | Disconnecting, LinkPacket::Ack { sequence, credit }) => {
                self.handle_ack(sequence, credit, out)
            }
            (DataPhase | Disconnecting, LinkPacket::Disconnect) => {
                #[cfg(feature = "defmt")]
                defmt::info!("link: peer disconnected");
                self.reset();
                out.push(Event::quit());
            }
            (DataPhase | Disconnecting, LinkPacket::Transfer { sequence, info }) => {
                self.handle_transfer(sequence, info, out)
            }
        }
    }

    /// Answer a Link Request and size the link to the agreed parameters.
    /// A repeated request in `LinkRequest` is answered again.
    fn negotiate(&mut self, params: &LinkRequestParams, out: &mut Vec<Event>) {
        self.reset();
        self.window = if self.config.reduced_window {
            1
        } else {
            params.max_outstanding.max(1)
        };
        self.max_info_length = params.negotiated_info_length();
        self.send_credit = self.window;
        self.outstanding = Vec::with_capacity(usize::from(self.window));
        self.state = LinkState::LinkRequest;
        out.push(link_out(link_request_response(params, self.window)));
    }

    fn handle_ack(&mut self, sequence: u8, credit: u8, out: &mut Vec<Event>) {
        let progressed = self.release_acknowledged(sequence);
        let repeated = !progressed && sequence == self.last_acked && !self.outstanding.is_empty();
        self.last_acked = sequence;

        let in_flight = self.outstanding.len() as u8;
        self.send_credit = credit.min(self.window).saturating_sub(in_flight);

        if progressed {
            self.stalled_ticks = 0;
        }
        if repeated {
            self.retransmit(out);
        }
        self.flush_pending(out);
    }

    /// Drop every outstanding transfer up to and including `sequence`.
    /// Scans from the newest entry so wrapped numbers resolve to the most
    /// recent match.
    fn release_acknowledged(&mut self, sequence: u8) -> bool {
        match self
            .outstanding
            .iter()
            .rposition(|packet| packet.sequence == sequence)
        {
            Some(index) => {
                self.outstanding.drain(..=index);
                true
            }
            None => false,
        }
    }

    fn handle_transfer(&mut self, sequence: u8, info: &[u8], out: &mut Vec<Event>) {
        out.push(link_out(link_ack(sequence, self.config.ack_credit)));
        if self.peer_sequence_valid && sequence == self.peer_sequence {
            // Peer resent a transfer whose acknowledgement it missed.
            return;
        }
        self.peer_sequence = sequence;
        self.peer_sequence_valid = true;

        match self.assembler.process_fragment(info) {
            Ok(ProcessResult::MessageComplete(message)) => out.push(Event::Dock {
                direction: Direction::In,
                message,
            }),
            Ok(ProcessResult::FragmentConsumed | ProcessResult::Ignored) => {}
            Err(err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("link: reassembly failed: {}", defmt::Debug2Format(&err));
                out.push(Event::LinkFault(err));
            }
        }
    }

    fn process_out(&mut self, message: &DockMessage, out: &mut Vec<Event>) {
        if message.command.is_internal() {
            return;
        }
        if !matches!(self.state, LinkState::DataPhase | LinkState::Disconnecting) {
            #[cfg(feature = "defmt")]
            defmt::warn!("link: no data phase, dropping {}", message.command);
            return;
        }
        let encoded = message.encode();
        for packet in TransferBuilder::new(&encoded, self.max_info_length, self.local_sequence)
            .build()
        {
            self.local_sequence = packet.sequence;
            self.pending.push_back(packet);
        }
        if message.command == DockCommand::DISCONNECT {
            self.state = LinkState::Disconnecting;
        }
        self.flush_pending(out);
    }

    /// Send pending transfers while credit lasts.
    fn flush_pending(&mut self, out: &mut Vec<Event>) {
        while self.send_credit > 0 {
            let Some(packet) = self.pending.pop_front() else {
                break;
            };
            out.push(link_out(packet.data.clone()));
            self.outstanding.push(packet);
            self.send_credit -= 1;
        }
    }

    fn retransmit(&mut self, out: &mut Vec<Event>) {
        #[cfg(feature = "defmt")]
        defmt::debug!("link: retransmitting {} transfers", self.outstanding.len());
        for packet in &self.outstanding {
            out.push(link_out(packet.data.clone()));
        }
        self.stalled_ticks = 0;
    }

    fn keep_alive(&mut self, out: &mut Vec<Event>) {
        if self.state != LinkState::DataPhase && self.state != LinkState::Disconnecting {
            return;
        }
        out.push(link_out(link_ack(self.peer_sequence, self.config.ack_credit)));
        if self.outstanding.is_empty() || self.config.retransmit_after_ticks == 0 {
            return;
        }
        self.stalled_ticks = self.stalled_ticks.saturating_add(1);
        if self.stalled_ticks >= self.config.retransmit_after_ticks {
            self.retransmit(out);
        }
    }
}

fn link_out(data: Vec<u8>) -> Event {
    Event::Link {
        direction: Direction::Out,
        data,
    }
}
