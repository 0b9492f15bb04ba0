/// Test doubles: an in-memory serial port, a tokio timer, and a scripted
/// Newton that speaks the wire protocol to the desktop under test.
use newt_dock::{
    core::Event,
    protocol::{
        dock::{DockCommand, DockMessage},
        framing::{encode_frame, FrameParser},
        link::{
            assembler::{DockAssembler, ProcessResult},
            packet::{link_ack, link_transfer, LinkPacket},
        },
        modules::DockModule,
        runtime::{serial_output, Connection},
        transport::traits::{
            dock_timer::DockTimer,
            serial_port::{SerialRead, SerialWrite},
        },
    },
};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep, Duration};

//==================================================================================Serial port

#[derive(Clone)]
#[allow(dead_code)]
/// One end of an in-memory serial cable.
pub struct MockSerial {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<Vec<u8>>>>,
    /// Bytes received but not yet handed to a reader.
    leftover: Arc<Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl MockSerial {
    /// Construct two connected ends (desktop ↔ Newton).
    pub fn create_pair() -> (Self, Self) {
        let (desktop_tx, newton_rx) = mpsc::unbounded_channel();
        let (newton_tx, desktop_rx) = mpsc::unbounded_channel();
        let end = |tx, rx| Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
            leftover: Arc::new(Mutex::new(Vec::new())),
        };
        (end(desktop_tx, desktop_rx), end(newton_tx, newton_rx))
    }

    /// Next chunk written by the other end; `None` once it hung up.
    pub async fn recv_chunk(&self) -> Option<Vec<u8>> {
        self.rx.lock().await.recv().await
    }

    pub fn send_bytes(&self, bytes: &[u8]) {
        self.tx.send(bytes.to_vec()).ok();
    }
}

impl SerialRead for MockSerial {
    type Error = ();

    async fn read<'a>(&'a mut self, buffer: &'a mut [u8]) -> Result<usize, Self::Error> {
        let mut leftover = self.leftover.lock().await;
        if leftover.is_empty() {
            match self.rx.lock().await.recv().await {
                Some(chunk) => *leftover = chunk,
                None => return Ok(0),
            }
        }
        let count = leftover.len().min(buffer.len());
        buffer[..count].copy_from_slice(&leftover[..count]);
        leftover.drain(..count);
        Ok(count)
    }
}

impl SerialWrite for MockSerial {
    type Error = ();

    async fn write<'a>(&'a mut self, data: &'a [u8]) -> Result<(), Self::Error> {
        self.tx.send(data.to_vec()).map_err(|_| ())
    }

    async fn flush<'a>(&'a mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[allow(dead_code)]
/// Timer based on `tokio::time::sleep` to drive keep-alive ticks in tests.
pub struct MockTimer;

impl DockTimer for MockTimer {
    async fn delay_ms(&mut self, millis: u32) {
        sleep(Duration::from_millis(millis as u64)).await;
    }
}

//==================================================================================Scripted Newton

/// Link Request a Newton sends: window 4, 64-byte info, 256-byte option.
pub const NEWTON_LR: [u8; 24] = [
    23, 0x01, 0x02, 0x01, 0x06, 0x01, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x02, 0x01, 0x02, 0x03, 0x01,
    0x04, 0x04, 0x02, 0x00, 0x40, 0x08, 0x01, 0x01,
];

/// Link Disconnect a Newton sends when the user cancels.
pub const NEWTON_LD: [u8; 5] = [0x04, 0x02, 0x01, 0x01, 0xFF];

/// Challenge the scripted Newton hands out.
pub const CHALLENGE: u64 = 0x1122_3344_5566_7788;

/// What the scripted Newton saw on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub enum FromDesktop {
    LinkRequest,
    Disconnect,
    Ack { sequence: u8, credit: u8 },
    /// A transfer, with the Dock message it completed if any.
    Transfer {
        sequence: u8,
        message: Option<DockMessage>,
    },
}

/// Newton side of the link: frames what it sends, parses what it receives.
#[derive(Default)]
#[allow(dead_code)]
pub struct NewtonWire {
    parser: FrameParser,
    assembler: DockAssembler,
    sequence: u8,
}

#[allow(dead_code)]
impl NewtonWire {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link_request(&self) -> Vec<u8> {
        encode_frame(&NEWTON_LR)
    }

    pub fn disconnect(&self) -> Vec<u8> {
        encode_frame(&NEWTON_LD)
    }

    pub fn ack(&self, sequence: u8) -> Vec<u8> {
        encode_frame(&link_ack(sequence, 8))
    }

    /// Next numbered transfer carrying a whole Dock message.
    pub fn transfer(&mut self, command: DockCommand, payload: &[u8]) -> Vec<u8> {
        self.sequence = self.sequence.wrapping_add(1);
        let message = DockMessage::new(command, payload).encode();
        encode_frame(&link_transfer(self.sequence, &message))
    }

    /// Parse serial bytes written by the desktop.
    pub fn read(&mut self, bytes: &[u8]) -> Vec<FromDesktop> {
        let mut seen = Vec::new();
        for &byte in bytes {
            let Ok(Some(payload)) = self.parser.feed(byte) else {
                continue;
            };
            let packet = LinkPacket::parse(&payload).expect("desktop sent a malformed packet");
            seen.push(match packet {
                LinkPacket::Request(_) => FromDesktop::LinkRequest,
                LinkPacket::Disconnect => FromDesktop::Disconnect,
                LinkPacket::Ack { sequence, credit } => FromDesktop::Ack { sequence, credit },
                LinkPacket::Transfer { sequence, info } => FromDesktop::Transfer {
                    sequence,
                    message: match self.assembler.process_fragment(info) {
                        Ok(ProcessResult::MessageComplete(message)) => Some(message),
                        Ok(_) => None,
                        Err(err) => panic!("desktop sent a bad fragment: {err}"),
                    },
                },
            });
        }
        seen
    }
}

/// Synchronous harness: a [`Connection`] wired to a scripted Newton.
#[allow(dead_code)]
pub struct Harness<M: DockModule> {
    pub connection: Connection<M>,
    pub newton: NewtonWire,
}

#[allow(dead_code)]
impl<M: DockModule> Harness<M> {
    pub fn new(connection: Connection<M>) -> Self {
        Self {
            connection,
            newton: NewtonWire::new(),
        }
    }

    /// Feed raw bytes to the desktop and return what it answered, plus the
    /// full event trace.
    pub fn feed(&mut self, bytes: Vec<u8>) -> (Vec<FromDesktop>, Vec<Event>) {
        let trace = self.connection.pump(Event::serial_in(bytes));
        let answered = self.newton.read(&serial_output(&trace));
        (answered, trace)
    }

    /// Bring the link to its data phase.
    pub fn link_up(&mut self) {
        let bytes = self.newton.link_request();
        let (answered, _) = self.feed(bytes);
        assert_eq!(answered, vec![FromDesktop::LinkRequest]);
        let bytes = self.newton.ack(0);
        self.feed(bytes);
    }

    /// Send a Dock message from the Newton and acknowledge every transfer
    /// the desktop sends in response. Returns the Dock messages the desktop
    /// completed, in order.
    pub fn exchange(&mut self, command: DockCommand, payload: &[u8]) -> Vec<DockMessage> {
        let bytes = self.newton.transfer(command, payload);
        let (mut answered, _) = self.feed(bytes);
        let mut messages = Vec::new();
        while let Some(FromDesktop::Transfer { sequence, message }) = answered
            .iter()
            .find(|seen| matches!(seen, FromDesktop::Transfer { .. }))
            .cloned()
        {
            messages.extend(message);
            let bytes = self.newton.ack(sequence);
            answered = self.feed(bytes).0;
        }
        messages
    }

    /// Run the docking handshake up to Hello.
    pub fn dock(&mut self) {
        self.link_up();
        self.exchange(DockCommand::REQUEST_TO_DOCK, &[0, 0, 0, 1]);
        self.exchange(DockCommand::NEWTON_NAME, &newton_name());
        self.exchange(DockCommand::NEWTON_INFO, &newton_info());
        self.exchange(DockCommand::RESULT, &[0; 4]);
        self.exchange(DockCommand::PASSWORD, &[0; 8]);
    }
}

/// Newton-Name payload: a version word followed by the owner name.
#[allow(dead_code)]
pub fn newton_name() -> Vec<u8> {
    let mut payload = vec![0, 0, 0, 0x3C];
    for unit in "Newton".encode_utf16().chain([0]) {
        payload.extend_from_slice(&unit.to_be_bytes());
    }
    payload
}

/// Newton-Info payload carrying [`CHALLENGE`].
#[allow(dead_code)]
pub fn newton_info() -> Vec<u8> {
    let mut payload = vec![0, 0, 0, 10];
    payload.extend_from_slice(&CHALLENGE.to_be_bytes());
    payload
}
