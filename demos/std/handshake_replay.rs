//! # Handshake replay
//!
//! Replay a docking handshake against a [`Connection`] without any serial
//! port: the Newton side is a fixed script of link packets, and every event
//! the pipeline produces is printed as it happens.
//!
//! ```bash
//! cargo run --example handshake_replay
//! ```

use newt_dock::core::{Direction, Event};
use newt_dock::protocol::dock::{DockCommand, DockMessage};
use newt_dock::protocol::framing::encode_frame;
use newt_dock::protocol::link::packet::{link_ack, link_transfer};
use newt_dock::protocol::modules::InfoModule;
use newt_dock::protocol::runtime::{serial_output, Connection, ConnectionConfig};

/// Link Request as a Newton sends it.
const NEWTON_LR: [u8; 24] = [
    23, 0x01, 0x02, 0x01, 0x06, 0x01, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x02, 0x01, 0x02, 0x03, 0x01,
    0x04, 0x04, 0x02, 0x00, 0x40, 0x08, 0x01, 0x01,
];

fn describe(event: &Event) -> String {
    match event {
        Event::Serial { direction, data } => format!("serial {direction:?} {} bytes", data.len()),
        Event::Link { direction, data } => {
            format!("link   {direction:?} {:02X?}", &data[..data.len().min(8)])
        }
        Event::Dock { direction, message } => format!(
            "dock   {direction:?} {} ({} bytes)",
            message.command,
            message.payload.len()
        ),
        other => format!("{other:?}"),
    }
}

fn main() {
    let mut connection = Connection::new(ConnectionConfig::new(), InfoModule::new());

    let mut newton_info = vec![0, 0, 0, 10];
    newton_info.extend_from_slice(&0x1122_3344_5566_7788u64.to_be_bytes());
    let mut newton_name = vec![0, 0, 0, 0x3C];
    for unit in "Replay".encode_utf16().chain([0]) {
        newton_name.extend_from_slice(&unit.to_be_bytes());
    }

    let script: Vec<(DockCommand, Vec<u8>)> = vec![
        (DockCommand::REQUEST_TO_DOCK, vec![0, 0, 0, 1]),
        (DockCommand::NEWTON_NAME, newton_name),
        (DockCommand::NEWTON_INFO, newton_info),
        (DockCommand::RESULT, vec![0; 4]),
        (DockCommand::PASSWORD, vec![0; 8]),
        (DockCommand::HELLO, Vec::new()),
    ];

    println!("== link request");
    let mut packets = vec![NEWTON_LR.to_vec(), link_ack(0, 8)];
    for (i, (command, payload)) in script.into_iter().enumerate() {
        let sequence = i as u8 + 1;
        packets.push(link_transfer(
            sequence,
            &DockMessage::new(command, payload).encode(),
        ));
        // Acknowledge the desktop's answer, which carries the same number.
        packets.push(link_ack(sequence, 8));
    }

    let mut written = 0usize;
    for packet in packets {
        let trace = connection.pump(Event::serial_in(encode_frame(&packet)));
        for event in &trace {
            if !matches!(event, Event::Serial { direction: Direction::In, .. }) {
                println!("  {}", describe(event));
            }
        }
        written += serial_output(&trace).len();
    }

    println!("\n== final state");
    println!("  link:    {:?}", connection.link().state());
    println!("  session: {:?}", connection.dock().state());
    println!("  module:  {:?}", connection.module().state());
    println!("  desktop wrote {written} bytes");
}
