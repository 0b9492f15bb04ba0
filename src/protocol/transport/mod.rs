//! Physical side of a Dock connection: the serial port and timer
//! abstractions the async runner is generic over.
//!
//! The library ships no serial driver. Firmware or host code wraps its UART
//! or tty in [`SerialRead`](traits::serial_port::SerialRead) /
//! [`SerialWrite`](traits::serial_port::SerialWrite) and provides a
//! [`DockTimer`](traits::dock_timer::DockTimer).
pub mod traits;

/// Interval between keep-alive ticks (ms).
///
/// Every tick re-acknowledges the last received transfer so the Newton does
/// not time the link out while the desktop has nothing to send, and counts
/// towards retransmission of unacknowledged transfers.
pub const KEEP_ALIVE_INTERVAL_MS: u32 = 3000;

/// Size of the buffer the serial reader fills per read.
pub const SERIAL_READ_CHUNK: usize = 256;
