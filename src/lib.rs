//! `newt-dock` library: the protocol stack a desktop host needs to talk to an
//! Apple Newton over a serial line. The crate exposes the infrastructure
//! codecs (byte cursor, CRC16, NSOF), the protocol layers (framing, MNP link,
//! Dock session, application modules) and an async runtime that glues them to
//! a serial port, all in a `no_std` + `alloc` environment.
#![no_std]
extern crate alloc;
//==================================================================================
/// Event and direction types shared by every layer.
pub mod core;
/// Framing, link, session, codec and runtime errors.
pub mod error;
/// Byte-level codecs: big-endian cursor, CRC16 and the NSOF object format.
pub mod infra;
/// Newton Dock protocol implementation: framing, MNP link, Dock session,
/// application modules, transport traits and the connection runtime.
pub mod protocol;
//==================================================================================
