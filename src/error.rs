//! Error definitions shared across library modules.
//! Each type models the failures of one layer (framing, link, session,
//! codecs, application modules, runtime).
use crate::protocol::dock::command::DockCommand;
use thiserror_no_std::Error;

//================================================================================FRAMING_ERROR

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Faults detected while delimiting a frame on the serial byte stream.
pub enum FrameError {
    /// The trailing CRC does not match the bytes received.
    #[error("CRC mismatch: computed {computed:#06x}, received {received:#06x}")]
    CrcMismatch { computed: u16, received: u16 },
    /// An escape byte was followed by something other than DLE or ETX.
    #[error("Unexpected byte {0:#04x} after DLE")]
    UnexpectedEscape(u8),
    /// A frame carried no packet type.
    #[error("Empty frame")]
    EmptyFrame,
    /// An extended header length was cut short.
    #[error("Header needs {declared} bytes but only {available} are available")]
    TruncatedHeader { declared: usize, available: usize },
}

//================================================================================LINK_ERROR

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Faults raised by the MNP link layer.
pub enum LinkError {
    /// Frame payload could not be split into header and information field.
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// The packet type byte is not one the link layer understands.
    #[error("Unknown link packet type {0:#04x}")]
    UnknownPacketType(u8),
    /// A packet header was shorter than its type requires.
    #[error("Link packet type {packet_type:#04x} header too short")]
    ShortHeader { packet_type: u8 },
    /// A reassembled Dock message did not start with a valid header.
    #[error(transparent)]
    Dock(#[from] DockError),
    /// More bytes arrived than the declared Dock length plus padding allows.
    #[error("Reassembly overflow: declared {declared} bytes, received {received}")]
    ReassemblyOverflow { declared: usize, received: usize },
}

//================================================================================DOCK_ERROR

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Faults raised while decoding a Dock message.
pub enum DockError {
    /// Fewer than 16 bytes were available for the header.
    #[error("Dock header truncated: {0} bytes")]
    TruncatedHeader(usize),
    /// The header does not start with `newtdock`.
    #[error("Bad Dock magic")]
    BadMagic,
    /// The header declares more payload than the buffer holds.
    #[error("Dock payload truncated: declared {declared}, available {available}")]
    TruncatedPayload { declared: usize, available: usize },
    /// A payload that must carry fields was too short.
    #[error("Payload of {command} too short: {len} bytes")]
    ShortPayload { command: DockCommand, len: usize },
    /// An inbound header carried a command reserved for local signals.
    #[error("Reserved command {0} received from the Newton")]
    InternalCommand(DockCommand),
}

//================================================================================CODEC_ERROR

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Failures while reading from a byte buffer.
pub enum ByteReaderError {
    /// Requested more bytes than the buffer contains.
    #[error("Out of bounds: asked for {asked} bytes, only {available} available")]
    OutOfBounds { asked: usize, available: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Failures while decoding an NSOF stream.
pub enum NsofError {
    /// Input ended before the object was complete.
    #[error("Truncated NSOF input: {0}")]
    Truncated(#[from] ByteReaderError),
    /// Stream did not start with the expected version byte.
    #[error("Unsupported NSOF version {0}")]
    UnsupportedVersion(u8),
    /// Tag byte outside the known set.
    #[error("Unknown NSOF tag {0}")]
    UnknownTag(u8),
    /// Immediate value matching none of the immediate encodings.
    #[error("Unknown NSOF immediate {0:#x}")]
    UnknownImmediate(i32),
    /// Precedent index beyond the objects registered so far.
    #[error("Precedent {index} out of range ({registered} objects registered)")]
    PrecedentOutOfRange { index: i32, registered: usize },
    /// A count or byte length decoded as a negative number.
    #[error("Invalid NSOF length {0}")]
    InvalidLength(i32),
    /// Large binaries reference external stores and are not decoded.
    #[error("Large binary objects are not supported")]
    UnsupportedLargeBinary,
    /// Nesting deeper than the decoder allows.
    #[error("NSOF nesting deeper than {0}")]
    TooDeep(usize),
    /// Expanding shared objects into a tree would exceed the node budget.
    #[error("NSOF tree larger than {0} nodes")]
    ExpansionLimit(usize),
    /// The decoded value does not have the shape a conversion expects.
    #[error("Unexpected NSOF value: expected {0}")]
    UnexpectedValue(&'static str),
}

//================================================================================MODULE_ERROR

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Failures raised by application modules while handling Dock traffic.
pub enum ModuleError {
    /// NSOF payload from the Newton could not be decoded.
    #[error(transparent)]
    Nsof(#[from] NsofError),
    /// The Newton sent a payload missing a field the module needs.
    #[error(transparent)]
    Dock(#[from] DockError),
    /// The Newton reported a non-zero result code.
    #[error("Newton returned error {code} to {command}")]
    Rejected { command: DockCommand, code: i32 },
}

//================================================================================RUN_ERROR

#[derive(Error, Debug)]
/// Errors bubbling out of the connection runtime.
pub enum RunError<R: core::fmt::Debug, W: core::fmt::Debug> {
    /// Serial port read failed.
    #[error("Serial read error: {0:?}")]
    Read(R),
    /// Serial port write failed.
    #[error("Serial write error: {0:?}")]
    Write(W),
}
