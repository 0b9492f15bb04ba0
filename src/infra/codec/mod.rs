//! Byte-level codecs used by the link and session layers.
/// Big-endian byte cursor and XLong helpers.
pub mod bytes;
/// CRC-16 used by MNP framing.
pub mod crc16;
/// Newton Streamed Object Format.
pub mod nsof;
