//! CRC-16 used to protect MNP frames.
//!
//! Reflected polynomial `0xA001` (CRC-16/ARC), initial value zero, no final
//! XOR. The checksum covers the unescaped payload plus the closing ETX and is
//! transmitted low byte first.

/// Byte-wise lookup table, built at compile time.
const TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut index = 0;
    while index < 256 {
        let mut crc = index as u16;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xA001
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[index] = crc;
        index += 1;
    }
    table
}

/// Fold one byte into a running checksum.
pub const fn crc16(byte: u8, crc: u16) -> u16 {
    (crc >> 8) ^ TABLE[((crc ^ byte as u16) & 0xFF) as usize]
}

/// Fold a whole slice into `crc`.
pub fn crc16_slice(bytes: &[u8], crc: u16) -> u16 {
    bytes.iter().fold(crc, |acc, &byte| crc16(byte, acc))
}
