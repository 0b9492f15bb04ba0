//! ByteReader / ByteWriter edge cases.
use super::*;

#[test]
/// Sequential big-endian reads across primitive widths.
fn test_read_big_endian_fields() {
    let data = [
        0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0xFE,
    ];
    let mut reader = ByteReader::new(&data);
    assert_eq!(reader.read_u16_be().unwrap(), 0x1234);
    assert_eq!(reader.read_u32_be().unwrap(), 0x5678_9ABC);
    assert_eq!(reader.read_u64_be().unwrap(), 0x1122_3344_5566_7788);
    assert_eq!(reader.read_u8().unwrap(), 0xFE);
    assert!(reader.is_empty());
    assert_eq!(reader.position(), data.len());
}

#[test]
/// Out-of-bounds reads report what was asked and what was left, and do not
/// move the cursor.
fn test_read_out_of_bounds() {
    let data = [0x01, 0x02, 0x03];
    let mut reader = ByteReader::new(&data);
    reader.read_u8().unwrap();
    assert_eq!(
        reader.read_u32_be(),
        Err(ByteReaderError::OutOfBounds {
            asked: 4,
            available: 2
        })
    );
    assert_eq!(reader.remaining(), 2);
    assert_eq!(reader.read_slice(2).unwrap(), &[0x02, 0x03]);
    assert!(reader.peek_u8().is_err());
}

#[test]
/// Short XLongs occupy one byte, everything else takes the escape form.
fn test_xlong_forms() {
    let mut writer = ByteWriter::new();
    writer.write_xlong(0);
    writer.write_xlong(254);
    writer.write_xlong(255);
    writer.write_xlong(-1);
    writer.write_xlong(0x0102_0304);
    assert_eq!(
        writer.as_slice(),
        &[
            0x00, 0xFE, 0xFF, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01,
            0x02, 0x03, 0x04
        ]
    );

    let bytes = writer.into_inner();
    let mut reader = ByteReader::new(&bytes);
    assert_eq!(reader.read_xlong().unwrap(), 0);
    assert_eq!(reader.read_xlong().unwrap(), 254);
    assert_eq!(reader.read_xlong().unwrap(), 255);
    assert_eq!(reader.read_xlong().unwrap(), -1);
    assert_eq!(reader.read_xlong().unwrap(), 0x0102_0304);
}

#[test]
/// An escape byte without its four trailing bytes is truncated input.
fn test_xlong_truncated() {
    let mut reader = ByteReader::new(&[0xFF, 0x00, 0x01]);
    assert!(matches!(
        reader.read_xlong(),
        Err(ByteReaderError::OutOfBounds { asked: 4, .. })
    ));
}

#[test]
fn test_xlong_len() {
    assert_eq!(xlong_len(0), 1);
    assert_eq!(xlong_len(254), 1);
    assert_eq!(xlong_len(255), 5);
    assert_eq!(xlong_len(-7), 5);
}
