use super::*;
use alloc::vec;

#[test]
/// Header, payload and zero padding to a 4-byte boundary.
fn test_encode_pads_payload() {
    let message = DockMessage::new(DockCommand::from_fourcc(b"test"), [0xAA, 0xBB, 0xCC]);
    assert_eq!(
        message.encode(),
        vec![
            b'n', b'e', b'w', b't', b'd', b'o', b'c', b'k', b't', b'e', b's', b't', 0x00, 0x00,
            0x00, 0x03, 0xAA, 0xBB, 0xCC, 0x00,
        ]
    );
    assert_eq!(message.encoded_len(), 20);
}

#[test]
/// Empty and already aligned payloads get no padding.
fn test_encode_without_padding() {
    assert_eq!(DockMessage::empty(DockCommand::HELLO).encode().len(), 16);
    assert_eq!(
        DockMessage::with_u32(DockCommand::RESULT, 0).encode().len(),
        20
    );
}

#[test]
/// Padding rounds up to four and saturates at the top of the range.
fn test_padded_len() {
    assert_eq!(padded_len(0), 0);
    assert_eq!(padded_len(1), 4);
    assert_eq!(padded_len(4), 4);
    assert_eq!(padded_len(u32::MAX as usize), (u32::MAX as usize).saturating_add(3) & !3);
    assert_eq!(padded_len(usize::MAX), usize::MAX & !3);
    assert_eq!(padded_len(usize::MAX - 3), usize::MAX & !3);
}

#[test]
/// Decoding truncates to the declared length and drops the padding.
fn test_decode_truncates_padding() {
    let encoded = DockMessage::new(DockCommand::STORE_NAMES, [1, 2, 3, 4, 5]).encode();
    assert_eq!(encoded.len(), 24);
    let decoded = DockMessage::decode(&encoded).unwrap();
    assert_eq!(decoded.command, DockCommand::STORE_NAMES);
    assert_eq!(decoded.payload, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_decode_errors() {
    assert_eq!(
        DockMessage::decode(b"newtdock"),
        Err(DockError::TruncatedHeader(8))
    );
    assert_eq!(
        DockMessage::decode(b"newtdocxhelo\0\0\0\0"),
        Err(DockError::BadMagic)
    );
    assert_eq!(
        DockMessage::decode(b"newtdockhelo\0\0\0\x08abcd"),
        Err(DockError::TruncatedPayload {
            declared: 8,
            available: 4
        })
    );
}

#[test]
fn test_leading_u32() {
    let result = DockMessage::with_u32(DockCommand::RESULT, 0xFFFF_D8F1);
    assert_eq!(result.leading_u32(), Ok(0xFFFF_D8F1));
    assert_eq!(
        DockMessage::new(DockCommand::RESULT, [0, 0]).leading_u32(),
        Err(DockError::ShortPayload {
            command: DockCommand::RESULT,
            len: 2
        })
    );
}

#[test]
/// Four-character codes print as text, internal signals by number.
fn test_command_display() {
    assert_eq!(alloc::format!("{}", DockCommand::REQUEST_TO_DOCK), "rtdk");
    assert_eq!(alloc::format!("{}", DockCommand::APP_CONNECTED), "app:17");
    assert_eq!(DockCommand::REQUEST_TO_DOCK.0, 0x7274_646b);
    assert!(DockCommand::APP_QUIT.is_internal());
    assert!(!DockCommand::HELLO.is_internal());
}
