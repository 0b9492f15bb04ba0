use super::*;

/// Link Request as sent by a Newton: framing mode 2, window 4,
/// max info 64, data phase options 3.
const NEWTON_LR: [u8; 24] = [
    23, 0x01, 0x02, 0x01, 0x06, 0x01, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x02, 0x01, 0x02, 0x03, 0x01,
    0x04, 0x04, 0x02, 0x00, 0x40, 0x08, 0x01, 0x03,
];

#[test]
/// Options are found by type, whatever their position.
fn test_parse_link_request() {
    let LinkPacket::Request(params) = LinkPacket::parse(&NEWTON_LR).unwrap() else {
        panic!("expected a link request");
    };
    assert_eq!(
        params,
        LinkRequestParams {
            framing_mode: 2,
            max_outstanding: 4,
            max_info_length: [0x00, 0x40],
            data_phase_options: 3,
        }
    );
    assert_eq!(params.negotiated_info_length(), LARGE_INFO_LENGTH);
}

#[test]
/// Without the 256-byte option the announced length applies; a missing one
/// falls back to the minimum.
fn test_negotiated_info_length() {
    let announced = LinkRequestParams {
        max_info_length: [0x00, 0x40],
        ..Default::default()
    };
    assert_eq!(announced.negotiated_info_length(), 64);
    let silent = LinkRequestParams::default();
    assert_eq!(silent.negotiated_info_length(), FALLBACK_INFO_LENGTH);
}

#[test]
/// Truncated option lists keep what was parsed before the cut.
fn test_parse_truncated_options() {
    let params = LinkRequestParams::parse(&[0x02, 0x03, 0x01, 0x05, 0x04, 0x02, 0x01]);
    assert_eq!(params.max_outstanding, 5);
    assert_eq!(params.max_info_length, [0, 0]);
}

#[test]
/// The response echoes the request with the negotiated window.
fn test_link_request_response() {
    let LinkPacket::Request(params) = LinkPacket::parse(&NEWTON_LR).unwrap() else {
        panic!("expected a link request");
    };
    assert_eq!(
        link_request_response(&params, 1),
        [
            23, 0x01, 0x02, 0x01, 0x06, 0x01, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x02, 0x01, 0x02,
            0x03, 0x01, 0x01, 0x04, 0x02, 0x00, 0x40, 0x08, 0x01, 0x03,
        ]
    );
}

#[test]
fn test_parse_transfer_and_ack() {
    assert_eq!(
        LinkPacket::parse(&[0x02, 0x04, 0x07, 0xAA, 0xBB]).unwrap(),
        LinkPacket::Transfer {
            sequence: 7,
            info: &[0xAA, 0xBB],
        }
    );
    assert_eq!(
        LinkPacket::parse(&link_ack(3, 8)).unwrap(),
        LinkPacket::Ack {
            sequence: 3,
            credit: 8
        }
    );
    assert_eq!(
        LinkPacket::parse(&[0x04, 0x02, 0x01, 0x01, 0xFF]).unwrap(),
        LinkPacket::Disconnect
    );
}

#[test]
fn test_parse_errors() {
    assert_eq!(
        LinkPacket::parse(&[0x02, 0x09, 0x00]),
        Err(LinkError::UnknownPacketType(0x09))
    );
    assert_eq!(
        LinkPacket::parse(&[0x02, 0x05, 0x01]),
        Err(LinkError::ShortHeader { packet_type: 0x05 })
    );
    assert_eq!(
        LinkPacket::parse(&[0x01, 0x04]),
        Err(LinkError::ShortHeader { packet_type: 0x04 })
    );
    assert!(matches!(LinkPacket::parse(&[]), Err(LinkError::Frame(_))));
}

#[test]
fn test_link_transfer_layout() {
    assert_eq!(link_transfer(9, b"newt"), [2, 4, 9, b'n', b'e', b'w', b't']);
}
