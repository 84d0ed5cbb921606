//! Tests for the wire protocol codec
//!
//! These tests verify:
//! - Command encode/decode round-trips for every opcode
//! - Response encode/decode round-trips for every status
//! - Frame validation (short headers, oversized payloads, unknown tags)
//! - GET and LIST_KEYS payload helpers
//! - Stream-based read/write helpers

use std::io::Cursor;

use bytes::Bytes;
use lwwkv::protocol::{
    decode_command, decode_get_payload, decode_key_list, decode_response, encode_command,
    encode_get_payload, encode_key_list, encode_response, read_command, read_response,
    write_command, write_response, Command, CommandType, Response, Status, HEADER_SIZE,
    MAX_PAYLOAD_SIZE,
};

// =============================================================================
// Command Round-trip Tests
// =============================================================================

#[test]
fn test_get_command_round_trip() {
    let bytes = encode_command(&Command::Get {
        key: "mykey".to_string(),
    });

    match decode_command(&bytes).unwrap() {
        Command::Get { key } => assert_eq!(key, "mykey"),
        other => panic!("wrong command: {:?}", other),
    }
}

#[test]
fn test_put_command_round_trip() {
    let bytes = encode_command(&Command::Put {
        key: "k".to_string(),
        value: Bytes::from_static(b"payload bytes"),
        version: -12345,
    });

    match decode_command(&bytes).unwrap() {
        Command::Put { key, value, version } => {
            assert_eq!(key, "k");
            assert_eq!(value, Bytes::from_static(b"payload bytes"));
            assert_eq!(version, -12345);
        }
        other => panic!("wrong command: {:?}", other),
    }
}

#[test]
fn test_update_command_keeps_distinct_opcode() {
    let command = Command::Update {
        key: "k".to_string(),
        value: Bytes::from_static(b"v"),
        version: 1,
    };
    assert_eq!(command.command_type(), CommandType::Update);

    let bytes = encode_command(&command);
    assert!(matches!(
        decode_command(&bytes).unwrap(),
        Command::Update { .. }
    ));
}

#[test]
fn test_delete_list_ping_round_trips() {
    let bytes = encode_command(&Command::Delete {
        key: "gone".to_string(),
    });
    assert!(matches!(
        decode_command(&bytes).unwrap(),
        Command::Delete { key } if key == "gone"
    ));

    let bytes = encode_command(&Command::ListKeys);
    assert!(matches!(decode_command(&bytes).unwrap(), Command::ListKeys));

    let bytes = encode_command(&Command::Ping);
    assert!(matches!(decode_command(&bytes).unwrap(), Command::Ping));
}

#[test]
fn test_put_with_empty_value() {
    let bytes = encode_command(&Command::Put {
        key: "k".to_string(),
        value: Bytes::new(),
        version: 0,
    });

    match decode_command(&bytes).unwrap() {
        Command::Put { value, .. } => assert!(value.is_empty()),
        other => panic!("wrong command: {:?}", other),
    }
}

// =============================================================================
// Frame Validation Tests
// =============================================================================

#[test]
fn test_decode_incomplete_header() {
    assert!(decode_command(&[0x01, 0x00]).is_err());
}

#[test]
fn test_decode_unknown_command_type() {
    let mut bytes = vec![0xee];
    bytes.extend_from_slice(&0u32.to_be_bytes());
    assert!(decode_command(&bytes).is_err());
}

#[test]
fn test_decode_oversized_payload_rejected() {
    let mut bytes = vec![0x01];
    bytes.extend_from_slice(&(MAX_PAYLOAD_SIZE + 1).to_be_bytes());
    assert!(decode_command(&bytes).is_err());
}

#[test]
fn test_decode_truncated_payload() {
    let mut bytes = vec![0x01];
    bytes.extend_from_slice(&100u32.to_be_bytes());
    bytes.extend_from_slice(&[0u8; 10]);
    assert!(decode_command(&bytes).is_err());
}

#[test]
fn test_put_missing_version_rejected() {
    // key_len + key but no version bytes
    let mut payload = Vec::new();
    payload.extend_from_slice(&1u32.to_be_bytes());
    payload.push(b'k');

    let mut bytes = vec![0x02];
    bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&payload);

    assert!(decode_command(&bytes).is_err());
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_response_round_trips() {
    let bytes = encode_response(&Response::ok(Some(b"Saved.".to_vec())));
    let decoded = decode_response(&bytes).unwrap();
    assert_eq!(decoded.status, Status::Ok);
    assert_eq!(decoded.payload, Some(b"Saved.".to_vec()));

    let bytes = encode_response(&Response::not_found(None));
    let decoded = decode_response(&bytes).unwrap();
    assert_eq!(decoded.status, Status::NotFound);
    assert_eq!(decoded.payload, None);

    let bytes = encode_response(&Response::error("boom"));
    let decoded = decode_response(&bytes).unwrap();
    assert_eq!(decoded.status, Status::Error);
    assert_eq!(decoded.payload, Some(b"boom".to_vec()));
}

#[test]
fn test_response_unknown_status_rejected() {
    let mut bytes = vec![0x7f];
    bytes.extend_from_slice(&0u32.to_be_bytes());
    assert!(decode_response(&bytes).is_err());
}

// =============================================================================
// Payload Helper Tests
// =============================================================================

#[test]
fn test_get_payload_round_trip() {
    let payload = encode_get_payload(i64::MAX, b"value");
    let (version, value) = decode_get_payload(&payload).unwrap();
    assert_eq!(version, i64::MAX);
    assert_eq!(value, b"value");

    assert!(decode_get_payload(&payload[..4]).is_err());
}

#[test]
fn test_key_list_round_trip() {
    let keys = vec!["a".to_string(), "bb".to_string(), "ccc".to_string()];
    let payload = encode_key_list(&keys);
    assert_eq!(decode_key_list(&payload).unwrap(), keys);

    let empty = encode_key_list(&[]);
    assert!(decode_key_list(&empty).unwrap().is_empty());
}

#[test]
fn test_key_list_truncated_rejected() {
    let payload = encode_key_list(&["abcdef".to_string()]);
    assert!(decode_key_list(&payload[..payload.len() - 2]).is_err());
}

// =============================================================================
// Stream Helper Tests
// =============================================================================

#[test]
fn test_stream_command_round_trip() {
    let mut buf = Vec::new();
    write_command(
        &mut buf,
        &Command::Put {
            key: "k".to_string(),
            value: Bytes::from_static(b"v"),
            version: 5,
        },
    )
    .unwrap();

    let mut cursor = Cursor::new(buf);
    match read_command(&mut cursor).unwrap() {
        Command::Put { key, value, version } => {
            assert_eq!(key, "k");
            assert_eq!(value, Bytes::from_static(b"v"));
            assert_eq!(version, 5);
        }
        other => panic!("wrong command: {:?}", other),
    }
}

#[test]
fn test_stream_response_round_trip() {
    let mut buf = Vec::new();
    write_response(&mut buf, &Response::ok(Some(b"PONG".to_vec()))).unwrap();

    let mut cursor = Cursor::new(buf);
    let response = read_response(&mut cursor).unwrap();
    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.payload, Some(b"PONG".to_vec()));
}

#[test]
fn test_stream_read_eof_is_error() {
    let mut cursor = Cursor::new(vec![0u8; HEADER_SIZE - 1]);
    assert!(read_command(&mut cursor).is_err());
}
