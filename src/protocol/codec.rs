//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol. Frame shape and
//! payload layouts are documented in the module docs of [`super`].

use std::io::{Read, Write};

use bytes::Bytes;

use crate::error::{KvError, Result};
use super::{Command, Response, Status};

/// Header size: 1 byte command/status + 4 bytes payload length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes.
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Vec<u8> {
    let payload = match command {
        Command::Get { key } | Command::Delete { key } => {
            let mut payload = Vec::with_capacity(4 + key.len());
            put_key(&mut payload, key);
            payload
        }
        Command::Put { key, value, version } | Command::Update { key, value, version } => {
            let mut payload = Vec::with_capacity(4 + key.len() + 8 + value.len());
            put_key(&mut payload, key);
            payload.extend_from_slice(&version.to_be_bytes());
            payload.extend_from_slice(value);
            payload
        }
        Command::ListKeys | Command::Ping => Vec::new(),
    };

    frame(command.command_type() as u8, &payload)
}

/// Decode a command from a complete frame
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_type, payload) = split_frame(bytes)?;

    match cmd_type {
        0x01 => {
            let (key, rest) = take_key(payload, "GET")?;
            expect_empty(rest, "GET")?;
            Ok(Command::Get { key })
        }
        0x02 => {
            let (key, value, version) = decode_write_payload(payload, "PUT")?;
            Ok(Command::Put { key, value, version })
        }
        0x03 => {
            let (key, rest) = take_key(payload, "DELETE")?;
            expect_empty(rest, "DELETE")?;
            Ok(Command::Delete { key })
        }
        0x04 => {
            let (key, value, version) = decode_write_payload(payload, "UPDATE")?;
            Ok(Command::Update { key, value, version })
        }
        0x05 => {
            expect_empty(payload, "LIST_KEYS")?;
            Ok(Command::ListKeys)
        }
        0x06 => {
            expect_empty(payload, "PING")?;
            Ok(Command::Ping)
        }
        _ => Err(KvError::Protocol(format!(
            "Unknown command type: 0x{:02x}",
            cmd_type
        ))),
    }
}

/// Decode the shared PUT/UPDATE payload: key_len (4) + key + version (8) + value
fn decode_write_payload(payload: &[u8], what: &str) -> Result<(String, Bytes, i64)> {
    let (key, rest) = take_key(payload, what)?;
    if rest.len() < 8 {
        return Err(KvError::Protocol(format!("{} command: missing version", what)));
    }
    let version = i64::from_be_bytes(rest[..8].try_into().unwrap());
    let value = Bytes::copy_from_slice(&rest[8..]);
    Ok((key, value, version))
}

/// Read a length-prefixed UTF-8 key, returning the key and the remaining bytes
fn take_key<'a>(payload: &'a [u8], what: &str) -> Result<(String, &'a [u8])> {
    if payload.len() < 4 {
        return Err(KvError::Protocol(format!(
            "{} command: missing key length",
            what
        )));
    }
    let key_len = u32::from_be_bytes(payload[..4].try_into().unwrap()) as usize;
    if payload.len() < 4 + key_len {
        return Err(KvError::Protocol(format!(
            "{} command: incomplete key (expected {}, got {})",
            what,
            key_len,
            payload.len() - 4
        )));
    }
    let key = String::from_utf8(payload[4..4 + key_len].to_vec())
        .map_err(|_| KvError::Protocol(format!("{} command: key is not UTF-8", what)))?;
    Ok((key, &payload[4 + key_len..]))
}

fn put_key(payload: &mut Vec<u8>, key: &str) {
    payload.extend_from_slice(&(key.len() as u32).to_be_bytes());
    payload.extend_from_slice(key.as_bytes());
}

fn expect_empty(rest: &[u8], what: &str) -> Result<()> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(KvError::Protocol(format!(
            "{} command: unexpected trailing {} bytes",
            what,
            rest.len()
        )))
    }
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes.
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Decode a response from a complete frame
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes)?;

    let status = match status_byte {
        0x00 => Status::Ok,
        0x01 => Status::NotFound,
        0x02 => Status::Error,
        _ => {
            return Err(KvError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                status_byte
            )))
        }
    };

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Frame helpers
// =============================================================================

fn frame(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(tag);
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(payload);
    message
}

/// Validate a frame and return (tag, payload)
fn split_frame(bytes: &[u8]) -> Result<(u8, &[u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(KvError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let tag = bytes[0];
    let payload_len = u32::from_be_bytes(bytes[1..HEADER_SIZE].try_into().unwrap()) as usize;

    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(KvError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(KvError::Protocol(format!(
            "Incomplete payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    Ok((tag, &bytes[HEADER_SIZE..total_len]))
}

// =============================================================================
// Payload helpers (GET and LIST_KEYS marshalling, shared by server and CLI)
// =============================================================================

/// Build a GET response payload: version (8) + value
pub fn encode_get_payload(version: i64, value: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(8 + value.len());
    payload.extend_from_slice(&version.to_be_bytes());
    payload.extend_from_slice(value);
    payload
}

/// Split a GET response payload into (version, value)
pub fn decode_get_payload(payload: &[u8]) -> Result<(i64, Vec<u8>)> {
    if payload.len() < 8 {
        return Err(KvError::Protocol(
            "GET response: missing version".to_string(),
        ));
    }
    let version = i64::from_be_bytes(payload[..8].try_into().unwrap());
    Ok((version, payload[8..].to_vec()))
}

/// Build a LIST_KEYS response payload: count (4) + (len (4) + key)*
pub fn encode_key_list(keys: &[String]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(4 + keys.iter().map(|k| 4 + k.len()).sum::<usize>());
    payload.extend_from_slice(&(keys.len() as u32).to_be_bytes());
    for key in keys {
        payload.extend_from_slice(&(key.len() as u32).to_be_bytes());
        payload.extend_from_slice(key.as_bytes());
    }
    payload
}

/// Parse a LIST_KEYS response payload
pub fn decode_key_list(payload: &[u8]) -> Result<Vec<String>> {
    if payload.len() < 4 {
        return Err(KvError::Protocol(
            "LIST_KEYS response: missing count".to_string(),
        ));
    }
    let count = u32::from_be_bytes(payload[..4].try_into().unwrap()) as usize;
    let mut keys = Vec::with_capacity(count.min(1024));
    let mut rest = &payload[4..];

    for _ in 0..count {
        if rest.len() < 4 {
            return Err(KvError::Protocol(
                "LIST_KEYS response: truncated key length".to_string(),
            ));
        }
        let key_len = u32::from_be_bytes(rest[..4].try_into().unwrap()) as usize;
        if rest.len() < 4 + key_len {
            return Err(KvError::Protocol(
                "LIST_KEYS response: truncated key".to_string(),
            ));
        }
        let key = String::from_utf8(rest[4..4 + key_len].to_vec())
            .map_err(|_| KvError::Protocol("LIST_KEYS response: key is not UTF-8".to_string()))?;
        keys.push(key);
        rest = &rest[4 + key_len..];
    }

    Ok(keys)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command from a stream.
///
/// Blocks until a complete command is received or an error occurs.
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    decode_command(&read_frame(reader)?)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(&encode_command(command))?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    decode_response(&read_frame(reader)?)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&encode_response(response))?;
    writer.flush()?;
    Ok(())
}

/// Read one full frame (header + payload) off a stream
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u32::from_be_bytes(header[1..].try_into().unwrap()) as usize;
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(KvError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let mut message = vec![0u8; HEADER_SIZE + payload_len];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }

    Ok(message)
}
