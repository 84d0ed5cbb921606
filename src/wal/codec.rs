//! WAL line codec
//!
//! Encoding and decoding of single log records. Pure functions, no I/O.
//!
//! A record is one line of delimiter-separated fields in the order
//! `action|key|value|version`. Key and value may contain arbitrary bytes, so
//! the delimiter, backslash, and newline are escaped within those fields:
//!
//! | byte   | escaped as |
//! |--------|------------|
//! | `\`    | `\\`       |
//! | `\|`   | `\|`       |
//! | `\n`   | `\n` (two chars) |
//!
//! Decoding is lenient by contract: anything that cannot be decoded yields a
//! [`KvError::MalformedRecord`], and recovery skips such lines rather than
//! aborting startup.

use bytes::Bytes;

use crate::error::{KvError, Result};
use super::record::LogRecord;

/// Field delimiter within a record line
pub const DELIMITER: u8 = b'|';

/// Escape lead-in inside key/value fields
const ESCAPE: u8 = b'\\';

// =============================================================================
// Encoding
// =============================================================================

/// Encode a record as one line, including the trailing newline.
///
/// DELETE records are written with an empty value field and version 0 so every
/// line carries the same four fields.
pub fn encode_record(record: &LogRecord) -> Vec<u8> {
    let mut line = Vec::with_capacity(
        record.action.as_str().len() + record.key.len() + record.value.len() + 24,
    );
    line.extend_from_slice(record.action.as_str().as_bytes());
    line.push(DELIMITER);
    escape_into(record.key.as_bytes(), &mut line);
    line.push(DELIMITER);
    escape_into(&record.value, &mut line);
    line.push(DELIMITER);
    line.extend_from_slice(record.version.to_string().as_bytes());
    line.push(b'\n');
    line
}

/// Append `field` to `out`, escaping delimiter, backslash, and newline
fn escape_into(field: &[u8], out: &mut Vec<u8>) {
    for &byte in field {
        match byte {
            ESCAPE => out.extend_from_slice(b"\\\\"),
            DELIMITER => out.extend_from_slice(b"\\|"),
            b'\n' => out.extend_from_slice(b"\\n"),
            other => out.push(other),
        }
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode one line (without its trailing newline) into a record.
///
/// Rules, matching what replay tolerates:
/// - fewer than 2 fields: malformed
/// - `DELETE`: needs action + key only; value/version fields are ignored
/// - `PUT`/`UPDATE`: needs at least 4 fields; fields past the fourth are
///   ignored; an unparseable version is malformed
/// - unknown action or non-UTF-8 key: malformed
pub fn decode_record(line: &[u8]) -> Result<LogRecord> {
    let fields = split_fields(line)?;
    if fields.len() < 2 {
        return Err(KvError::MalformedRecord(format!(
            "expected at least 2 fields, got {}",
            fields.len()
        )));
    }

    let action = String::from_utf8(fields[0].clone())
        .map_err(|_| KvError::MalformedRecord("non-UTF-8 action".to_string()))?;
    let key = String::from_utf8(fields[1].clone())
        .map_err(|_| KvError::MalformedRecord("non-UTF-8 key".to_string()))?;

    match action.as_str() {
        "DELETE" => Ok(LogRecord::delete(key)),
        // UPDATE is a historical alias for PUT and decodes to the same record
        "PUT" | "UPDATE" => {
            if fields.len() < 4 {
                return Err(KvError::MalformedRecord(format!(
                    "{} record with {} fields (need 4)",
                    action,
                    fields.len()
                )));
            }
            let version_raw = &fields[3];
            let version = std::str::from_utf8(version_raw)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| {
                    KvError::MalformedRecord(format!(
                        "unparseable version {:?}",
                        String::from_utf8_lossy(version_raw)
                    ))
                })?;
            Ok(LogRecord::put(key, Bytes::from(fields[2].clone()), version))
        }
        other => Err(KvError::MalformedRecord(format!(
            "unknown action {:?}",
            other
        ))),
    }
}

/// Split a line on unescaped delimiters, resolving escape sequences.
///
/// A dangling escape at end of line or an unknown escape pair is malformed.
fn split_fields(line: &[u8]) -> Result<Vec<Vec<u8>>> {
    let mut fields = Vec::with_capacity(4);
    let mut current = Vec::new();
    let mut bytes = line.iter().copied();

    while let Some(byte) = bytes.next() {
        match byte {
            ESCAPE => match bytes.next() {
                Some(ESCAPE) => current.push(ESCAPE),
                Some(DELIMITER) => current.push(DELIMITER),
                Some(b'n') => current.push(b'\n'),
                Some(other) => {
                    return Err(KvError::MalformedRecord(format!(
                        "unknown escape sequence \\{}",
                        other as char
                    )))
                }
                None => {
                    return Err(KvError::MalformedRecord(
                        "dangling escape at end of line".to_string(),
                    ))
                }
            },
            DELIMITER => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(current);

    Ok(fields)
}
