//! Tests for the WAL: codec, writer, and recovery
//!
//! These tests verify:
//! - Line encoding format and delimiter escaping
//! - Decoding rules for short, malformed, and legacy UPDATE lines
//! - Writer append behavior (one line per record, append-only)
//! - Recovery replay: LWW rule, unconditional deletes, malformed-line skips

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use bytes::Bytes;
use lwwkv::wal::{decode_record, encode_record, Action, LogRecord, WalRecovery, WalWriter};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.wal");
    (temp_dir, wal_path)
}

/// Write raw lines directly to a file (for crafting malformed logs)
fn write_raw_lines(path: &PathBuf, lines: &[&[u8]]) {
    let mut file = File::create(path).unwrap();
    for line in lines {
        file.write_all(line).unwrap();
        file.write_all(b"\n").unwrap();
    }
}

// =============================================================================
// Codec Tests
// =============================================================================

#[test]
fn test_put_record_line_format() {
    let line = encode_record(&LogRecord::put("user:1", Bytes::from_static(b"ada"), 42));
    assert_eq!(line, b"PUT|user:1|ada|42\n");
}

#[test]
fn test_delete_record_line_format() {
    let line = encode_record(&LogRecord::delete("user:1"));
    assert_eq!(line, b"DELETE|user:1||0\n");
}

#[test]
fn test_round_trip_with_escaped_bytes() {
    let record = LogRecord::put(
        "pipe|and\\slash",
        Bytes::from_static(b"line1\nline2|tail\\"),
        -7,
    );
    let line = encode_record(&record);
    let decoded = decode_record(&line[..line.len() - 1]).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn test_decode_update_action_as_put() {
    let record = decode_record(b"UPDATE|k|v|9").unwrap();
    assert_eq!(record.action, Action::Put);
    assert_eq!(record.key, "k");
    assert_eq!(record.value, Bytes::from_static(b"v"));
    assert_eq!(record.version, 9);
}

#[test]
fn test_decode_delete_needs_only_two_fields() {
    let record = decode_record(b"DELETE|k").unwrap();
    assert_eq!(record.action, Action::Delete);
    assert_eq!(record.key, "k");
}

#[test]
fn test_decode_rejects_short_lines() {
    assert!(decode_record(b"").is_err());
    assert!(decode_record(b"PUT").is_err());
    assert!(decode_record(b"PUT|k|v").is_err());
}

#[test]
fn test_decode_rejects_bad_version_and_action() {
    assert!(decode_record(b"PUT|k|v|12x").is_err());
    assert!(decode_record(b"MERGE|k|v|1").is_err());
    assert!(decode_record(b"PUT|k|v|1\\").is_err()); // dangling escape
}

#[test]
fn test_decode_ignores_extra_fields() {
    // Pre-escaping logs could split a value across fields; the first four win
    let record = decode_record(b"PUT|k|v|3|junk").unwrap();
    assert_eq!(record.version, 3);
    assert_eq!(record.value, Bytes::from_static(b"v"));
}

// =============================================================================
// Writer Tests
// =============================================================================

#[test]
fn test_writer_open_creates_file() {
    let (_temp, wal_path) = setup_temp_wal();

    let _writer = WalWriter::open(&wal_path).unwrap();
    assert!(wal_path.exists());
}

#[test]
fn test_writer_appends_one_line_per_record() {
    let (_temp, wal_path) = setup_temp_wal();

    let writer = WalWriter::open(&wal_path).unwrap();
    writer
        .append(&LogRecord::put("a", Bytes::from_static(b"1"), 1))
        .unwrap();
    writer
        .append(&LogRecord::put("b", Bytes::from_static(b"2"), 2))
        .unwrap();
    writer.append(&LogRecord::delete("a")).unwrap();

    let contents = fs::read_to_string(&wal_path).unwrap();
    assert_eq!(contents, "PUT|a|1|1\nPUT|b|2|2\nDELETE|a||0\n");
}

#[test]
fn test_writer_appends_to_existing_log() {
    let (_temp, wal_path) = setup_temp_wal();

    {
        let writer = WalWriter::open(&wal_path).unwrap();
        writer
            .append(&LogRecord::put("a", Bytes::from_static(b"1"), 1))
            .unwrap();
    }
    {
        let writer = WalWriter::open(&wal_path).unwrap();
        writer
            .append(&LogRecord::put("b", Bytes::from_static(b"2"), 2))
            .unwrap();
    }

    let contents = fs::read_to_string(&wal_path).unwrap();
    assert_eq!(contents.lines().count(), 2);
}

// =============================================================================
// Recovery Tests
// =============================================================================

#[test]
fn test_recover_missing_file_is_empty_store() {
    let (_temp, wal_path) = setup_temp_wal();

    let (map, report) = WalRecovery::recover(&wal_path).unwrap();
    assert!(map.is_empty());
    assert_eq!(report.records_applied, 0);
    assert_eq!(report.records_skipped, 0);
}

#[test]
fn test_recover_empty_file() {
    let (_temp, wal_path) = setup_temp_wal();
    File::create(&wal_path).unwrap();

    let (map, report) = WalRecovery::recover(&wal_path).unwrap();
    assert!(map.is_empty());
    assert_eq!(report.keys_recovered, 0);
}

#[test]
fn test_recover_applies_lww_rule() {
    let (_temp, wal_path) = setup_temp_wal();
    write_raw_lines(
        &wal_path,
        &[b"PUT|k|old|5", b"PUT|k|new|9", b"PUT|other|x|1"],
    );

    let (map, report) = WalRecovery::recover(&wal_path).unwrap();
    assert_eq!(report.records_applied, 3);
    assert_eq!(report.keys_recovered, 2);
    assert_eq!(map["k"].value, Bytes::from_static(b"new"));
    assert_eq!(map["k"].version, 9);
}

#[test]
fn test_recover_delete_is_unconditional() {
    let (_temp, wal_path) = setup_temp_wal();
    // Delete removes the key regardless of tracked version; a later put at a
    // lower version then lands on the absent key
    write_raw_lines(&wal_path, &[b"PUT|k|x|100", b"DELETE|k||0", b"PUT|k|y|1"]);

    let (map, _report) = WalRecovery::recover(&wal_path).unwrap();
    assert_eq!(map["k"].value, Bytes::from_static(b"y"));
    assert_eq!(map["k"].version, 1);
}

#[test]
fn test_recover_skips_malformed_lines() {
    let (_temp, wal_path) = setup_temp_wal();
    write_raw_lines(
        &wal_path,
        &[
            b"PUT|a|1|10",
            b"garbage-without-delimiter",
            b"PUT|b|2|not-a-number",
            b"PUT|truncated",
            b"PUT|c|3|30",
        ],
    );

    let (map, report) = WalRecovery::recover(&wal_path).unwrap();
    assert_eq!(report.records_applied, 2);
    assert_eq!(report.records_skipped, 3);
    assert_eq!(map.len(), 2);
    assert!(map.contains_key("a"));
    assert!(map.contains_key("c"));
}

#[test]
fn test_recover_tolerates_truncated_tail() {
    let (_temp, wal_path) = setup_temp_wal();
    // A crash mid-append leaves a partial final line with no newline
    let mut file = File::create(&wal_path).unwrap();
    file.write_all(b"PUT|a|1|10\nPUT|b|2").unwrap();
    drop(file);

    let (map, report) = WalRecovery::recover(&wal_path).unwrap();
    assert_eq!(report.records_applied, 1);
    assert_eq!(report.records_skipped, 1);
    assert_eq!(map.len(), 1);
    assert!(map.contains_key("a"));
}

#[test]
fn test_recover_handles_blank_lines() {
    let (_temp, wal_path) = setup_temp_wal();
    write_raw_lines(&wal_path, &[b"PUT|a|1|10", b"", b"PUT|b|2|20"]);

    let (map, report) = WalRecovery::recover(&wal_path).unwrap();
    assert_eq!(report.records_applied, 2);
    assert_eq!(report.records_skipped, 0);
    assert_eq!(map.len(), 2);
}
