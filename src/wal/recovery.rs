//! WAL Recovery
//!
//! Rebuilds the in-memory map by replaying the log front-to-back. Runs once at
//! startup, before any concurrent access exists, so it needs no locking.
//!
//! Replay applies the same last-writer-wins rule as live writes: a PUT/UPDATE
//! record lands only if the key is absent or the record's version is at least
//! the version tracked so far; a DELETE removes the key unconditionally.
//! Malformed lines are skipped with a warning, never fatal.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::engine::Entry;
use crate::error::Result;
use super::codec::decode_record;
use super::record::{Action, LogRecord};

/// Handles WAL replay at startup
pub struct WalRecovery;

/// Outcome of a recovery pass
#[derive(Debug, Default)]
pub struct RecoveryReport {
    /// Records decoded and run through the replay rule
    pub records_applied: u64,

    /// Malformed lines skipped
    pub records_skipped: u64,

    /// Keys present in the rebuilt map
    pub keys_recovered: usize,
}

impl WalRecovery {
    /// Replay a WAL file into a fresh map.
    ///
    /// A missing file is an empty store, not an error. I/O failure while
    /// reading an existing file is fatal to startup.
    pub fn recover(path: &Path) -> Result<(BTreeMap<String, Entry>, RecoveryReport)> {
        let mut map = BTreeMap::new();
        let mut report = RecoveryReport::default();

        if !path.exists() {
            return Ok((map, report));
        }

        let mut reader = BufReader::new(File::open(path)?);
        let mut line = Vec::new();
        let mut line_no = 0u64;

        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            line_no += 1;
            if line.last() == Some(&b'\n') {
                line.pop();
            }
            if line.is_empty() {
                continue;
            }

            match decode_record(&line) {
                Ok(record) => {
                    Self::replay(&mut map, record);
                    report.records_applied += 1;
                }
                Err(e) => {
                    tracing::warn!(line = line_no, error = %e, "skipping malformed WAL line");
                    report.records_skipped += 1;
                }
            }
        }

        report.keys_recovered = map.len();
        Ok((map, report))
    }

    /// Apply one record with the live acceptance rule
    fn replay(map: &mut BTreeMap<String, Entry>, record: LogRecord) {
        match record.action {
            Action::Delete => {
                // Unconditional: delete wins over any version tracked so far
                map.remove(&record.key);
            }
            Action::Put => {
                let accepted = match map.get(&record.key) {
                    Some(current) => record.version >= current.version,
                    None => true,
                };
                if accepted {
                    map.insert(
                        record.key,
                        Entry {
                            value: record.value,
                            version: record.version,
                        },
                    );
                }
            }
        }
    }
}
