//! WAL Writer
//!
//! Handles appending records to the WAL file.
//!
//! Each append opens the file in append mode, writes one encoded line, and
//! drops the handle, so a crash mid-stream leaves at most one partial line at
//! the tail. Durability floor is "written to the OS buffer"; there is no fsync
//! and no batching. Serialization is the engine's job: the writer is only ever
//! reached while the engine lock is held.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{KvError, Result};
use super::codec::encode_record;
use super::record::LogRecord;

/// Appends records to the WAL file
pub struct WalWriter {
    path: PathBuf,
}

impl WalWriter {
    /// Open a WAL for appending, creating the file if needed.
    ///
    /// Probes the path once so an unwritable location fails at startup rather
    /// than on the first mutation.
    pub fn open(path: &Path) -> Result<Self> {
        OpenOptions::new().append(true).create(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Append one record.
    ///
    /// Failures come back as [`KvError::Persistence`] so the engine can refuse
    /// the in-memory mutation; a record that is not on disk must not be
    /// visible in memory.
    pub fn append(&self, record: &LogRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(KvError::Persistence)?;
        file.write_all(&encode_record(record))
            .map_err(KvError::Persistence)?;
        Ok(())
    }

    /// Path of the underlying log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
