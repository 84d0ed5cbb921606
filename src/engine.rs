//! Engine Module
//!
//! The storage engine: an in-memory key→entry map with write-ahead logging and
//! last-writer-wins conflict resolution.
//!
//! ## Concurrency Model: Single Exclusive Lock
//!
//! Every operation (put/update/get/delete/list_keys) takes the one engine
//! lock, which guards the map and the WAL handle together. There is no
//! read/write separation and no per-key sharding; a slow append stalls every
//! concurrent caller. That is the contract: all callers observe one serialized
//! view of map and log.
//!
//! ## Write path
//!
//! validate (LWW check) → persist (WAL append) → apply (map update). The map
//! is only touched after the append succeeds, so memory state is always a
//! subset of what the log can rebuild. A failed append surfaces as
//! [`KvError::Persistence`] and leaves the map unchanged.
//!
//! ## Version trust boundary
//!
//! The version used for conflict resolution is supplied by the caller; the
//! engine never generates one and enforces no monotonicity beyond "a larger
//! number wins, ties go to the most recent write". Callers must feed a
//! consistently increasing version per key (wall-clock nanoseconds, a
//! per-client sequence, a hybrid logical clock). Do not replace this with
//! server-generated versions; it would change observable semantics.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Result;
use crate::wal::{LogRecord, RecoveryReport, WalRecovery, WalWriter};

/// Message for an applied put
pub const MSG_SAVED: &str = "Saved.";

/// Message for a stale put. Exact text is an observable contract: stale writes
/// report success and are distinguished only by this message.
pub const MSG_STALE: &str = "Ignored: Stale version.";

/// Message for a completed delete
pub const MSG_DELETED: &str = "Deleted.";

/// Message for a delete of an absent key
pub const MSG_NOT_FOUND: &str = "Not found.";

/// Current accepted state for one key
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Value bytes
    pub value: Bytes,

    /// Version of the last accepted put for this key
    pub version: i64,
}

/// Outcome of a put/update call
#[derive(Debug, Clone, PartialEq)]
pub struct PutOutcome {
    /// Always true today: stale writes are reported as accepted and are
    /// distinguished only by [`MSG_STALE`]
    pub accepted: bool,

    /// Human-readable disposition of the write
    pub message: String,
}

/// Outcome of a delete call
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOutcome {
    /// False when the key was absent
    pub succeeded: bool,

    /// Human-readable disposition of the delete
    pub message: String,
}

/// Map and WAL handle, guarded together by the engine lock
struct Inner {
    map: BTreeMap<String, Entry>,
    wal: WalWriter,
}

/// The storage engine
pub struct Engine {
    config: Config,
    wal_path: PathBuf,
    inner: Mutex<Inner>,
}

impl Engine {
    const WAL_FILENAME: &'static str = "wal.log";

    /// Open or create an engine with the given config.
    ///
    /// On startup:
    /// 1. Create the data directory if missing
    /// 2. Replay the WAL into the initial map
    /// 3. Probe the WAL for appendability (unwritable path is fatal here)
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        let wal_path = config.data_dir.join(Self::WAL_FILENAME);

        let (map, report) = WalRecovery::recover(&wal_path)?;
        Self::log_recovery(&wal_path, &report);

        let wal = WalWriter::open(&wal_path)?;

        Ok(Self {
            config,
            wal_path,
            inner: Mutex::new(Inner { map, wal }),
        })
    }

    /// Open with a data directory, using defaults for everything else
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    fn log_recovery(wal_path: &Path, report: &RecoveryReport) {
        if report.records_applied > 0 || report.records_skipped > 0 {
            tracing::info!(
                wal = %wal_path.display(),
                records_applied = report.records_applied,
                records_skipped = report.records_skipped,
                keys_recovered = report.keys_recovered,
                "WAL recovery complete"
            );
        }
    }

    /// Put a key-value pair at a caller-supplied version.
    ///
    /// Accepted when the key is absent or `version >= current.version`; ties
    /// go to the most recently applied write. A stale version is a no-op on
    /// state but still reports `accepted = true` with [`MSG_STALE`]. The WAL
    /// append happens before the map update; if it fails the map is untouched
    /// and the error is returned.
    pub fn put(&self, key: &str, value: Bytes, version: i64) -> Result<PutOutcome> {
        let mut inner = self.inner.lock();

        if let Some(current) = inner.map.get(key) {
            if current.version > version {
                tracing::trace!(key, version, current = current.version, "stale put ignored");
                return Ok(PutOutcome {
                    accepted: true,
                    message: MSG_STALE.to_string(),
                });
            }
        }

        inner.wal.append(&LogRecord::put(key, value.clone(), version))?;
        inner.map.insert(key.to_string(), Entry { value, version });

        Ok(PutOutcome {
            accepted: true,
            message: MSG_SAVED.to_string(),
        })
    }

    /// Alias for [`Engine::put`]; identical contract.
    pub fn update(&self, key: &str, value: Bytes, version: i64) -> Result<PutOutcome> {
        self.put(key, value, version)
    }

    /// Get the value and version for a key, or `None` if absent.
    ///
    /// Reads take the same exclusive lock as writes; there is no separate read
    /// path.
    pub fn get(&self, key: &str) -> Option<(Bytes, i64)> {
        let inner = self.inner.lock();
        inner.map.get(key).map(|e| (e.value.clone(), e.version))
    }

    /// Delete a key.
    ///
    /// When present, a DELETE record is appended before the key is removed;
    /// when absent, nothing is logged and `succeeded = false` comes back.
    pub fn delete(&self, key: &str) -> Result<DeleteOutcome> {
        let mut inner = self.inner.lock();

        if !inner.map.contains_key(key) {
            return Ok(DeleteOutcome {
                succeeded: false,
                message: MSG_NOT_FOUND.to_string(),
            });
        }

        inner.wal.append(&LogRecord::delete(key))?;
        inner.map.remove(key);

        Ok(DeleteOutcome {
            succeeded: true,
            message: MSG_DELETED.to_string(),
        })
    }

    /// All present keys, lexicographically sorted
    pub fn list_keys(&self) -> Vec<String> {
        let inner = self.inner.lock();
        inner.map.keys().cloned().collect()
    }

    /// Number of keys currently present
    pub fn len(&self) -> usize {
        self.inner.lock().map.len()
    }

    /// True when the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the WAL file path
    pub fn wal_path(&self) -> &Path {
        &self.wal_path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
