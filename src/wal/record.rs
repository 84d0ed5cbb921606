//! WAL record definitions
//!
//! One record is one persisted fact: a key was written at a version, or a key
//! was deleted.

use bytes::Bytes;

/// Mutation kind carried by a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Put,
    Delete,
}

impl Action {
    /// Wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Put => "PUT",
            Action::Delete => "DELETE",
        }
    }
}

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// The mutation that was accepted
    pub action: Action,

    /// The key the mutation applies to
    pub key: String,

    /// Value bytes; empty for DELETE records
    pub value: Bytes,

    /// Caller-supplied LWW version; 0 for DELETE records (ignored on replay)
    pub version: i64,
}

impl LogRecord {
    /// Record for an accepted put
    pub fn put(key: impl Into<String>, value: Bytes, version: i64) -> Self {
        Self {
            action: Action::Put,
            key: key.into(),
            value,
            version,
        }
    }

    /// Record for an accepted delete
    pub fn delete(key: impl Into<String>) -> Self {
        Self {
            action: Action::Delete,
            key: key.into(),
            value: Bytes::new(),
            version: 0,
        }
    }
}
