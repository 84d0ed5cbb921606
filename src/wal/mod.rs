//! Write-Ahead Log (WAL) Module
//!
//! Provides durability through append-only logging. Every accepted mutation is
//! written to the log before it becomes visible in memory, and the log is fully
//! replayed on startup to rebuild the map.
//!
//! ## Responsibilities
//! - Encode one mutation per newline-delimited text record
//! - Append records before any in-memory mutation
//! - Replay the log front-to-back on startup, skipping malformed lines
//!
//! ## File Format
//! ```text
//! PUT|user:17|{"name":"ada"}|1712083000123456789
//! DELETE|user:17||0
//! ```
//!
//! Fields are `action|key|value|version`. The delimiter, backslash, and newline
//! are escaped inside key and value (`\|`, `\\`, `\n`), so arbitrary bytes
//! survive a round-trip. There is no header, checksum, or length framing; the
//! file never shrinks (no compaction or truncation).

mod codec;
mod record;
mod recovery;
mod writer;

pub use codec::{decode_record, encode_record, DELIMITER};
pub use record::{Action, LogRecord};
pub use recovery::{RecoveryReport, WalRecovery};
pub use writer::WalWriter;
