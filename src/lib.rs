//! # lwwkv
//!
//! An in-memory key-value store with:
//! - Write-Ahead Logging (WAL) for crash recovery
//! - Last-writer-wins (LWW) conflict resolution on caller-supplied versions
//! - One exclusive lock serializing every operation
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                             │
//! │               (acceptor + worker pool)                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Engine                                 │
//! │        put / update / get / delete / list_keys              │
//! │               (single exclusive lock)                       │
//! └──────────┬──────────────────────────┬───────────────────────┘
//!            │ 1. append                │ 2. apply
//!            ▼                          ▼
//!     ┌─────────────┐           ┌──────────────┐
//!     │     WAL     │           │   BTreeMap   │
//!     │ (append-only│           │ key → entry  │
//!     │  text log)  │           │  (in memory) │
//!     └─────────────┘           └──────────────┘
//! ```
//!
//! The WAL is the sole durable state; it is fully replayed on startup through
//! the same LWW acceptance rule used for live writes.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod engine;
pub mod network;
pub mod protocol;
pub mod wal;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::Config;
pub use engine::{DeleteOutcome, Engine, Entry, PutOutcome};
pub use error::{KvError, Result};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of lwwkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
