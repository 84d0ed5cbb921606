//! Command definitions
//!
//! Represents commands from clients.

use bytes::Bytes;

/// Command opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Get = 0x01,
    Put = 0x02,
    Delete = 0x03,
    Update = 0x04,
    ListKeys = 0x05,
    Ping = 0x06,
}

/// A parsed command
#[derive(Debug, Clone)]
pub enum Command {
    /// Get the value and version for a key
    Get { key: String },

    /// Put a key-value pair at a caller-supplied version
    Put {
        key: String,
        value: Bytes,
        version: i64,
    },

    /// Alias of Put, kept as a distinct opcode for wire compatibility
    Update {
        key: String,
        value: Bytes,
        version: i64,
    },

    /// Delete a key
    Delete { key: String },

    /// List all keys, sorted
    ListKeys,

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command opcode
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Put { .. } => CommandType::Put,
            Command::Delete { .. } => CommandType::Delete,
            Command::Update { .. } => CommandType::Update,
            Command::ListKeys => CommandType::ListKeys,
            Command::Ping => CommandType::Ping,
        }
    }
}
