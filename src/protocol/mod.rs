//! Protocol Module
//!
//! Defines the wire protocol the service adapter speaks. The engine knows
//! nothing about this layer; it only marshals the five logical operations.
//!
//! ## Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: GET       - Payload: key_len (4) + key
//! - 0x02: PUT       - Payload: key_len (4) + key + version (8) + value
//! - 0x03: DELETE    - Payload: key_len (4) + key
//! - 0x04: UPDATE    - Payload: same as PUT (alias)
//! - 0x05: LIST_KEYS - Payload: empty
//! - 0x06: PING      - Payload: empty
//!
//! ## Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK        - GET: version (8) + value; PUT/UPDATE/DELETE: message;
//!                     LIST_KEYS: count (4) + (len (4) + key)*; PING: "PONG"
//! - 0x01: NOT_FOUND - GET miss or DELETE of an absent key
//! - 0x02: ERROR     - message text (e.g. a persistence failure)
//!
//! All integers are big-endian.

mod codec;
mod command;
mod response;

pub use codec::{
    decode_command, decode_get_payload, decode_key_list, decode_response, encode_command,
    encode_get_payload, encode_key_list, encode_response, read_command, read_response,
    write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
pub use command::{Command, CommandType};
pub use response::{Response, Status};
