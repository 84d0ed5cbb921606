//! Network Module
//!
//! TCP service adapter: accepts connections and maps inbound commands to
//! engine operations.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Fixed worker pool fed over a bounded crossbeam channel
//! - One worker per in-flight connection; the engine lock does the
//!   serialization

mod connection;
mod server;

pub use connection::Connection;
pub use server::Server;
