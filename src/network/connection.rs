//! Connection Handler
//!
//! Handles a single client connection: read a command, invoke the engine,
//! marshal the result. All result-shaping lives here; the engine stays
//! protocol-agnostic.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::Engine;
use crate::error::{KvError, Result};
use crate::protocol::{
    encode_get_payload, encode_key_list, read_command, write_response, Command, Response,
};

/// Handles a single client connection
pub struct Connection {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    engine: Arc<Engine>,
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler with buffered I/O
    pub fn new(stream: TcpStream, engine: Arc<Engine>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            engine,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 disables)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Handle the connection, blocking until the client goes away.
    ///
    /// Disconnects and timeouts are a normal end of conversation, not errors.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!(peer = %self.peer_addr, "connection established");

        loop {
            let command = match read_command(&mut self.reader) {
                Ok(cmd) => cmd,
                Err(KvError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!(peer = %self.peer_addr, "client disconnected");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(peer = %self.peer_addr, error = %e, "read failed");
                    let _ = self.send_response(Response::error(&e.to_string()));
                    return Err(e);
                }
            };

            tracing::trace!(peer = %self.peer_addr, ?command, "received command");

            let response = self.execute_command(command);

            if let Err(e) = self.send_response(response) {
                if let KvError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            peer = %self.peer_addr,
                            "client disconnected before response was sent"
                        );
                        return Ok(());
                    }
                }
                tracing::warn!(peer = %self.peer_addr, error = %e, "write failed");
                return Err(e);
            }
        }
    }

    /// Map one command onto the engine and marshal the outcome
    fn execute_command(&self, command: Command) -> Response {
        match command {
            Command::Get { key } => match self.engine.get(&key) {
                Some((value, version)) => {
                    Response::ok(Some(encode_get_payload(version, &value)))
                }
                None => Response::not_found(None),
            },
            Command::Put { key, value, version } | Command::Update { key, value, version } => {
                match self.engine.put(&key, value, version) {
                    Ok(outcome) => Response::ok(Some(outcome.message.into_bytes())),
                    Err(e) => Response::error(&e.to_string()),
                }
            }
            Command::Delete { key } => match self.engine.delete(&key) {
                Ok(outcome) if outcome.succeeded => {
                    Response::ok(Some(outcome.message.into_bytes()))
                }
                Ok(outcome) => Response::not_found(Some(&outcome.message)),
                Err(e) => Response::error(&e.to_string()),
            },
            Command::ListKeys => Response::ok(Some(encode_key_list(&self.engine.list_keys()))),
            Command::Ping => Response::ok(Some(b"PONG".to_vec())),
        }
    }

    fn send_response(&mut self, response: Response) -> Result<()> {
        write_response(&mut self.writer, &response)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// Error kinds that mean the client is gone or idle, across platforms
fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::WouldBlock
            | ErrorKind::TimedOut
    )
}
