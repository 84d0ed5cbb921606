//! TCP Server
//!
//! Accepts connections and hands them to a fixed worker pool over a bounded
//! channel. Backpressure is the channel: when every worker is busy and the
//! queue is full, the acceptor blocks instead of piling up connections.

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{KvError, Result};
use super::connection::Connection;

/// TCP server for lwwkv
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
}

impl Server {
    /// Create a new server with the given config and engine
    pub fn new(config: Config, engine: Arc<Engine>) -> Self {
        Self { config, engine }
    }

    /// Run the accept loop (blocking).
    ///
    /// Returns only when the listener fails; worker threads drain and exit
    /// when the acceptor side of the channel is dropped.
    pub fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            KvError::Network(format!("bind {} failed: {}", self.config.listen_addr, e))
        })?;

        tracing::info!(addr = %self.config.listen_addr, "server listening");

        let (tx, rx) = channel::bounded::<TcpStream>(self.config.max_connections);
        let workers = self.spawn_workers(rx)?;

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if tx.send(stream).is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!(error = %e, "accept failed"),
            }
        }

        drop(tx);
        for worker in workers {
            let _ = worker.join();
        }

        Ok(())
    }

    fn spawn_workers(&self, rx: channel::Receiver<TcpStream>) -> Result<Vec<JoinHandle<()>>> {
        let mut workers = Vec::with_capacity(self.config.worker_threads);

        for id in 0..self.config.worker_threads {
            let rx = rx.clone();
            let engine = Arc::clone(&self.engine);
            let read_timeout = self.config.read_timeout_ms;
            let write_timeout = self.config.write_timeout_ms;

            let handle = thread::Builder::new()
                .name(format!("lwwkv-worker-{}", id))
                .spawn(move || {
                    for stream in rx.iter() {
                        match Connection::new(stream, Arc::clone(&engine)) {
                            Ok(mut conn) => {
                                if let Err(e) = conn.set_timeouts(read_timeout, write_timeout) {
                                    tracing::warn!(error = %e, "failed to set timeouts");
                                }
                                if let Err(e) = conn.handle() {
                                    tracing::warn!(
                                        peer = conn.peer_addr(),
                                        error = %e,
                                        "connection ended with error"
                                    );
                                }
                            }
                            Err(e) => tracing::warn!(error = %e, "failed to set up connection"),
                        }
                    }
                })?;

            workers.push(handle);
        }

        Ok(workers)
    }
}
