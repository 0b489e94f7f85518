// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! Runs in a spawned task, accepting connections and dispatching each
//! decoded request straight onto the shared [`Daemon`], without blocking
//! the accept loop on any one client.

use std::sync::Arc;

use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, warn};

use crate::protocol::wire::{self, ProtocolError, DEFAULT_TIMEOUT};
use crate::protocol::{Request, Response};
use crate::Daemon;

/// Errors from handling a single connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Listener task for accepting socket connections.
pub struct Listener {
    socket: UnixListener,
    daemon: Arc<Daemon>,
}

impl Listener {
    pub fn new(socket: UnixListener, daemon: Arc<Daemon>) -> Self {
        Self { socket, daemon }
    }

    /// Run the accept loop forever, spawning one task per connection.
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let daemon = Arc::clone(&self.daemon);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &daemon).await {
                            match e {
                                ConnectionError::Protocol(ProtocolError::ConnectionClosed) => {
                                    debug!("client disconnected")
                                }
                                ConnectionError::Protocol(ProtocolError::Timeout) => {
                                    warn!("connection timed out")
                                }
                                _ => error!(error = %e, "connection error"),
                            }
                        }
                    });
                }
                Err(e) => error!(error = %e, "accept error"),
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, daemon: &Daemon) -> Result<(), ConnectionError> {
    let (mut reader, mut writer) = stream.into_split();

    let request = wire::read_request(&mut reader, DEFAULT_TIMEOUT).await?;
    if matches!(request, Request::Ping) {
        debug!("received ping");
    } else {
        tracing::info!(request = ?request, "received request");
    }

    let response = daemon.handle(request).await;
    if matches!(response, Response::Error { .. }) {
        tracing::warn!(response = ?response, "request failed");
    } else {
        debug!(response = ?response, "sending response");
    }

    wire::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await?;
    Ok(())
}
