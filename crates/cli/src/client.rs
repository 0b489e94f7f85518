// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin Unix-socket client for talking to `adxd`.

use adx_daemon::protocol::wire::{self, DEFAULT_TIMEOUT};
use adx_daemon::protocol::{Request, Response};
use std::path::Path;
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not connect to adxd at {path}: {source}")]
    Connect { path: String, source: std::io::Error },

    #[error(transparent)]
    Protocol(#[from] wire::ProtocolError),

    #[error("adxd returned an error: {0}")]
    Daemon(String),
}

/// One round-trip against the daemon: connect, send, read, disconnect.
/// The daemon only ever handles one request per connection, so a fresh
/// connection per call keeps the protocol stateless on both ends.
pub async fn call(socket_path: &Path, request: Request) -> Result<Response, ClientError> {
    let mut stream = UnixStream::connect(socket_path).await.map_err(|source| ClientError::Connect {
        path: socket_path.display().to_string(),
        source,
    })?;

    wire::write_request(&mut stream, &request, DEFAULT_TIMEOUT).await?;
    let response = wire::read_response(&mut stream, DEFAULT_TIMEOUT).await?;

    if let Response::Error { message } = &response {
        return Err(ClientError::Daemon(message.clone()));
    }
    Ok(response)
}
