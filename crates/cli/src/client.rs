// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin client for the cmdlog daemon.

use std::net::SocketAddr;
use std::time::Duration;

use cmdlog_core::SEEK_PREFIX;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connect to {0} failed: {1}")]
    Connect(SocketAddr, std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build a data record from `text`, appending the terminator.
pub fn data_record(text: &str) -> Vec<u8> {
    let mut payload = Vec::with_capacity(text.len() + 1);
    payload.extend_from_slice(text.as_bytes());
    payload.push(b'\n');
    payload
}

/// Build a `SEEK:<command>,<offset>` record.
pub fn seek_record(command: usize, offset: usize) -> Vec<u8> {
    format!("{}{},{}\n", SEEK_PREFIX, command, offset).into_bytes()
}

/// Send one payload and collect the streamed response.
///
/// The daemon keeps the connection open after streaming, so end of response
/// is a quiet `idle` window (or EOF), not a closed socket.
pub async fn exchange(
    addr: SocketAddr,
    payload: &[u8],
    idle: Duration,
) -> Result<Vec<u8>, ClientError> {
    let mut stream = TcpStream::connect(addr)
        .await
        .map_err(|e| ClientError::Connect(addr, e))?;
    stream.write_all(payload).await?;

    let mut response = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match tokio::time::timeout(idle, stream.read(&mut chunk)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => response.extend_from_slice(&chunk[..n]),
            Ok(Err(e)) => return Err(e.into()),
            Err(_elapsed) => break,
        }
    }
    Ok(response)
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
