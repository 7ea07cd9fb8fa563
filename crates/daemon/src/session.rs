// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-connection session: assemble records, dispatch, stream read-back.

use std::sync::Arc;

use cmdlog_core::{
    classify, AssembleError, Assembler, Frame, Record, RecordError, Store, StoreError,
};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Bytes pulled from the transport per read.
const RECV_CHUNK: usize = 4096;

/// Upper bound on bytes copied out of the store per read-back call. Reads
/// stop at entry boundaries regardless; this only caps the copy size.
const STREAM_CHUNK: usize = 4096;

/// Reply line for a seek outside the current log contents.
const ERR_OUT_OF_RANGE: &[u8] = b"ERR:out-of-range\n";

/// Reply line for a record with the seek prefix but a bad grammar.
const ERR_MALFORMED: &[u8] = b"ERR:malformed-seek\n";

/// Session-fatal errors. These end the session, never the store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    #[error("assembly failed: {0}")]
    Assemble(#[from] AssembleError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Drive one connection until the peer closes, the transport fails, or
/// shutdown is signaled. `stream` is any byte transport; record boundaries
/// come only from the terminator scan, never from read sizes.
pub async fn run_session<S>(
    stream: S,
    store: Arc<Store>,
    mut shutdown: watch::Receiver<bool>,
    max_pending: usize,
) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut reader, mut writer) = tokio::io::split(stream);
    let mut assembler = Assembler::new(max_pending);
    let mut chunk = vec![0u8; RECV_CHUNK];

    loop {
        let n = tokio::select! {
            read = reader.read(&mut chunk) => read?,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    debug!("session stopping on shutdown signal");
                    return Ok(());
                }
                continue;
            }
        };
        if n == 0 {
            return Ok(());
        }

        for frame in assembler.push(&chunk[..n])? {
            match frame {
                Frame::Record(record) => dispatch(&record, &store, &mut writer).await?,
                Frame::Overflow(raw) => {
                    // Bounded working buffer ran out with no terminator:
                    // flush the raw bytes as-is rather than stall or drop.
                    warn!("receive buffer overflow, flushing {} raw bytes", raw.len());
                    store.commit(&raw)?;
                }
            }
        }
    }
}

/// Handle one complete record.
async fn dispatch<W>(record: &[u8], store: &Store, writer: &mut W) -> Result<(), SessionError>
where
    W: AsyncWrite + Unpin,
{
    match classify(record) {
        Ok(Record::Seek { command, offset }) => match store.seek(command, offset) {
            Ok(position) => {
                debug!("seek to command {} offset {} -> {}", command, offset, position);
                stream_from(store, writer, position).await
            }
            Err(StoreError::OutOfRange { .. }) => {
                warn!("seek out of range: command {}, offset {}", command, offset);
                writer.write_all(ERR_OUT_OF_RANGE).await?;
                writer.flush().await?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        },
        Ok(Record::Data(bytes)) => {
            debug!("committing {} byte record", bytes.len());
            store.commit(bytes)?;
            // Every writer observes the full accumulated history on every
            // write, not just its own record.
            stream_from(store, writer, 0).await
        }
        Err(RecordError::MalformedSeek) => {
            warn!("malformed seek command ({} bytes)", record.len());
            writer.write_all(ERR_MALFORMED).await?;
            writer.flush().await?;
            Ok(())
        }
    }
}

/// Stream the log from `position` to end of data. Each chunk is copied out
/// under the store lock and sent after the lock is released; the cursor
/// advances by what each call actually returned, so entry boundaries fall
/// where they may.
async fn stream_from<W>(store: &Store, writer: &mut W, mut position: u64) -> Result<(), SessionError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(bytes) = store.read_at(position, STREAM_CHUNK) {
        writer.write_all(&bytes).await?;
        position += bytes.len() as u64;
    }
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
