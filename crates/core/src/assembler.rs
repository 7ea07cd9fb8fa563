// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reassembly of terminator-delimited records from transport chunks.

use std::collections::TryReserveError;
use std::mem;

use thiserror::Error;

use crate::TERMINATOR;

/// Errors from record assembly.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// Allocation failed while buffering inbound bytes.
    #[error("out of memory buffering inbound bytes: {0}")]
    ResourceExhausted(#[from] TryReserveError),
}

/// Output of one [`Assembler::push`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete record, terminator included.
    Record(Vec<u8>),
    /// The raw buffer, flushed because it reached the limit with no
    /// terminator in sight. Not a well-formed record: callers append it
    /// as-is and skip classification.
    Overflow(Vec<u8>),
}

/// Per-session receive buffer. Records may arrive split across any number
/// of reads; boundaries come only from the terminator scan, never from the
/// transport.
#[derive(Debug)]
pub struct Assembler {
    buf: Vec<u8>,
    limit: usize,
}

impl Assembler {
    /// `limit` bounds the working buffer: an unterminated run of that many
    /// bytes is force-flushed as [`Frame::Overflow`] instead of growing
    /// without bound or stalling the session.
    pub fn new(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            limit,
        }
    }

    /// Append a chunk and split off every complete record.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Frame>, AssembleError> {
        self.buf.try_reserve(chunk.len())?;
        self.buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == TERMINATOR) {
            let mut record = Vec::new();
            record.try_reserve_exact(pos + 1)?;
            record.extend(self.buf.drain(..=pos));
            frames.push(Frame::Record(record));
        }

        if !self.buf.is_empty() && self.buf.len() >= self.limit {
            frames.push(Frame::Overflow(mem::take(&mut self.buf)));
        }
        Ok(frames)
    }

    /// Bytes buffered awaiting a terminator.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
#[path = "assembler_tests.rs"]
mod tests;
