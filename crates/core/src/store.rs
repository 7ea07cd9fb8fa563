// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shared command log: one ring, one pending buffer, one lock.

use std::collections::TryReserveError;
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use crate::ring::{Entry, RingLog};
use crate::TERMINATOR;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Seek target does not exist in the current log contents.
    #[error("seek out of range: command {command}, offset {offset}")]
    OutOfRange { command: usize, offset: usize },

    /// Allocation failed while buffering a record. Aborts the in-progress
    /// commit only; entries already in the ring stay intact.
    #[error("out of memory buffering record: {0}")]
    ResourceExhausted(#[from] TryReserveError),
}

/// The process-wide log. Every session shares one ring and one pending
/// assembly buffer: a single command history, not per-client state.
///
/// Each operation takes the lock, does its bounded work, and releases it
/// before returning; nothing here touches a transport. `read_at` hands back
/// an owned copy so callers send bytes with the lock long gone.
#[derive(Debug)]
pub struct Store {
    inner: Mutex<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    ring: RingLog,
    pending: Vec<u8>,
}

impl Store {
    /// Create a store retaining at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                ring: RingLog::new(capacity),
                pending: Vec::new(),
            }),
        }
    }

    /// Append bytes to the log. Complete records (through each terminator)
    /// move into the ring; a trailing unterminated fragment stays pending
    /// for a later commit, however many calls that takes.
    ///
    /// A record that fills the ring evicts the oldest entry, and the evicted
    /// storage is dropped before the lock is released: no reader can observe
    /// a slot whose entry is gone.
    pub fn commit(&self, bytes: &[u8]) -> Result<(), StoreError> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.pending.try_reserve(bytes.len())?;
        inner.pending.extend_from_slice(bytes);

        while let Some(pos) = inner.pending.iter().position(|&b| b == TERMINATOR) {
            let mut record = Vec::new();
            record.try_reserve_exact(pos + 1)?;
            record.extend(inner.pending.drain(..=pos));
            let evicted = inner.ring.insert(Entry::new(record));
            // Released exactly once, inside the critical section that
            // performed the eviction.
            drop(evicted);
        }
        Ok(())
    }

    /// Copy up to `max` bytes starting at global `offset`. `None` means end
    /// of data, not an error.
    ///
    /// Reads never span two entries: one call returns bytes from a single
    /// record, and the caller advances its cursor by what came back and
    /// calls again to cross into the next one.
    pub fn read_at(&self, offset: u64, max: usize) -> Option<Vec<u8>> {
        let guard = self.lock();
        let (entry, local) = guard.ring.resolve_offset(offset)?;
        let end = entry.len().min(local + max);
        Some(entry.as_bytes()[local..end].to_vec())
    }

    /// Resolve (command index, offset within that command) to a global
    /// offset for a subsequent `read_at` sequence. No state changes on
    /// failure.
    pub fn seek(&self, command: usize, offset: usize) -> Result<u64, StoreError> {
        self.lock()
            .ring
            .resolve_command_offset(command, offset)
            .ok_or(StoreError::OutOfRange { command, offset })
    }

    /// Total bytes across all retained records.
    pub fn total_size(&self) -> u64 {
        self.lock().ring.total_size()
    }

    /// Number of retained records.
    pub fn entry_count(&self) -> usize {
        self.lock().ring.entry_count()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
