// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record classification: seek commands vs. data.

use thiserror::Error;

use crate::TERMINATOR;

/// Literal token that marks a seek command record.
pub const SEEK_PREFIX: &str = "SEEK:";

/// One classified record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record<'a> {
    /// Reposition to (command index, byte offset within that command) and
    /// stream from there.
    Seek { command: usize, offset: usize },
    /// Anything else: bytes to append to the log, terminator included.
    Data(&'a [u8]),
}

/// Classification failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// The record carries the seek prefix but not the
    /// `SEEK:<unsigned>,<unsigned>` grammar. Reported to the session;
    /// nothing is committed.
    #[error("malformed seek command")]
    MalformedSeek,
}

/// Classify a complete, terminator-delimited record.
///
/// Seek grammar: the prefix, two base-10 unsigned integers separated by a
/// single comma, then the terminator. No whitespace, no sign, nothing else.
pub fn classify(record: &[u8]) -> Result<Record<'_>, RecordError> {
    let Some(rest) = record.strip_prefix(SEEK_PREFIX.as_bytes()) else {
        return Ok(Record::Data(record));
    };
    let Some(body) = rest.strip_suffix(&[TERMINATOR]) else {
        return Err(RecordError::MalformedSeek);
    };
    let Some(comma) = body.iter().position(|&b| b == b',') else {
        return Err(RecordError::MalformedSeek);
    };
    let command = parse_unsigned(&body[..comma]).ok_or(RecordError::MalformedSeek)?;
    let offset = parse_unsigned(&body[comma + 1..]).ok_or(RecordError::MalformedSeek)?;
    Ok(Record::Seek { command, offset })
}

/// Strict base-10 parse: at least one digit, digits only, no overflow.
fn parse_unsigned(digits: &[u8]) -> Option<usize> {
    if digits.is_empty() || !digits.iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
