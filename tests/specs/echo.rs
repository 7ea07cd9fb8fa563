// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write records, read the full-history echo back.

use std::time::Duration;

use crate::prelude::*;

#[test]
fn write_echoes_full_history() {
    let daemon = DaemonUnderTest::spawn(&[]);
    let mut conn = daemon.connect();

    send(&mut conn, b"hello\n");
    assert_eq!(read_exact_len(&mut conn, 6), b"hello\n");

    // The echo is the whole accumulated log, not just the new record.
    send(&mut conn, b"world\n");
    assert_eq!(read_exact_len(&mut conn, 12), b"hello\nworld\n");
}

#[test]
fn records_split_across_sends_assemble() {
    let daemon = DaemonUnderTest::spawn(&[]);
    let mut conn = daemon.connect();

    send(&mut conn, b"hel");
    send(&mut conn, b"lo");
    send(&mut conn, b"\n");
    assert_eq!(read_exact_len(&mut conn, 6), b"hello\n");
}

#[test]
fn one_send_may_carry_many_records() {
    let daemon = DaemonUnderTest::spawn(&[]);
    let mut conn = daemon.connect();

    send(&mut conn, b"a\nb\n");
    // Two echoes: "a\n" after the first record, then "a\nb\n".
    assert_eq!(read_exact_len(&mut conn, 6), b"a\na\nb\n");
}

#[test]
fn history_is_shared_across_connections() {
    let daemon = DaemonUnderTest::spawn(&[]);

    let mut first = daemon.connect();
    send(&mut first, b"one\n");
    assert_eq!(read_exact_len(&mut first, 4), b"one\n");
    drop(first);

    // A new connection appends to the same log.
    let mut second = daemon.connect();
    send(&mut second, b"two\n");
    assert_eq!(read_exact_len(&mut second, 8), b"one\ntwo\n");
}

#[test]
fn idle_connection_sees_nothing_unsolicited() {
    let daemon = DaemonUnderTest::spawn(&[]);
    let mut writer = daemon.connect();
    let mut idle = daemon.connect();

    send(&mut writer, b"ping\n");
    assert_eq!(read_exact_len(&mut writer, 5), b"ping\n");

    // Readers observe the log when they read; nothing is pushed.
    assert!(read_until_idle(&mut idle, Duration::from_millis(300)).is_empty());
}
