// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Seek commands: reposition and stream, or get an `ERR:` line.

use crate::prelude::*;

#[test]
fn seek_streams_from_command() {
    let daemon = DaemonUnderTest::spawn(&[]);
    let mut conn = daemon.connect();

    send(&mut conn, b"aa\n");
    read_exact_len(&mut conn, 3);
    send(&mut conn, b"bb\n");
    read_exact_len(&mut conn, 6);
    send(&mut conn, b"cc\n");
    read_exact_len(&mut conn, 9);

    send(&mut conn, b"SEEK:1,0\n");
    assert_eq!(read_exact_len(&mut conn, 6), b"bb\ncc\n");

    send(&mut conn, b"SEEK:2,1\n");
    assert_eq!(read_exact_len(&mut conn, 2), b"c\n");
}

#[test]
fn seek_out_of_range_gets_err_line() {
    let daemon = DaemonUnderTest::spawn(&[]);
    let mut conn = daemon.connect();

    send(&mut conn, b"aa\n");
    read_exact_len(&mut conn, 3);

    send(&mut conn, b"SEEK:5,0\n");
    assert_eq!(read_exact_len(&mut conn, 17), b"ERR:out-of-range\n");

    // The session survives the failed seek and the log is unchanged.
    send(&mut conn, b"bb\n");
    assert_eq!(read_exact_len(&mut conn, 6), b"aa\nbb\n");
}

#[test]
fn malformed_seek_gets_err_line_and_commits_nothing() {
    let daemon = DaemonUnderTest::spawn(&[]);
    let mut conn = daemon.connect();

    send(&mut conn, b"SEEK:1,oops\n");
    assert_eq!(read_exact_len(&mut conn, 19), b"ERR:malformed-seek\n");

    // Had the malformed record been committed as data, this echo would
    // start with it.
    send(&mut conn, b"data\n");
    assert_eq!(read_exact_len(&mut conn, 5), b"data\n");
}
