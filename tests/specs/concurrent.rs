// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interleaved writers against one shared log.

use std::io::Read;
use std::net::Shutdown;
use std::time::Duration;

use crate::prelude::*;

const WRITERS: usize = 2;
const RECORDS: usize = 100;

#[test]
fn interleaved_writers_retain_last_capacity_records() {
    // Default capacity is 10.
    let daemon = DaemonUnderTest::spawn(&[]);

    std::thread::scope(|scope| {
        for writer in 0..WRITERS {
            let mut conn = daemon.connect();
            scope.spawn(move || {
                for seq in 0..RECORDS {
                    // Fixed-width records: every retained entry is 6 bytes.
                    send(&mut conn, format!("{}:{:03}\n", writer, seq).as_bytes());
                }
                // Half-close, then drain echoes to EOF. The server reads all
                // sent bytes before it sees the FIN, so every record is
                // committed by the time the stream ends.
                conn.shutdown(Shutdown::Write).expect("shutdown write half");
                let mut sink = Vec::new();
                conn.read_to_end(&mut sink).expect("drain echoes");
            });
        }
    });

    // One more record tags the end of history; its echo is the final state.
    let mut conn = daemon.connect();
    send(&mut conn, b"fin\n");
    // 9 surviving writer records (6 bytes each) + "fin\n".
    let echo = read_until_idle(&mut conn, Duration::from_millis(500));
    assert_eq!(echo.len(), 9 * 6 + 4);

    let text = String::from_utf8(echo).expect("utf8 log");
    let lines: Vec<&str> = text.split_terminator('\n').collect();
    assert_eq!(lines.len(), 10);
    assert_eq!(*lines.last().expect("fin line"), "fin");

    // Eviction is oldest-first, so each writer's surviving records are a
    // contiguous tail of its own sequence ending at its last record.
    let mut seqs: Vec<Vec<usize>> = vec![Vec::new(); WRITERS];
    for line in &lines[..lines.len() - 1] {
        let (writer, seq) = line.split_once(':').expect("writer:seq line");
        let writer: usize = writer.parse().expect("writer tag");
        seqs[writer].push(seq.parse().expect("sequence number"));
    }
    for per_writer in &seqs {
        for pair in per_writer.windows(2) {
            assert_eq!(pair[1], pair[0] + 1);
        }
        if let Some(&last) = per_writer.last() {
            assert_eq!(last, RECORDS - 1);
        }
    }
}
