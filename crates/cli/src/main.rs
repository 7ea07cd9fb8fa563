// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! cmdlog: one-shot client for the cmdlog daemon.
//!
//! Sends a single data record or seek command and prints whatever the
//! daemon streams back.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;

use std::io::Write as _;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cmdlog", version, about = "Client for the cmdlog daemon")]
struct Args {
    /// Daemon address.
    #[arg(long, default_value = "127.0.0.1:9000")]
    addr: SocketAddr,

    /// Idle window in milliseconds before a response counts as complete.
    #[arg(long, default_value_t = 500)]
    idle_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Append a record and print the echoed log.
    Send {
        /// Record text; the terminator is appended.
        text: String,
    },
    /// Seek to (command, offset) and print the log from there.
    Seek {
        /// Zero-based index of the target record, oldest first.
        command: usize,
        /// Byte offset within that record.
        offset: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let payload = match &args.command {
        Command::Send { text } => client::data_record(text),
        Command::Seek { command, offset } => client::seek_record(*command, *offset),
    };

    let response = client::exchange(args.addr, &payload, Duration::from_millis(args.idle_ms))
        .await
        .with_context(|| format!("exchange with {} failed", args.addr))?;

    std::io::stdout().write_all(&response)?;
    Ok(())
}
