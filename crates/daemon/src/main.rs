// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! cmdlogd: the bounded command-log daemon.
//!
//! Accepts TCP connections, appends newline-terminated records to a shared
//! fixed-capacity ring, and streams the log back per the record protocol.

use std::io::Write as _;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use cmdlog_core::{Store, StoreError};
use cmdlog_daemon::{lifecycle, Config};
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::{interval_at, Instant};
use tracing::{error, info, warn};

/// Bounded command-log daemon.
#[derive(Debug, Parser)]
#[command(name = "cmdlogd", version, about)]
struct Args {
    /// Address to listen on (port 0 picks an ephemeral port).
    #[arg(long, default_value = "0.0.0.0:9000")]
    bind: SocketAddr,

    /// Number of records the log retains before evicting the oldest.
    #[arg(long, default_value_t = lifecycle::DEFAULT_CAPACITY, value_parser = parse_capacity)]
    capacity: usize,

    /// Per-session receive buffer bound; an unterminated run this long is
    /// flushed to the log as raw bytes.
    #[arg(long, default_value_t = lifecycle::DEFAULT_MAX_PENDING)]
    max_pending: usize,

    /// Commit a `timestamp:<RFC 2822>` record every N seconds.
    #[arg(long, value_name = "SECS")]
    timestamp_interval: Option<u64>,

    /// Append logs to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = Config {
        bind_addr: args.bind,
        capacity: args.capacity,
        max_pending: args.max_pending,
        timestamp_interval: args.timestamp_interval.map(Duration::from_secs),
        log_path: args.log_file,
    };

    let _log_guard = setup_logging(&config)?;

    let mut daemon = lifecycle::startup(config).await?;
    let addr = daemon.local_addr()?;

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    // Startup handshake for parents waiting on the port (tests, scripts).
    println!("READY {}", addr);
    std::io::stdout().flush()?;

    let stamp_period = daemon
        .config
        .timestamp_interval
        .unwrap_or(Duration::from_secs(10));
    let stamps_enabled = daemon.config.timestamp_interval.is_some();
    // First tick one full period in, not at startup.
    let mut stamp_ticker = interval_at(Instant::now() + stamp_period, stamp_period);

    loop {
        tokio::select! {
            accepted = daemon.listener.accept() => match accepted {
                Ok((stream, peer)) => daemon.spawn_session(stream, peer),
                Err(e) => error!("accept failed: {}", e),
            },

            _ = stamp_ticker.tick(), if stamps_enabled => {
                if let Err(e) = commit_timestamp(&daemon.store) {
                    warn!("timestamp record dropped: {}", e);
                }
            }

            // Reap session tasks as they finish so the set stays small.
            Some(_) = daemon.sessions.join_next() => {}

            _ = sigterm.recv() => {
                info!("caught SIGTERM, exiting");
                break;
            }
            _ = sigint.recv() => {
                info!("caught SIGINT, exiting");
                break;
            }
        }
    }

    daemon.shutdown().await;
    Ok(())
}

fn parse_capacity(value: &str) -> Result<usize, String> {
    let capacity: usize = value.parse().map_err(|e| format!("{}", e))?;
    if capacity == 0 {
        return Err("capacity must be at least 1".to_string());
    }
    Ok(capacity)
}

/// Append one `timestamp:%a, %d %b %Y %H:%M:%S %z` record through the
/// normal commit path, same as any client record.
fn commit_timestamp(store: &Store) -> Result<(), StoreError> {
    let stamp = chrono::Local::now().format("%a, %d %b %Y %H:%M:%S %z");
    store.commit(format!("timestamp:{}\n", stamp).as_bytes())
}

fn setup_logging(
    config: &Config,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match &config.log_path {
        Some(path) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let file_name = path.file_name().ok_or("log file path has no file name")?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
            Ok(None)
        }
    }
}
