// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: configuration, startup, graceful shutdown.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cmdlog_core::Store;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Ring capacity used when none is configured (the historical device value).
pub const DEFAULT_CAPACITY: usize = 10;

/// Per-session receive buffer bound before a forced flush.
pub const DEFAULT_MAX_PENDING: usize = 64 * 1024;

/// Daemon configuration, fixed at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind; port 0 picks an ephemeral port.
    pub bind_addr: SocketAddr,
    /// Number of records the log retains before evicting the oldest.
    pub capacity: usize,
    /// Receive buffer bound per session.
    pub max_pending: usize,
    /// Commit a timestamp record at this interval when set.
    pub timestamp_interval: Option<Duration>,
    /// Append logs to this file instead of stderr when set.
    pub log_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 9000)),
            capacity: DEFAULT_CAPACITY,
            max_pending: DEFAULT_MAX_PENDING,
            timestamp_interval: None,
            log_path: None,
        }
    }
}

/// Lifecycle errors.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to bind {0}: {1}")]
    BindFailed(SocketAddr, std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A started daemon: the listener, the shared store, and session
/// bookkeeping. The accept loop itself lives in the binary.
pub struct Daemon {
    pub config: Config,
    pub listener: TcpListener,
    pub store: Arc<Store>,
    /// Session tasks, joined on shutdown.
    pub sessions: JoinSet<()>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

/// Bind the listener and build the shared store.
pub async fn startup(config: Config) -> Result<Daemon, LifecycleError> {
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| LifecycleError::BindFailed(config.bind_addr, e))?;
    let store = Arc::new(Store::new(config.capacity));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    info!(
        "listening on {} (capacity {})",
        listener.local_addr()?,
        config.capacity
    );

    Ok(Daemon {
        config,
        listener,
        store,
        sessions: JoinSet::new(),
        shutdown_tx,
        shutdown_rx,
    })
}

impl Daemon {
    /// Address actually bound (resolves a requested port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, LifecycleError> {
        Ok(self.listener.local_addr()?)
    }

    /// Spawn a session task for an accepted connection.
    pub fn spawn_session(&mut self, stream: TcpStream, peer: SocketAddr) {
        info!("accepted connection from {}", peer);
        let store = Arc::clone(&self.store);
        let shutdown = self.shutdown_rx.clone();
        let max_pending = self.config.max_pending;
        self.sessions.spawn(async move {
            match crate::session::run_session(stream, store, shutdown, max_pending).await {
                Ok(()) => info!("closed connection from {}", peer),
                Err(e) => warn!("session error from {}: {}", peer, e),
            }
        });
    }

    /// Signal shutdown and wait for in-flight sessions to finish their
    /// current operation and exit. The store outlives every session.
    pub async fn shutdown(&mut self) {
        info!("shutting down, joining {} session(s)", self.sessions.len());
        let _ = self.shutdown_tx.send(true);
        while self.sessions.join_next().await.is_some() {}
        info!("daemon shutdown complete");
    }
}
