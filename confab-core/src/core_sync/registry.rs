/*
    registry.rs - Peer registry and transport glue

    Owns the listening socket and the table of live connections. Every
    accepted or dialed socket gets a connection id and a fresh SyncSession;
    a session removes itself from the table once both of its loops have
    terminated. Session failures stay local: one dropped peer never
    disturbs the others or the shared log.
*/

use super::errors::SyncResult;
use super::session::{CloseSignal, SyncSession};
use crate::config::SyncConfig;
use crate::core_log::SharedLog;
use crate::metrics;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Notifications about peer connection lifecycle.
///
/// Best-effort: events are dropped rather than ever blocking the sync
/// path when the consumer falls behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    Connected { conn_id: u64, peer: SocketAddr },
    Disconnected { conn_id: u64, peer: SocketAddr },
}

struct SessionHandle {
    close: CloseSignal,
    task: JoinHandle<()>,
}

/// Tracks every live sync session of a node.
///
/// Clones share one registry. All entry points are cheap to call from any
/// task.
#[derive(Clone)]
pub struct PeerRegistry {
    log: SharedLog,
    config: SyncConfig,
    sessions: Arc<Mutex<HashMap<u64, SessionHandle>>>,
    next_conn_id: Arc<AtomicU64>,
    closer: CloseSignal,
    events_tx: mpsc::Sender<PeerEvent>,
}

impl PeerRegistry {
    /// Create a registry over the node's shared log. The returned receiver
    /// yields connection lifecycle events.
    pub fn new(log: SharedLog, config: SyncConfig) -> (Self, mpsc::Receiver<PeerEvent>) {
        let (events_tx, events_rx) = mpsc::channel(64);
        let registry = PeerRegistry {
            log,
            config,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            next_conn_id: Arc::new(AtomicU64::new(1)),
            closer: CloseSignal::new(),
            events_tx,
        };
        (registry, events_rx)
    }

    /// Bind `addr` and hand every inbound connection to a new session.
    /// Returns the bound address, which matters when `addr` asks for
    /// port 0.
    pub async fn listen(&self, addr: &str) -> SyncResult<SocketAddr> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "listening for peers");

        let registry = self.clone();
        tokio::spawn(async move {
            registry.accept_loop(listener).await;
        });
        Ok(local_addr)
    }

    /// Connect out to a peer and start syncing with it.
    ///
    /// A refused or failed dial is an error for the caller and nothing
    /// more; the registry and its other sessions are unaffected.
    pub async fn dial(&self, addr: &str) -> SyncResult<u64> {
        let stream = TcpStream::connect(addr).await?;
        let peer = stream.peer_addr()?;
        info!(peer = %peer, "dialed peer");
        Ok(self.adopt(stream, peer).await)
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Close every live session and wait until each has fully terminated,
    /// both loops included. The drain repeats until the table stays empty,
    /// so a session adopted while the shutdown is in progress is collected
    /// and awaited too.
    pub async fn shutdown(&self) {
        self.closer.trip();

        loop {
            let drained: Vec<SessionHandle> = {
                let mut sessions = self.sessions.lock().await;
                sessions.drain().map(|(_, handle)| handle).collect()
            };
            if drained.is_empty() {
                break;
            }
            for handle in &drained {
                handle.close.trip();
            }
            for handle in drained {
                if let Err(e) = handle.task.await {
                    warn!(error = %e, "session task aborted during shutdown");
                }
            }
        }

        metrics::set_active_sessions(0);
        info!("peer registry shut down");
    }

    async fn accept_loop(self, listener: TcpListener) {
        let mut closed = self.closer.watch();
        loop {
            if self.closer.is_tripped() {
                break;
            }
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        info!(peer = %peer, "accepted peer connection");
                        self.adopt(stream, peer).await;
                    }
                    Err(e) => warn!(error = %e, "accept failed"),
                },
                _ = closed.recv() => break,
            }
        }
        debug!("accept loop stopped");
    }

    /// Wrap a connected socket in a session and track it until it closes.
    async fn adopt(&self, stream: TcpStream, peer: SocketAddr) -> u64 {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::SeqCst);
        let close = CloseSignal::new();
        let session = SyncSession::new(conn_id, peer, self.log.clone(), self.config.clone());

        let task = {
            let sessions = self.sessions.clone();
            let events_tx = self.events_tx.clone();
            let close = close.clone();
            tokio::spawn(async move {
                session.run(stream, close).await;

                let remaining = {
                    let mut sessions = sessions.lock().await;
                    sessions.remove(&conn_id);
                    sessions.len()
                };
                metrics::session_closed(remaining);
                let _ = events_tx.try_send(PeerEvent::Disconnected { conn_id, peer });
                info!(conn_id, peer = %peer, "session closed");
            })
        };

        let active = {
            let mut sessions = self.sessions.lock().await;
            sessions.insert(conn_id, SessionHandle { close: close.clone(), task });
            sessions.len()
        };
        // Shutdown may have drained the table between spawn and insert;
        // a session registered that late closes itself, and a shutdown
        // still draining picks its handle up on the next pass.
        if self.closer.is_tripped() {
            close.trip();
        }

        metrics::session_opened(active);
        let _ = self.events_tx.try_send(PeerEvent::Connected { conn_id, peer });
        conn_id
    }
}
