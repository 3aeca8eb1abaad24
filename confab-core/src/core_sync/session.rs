/*
    session.rs - Per-connection sync driver

    One session per peer connection, two concurrent loops over the two
    halves of the stream:

      push - every push_interval, send since(cursor) if non-empty and
             advance the cursor past what was sent. A delta bigger than
             the frame cap goes out as several capped frames.
      pull - block on the next inbound delta and merge it into the
             shared log.

    The directions are independent: push never waits on pull and vice
    versa, so a silent peer in one direction cannot stall replication in
    the other. The first loop to hit an I/O failure trips the session's
    close signal, the other loop observes it on its next select, and the
    session counts as closed only once both loops have returned.

    The cursor belongs to the push loop alone. Advancing it on received
    deltas would be wrong: a remote clock can run ahead of entries this
    node has not pushed yet, and skipping those would break convergence.
*/

use super::errors::SyncResult;
use super::wire;
use crate::config::SyncConfig;
use crate::core_log::{Clock, SharedLog};
use crate::metrics;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Session-wide close signal.
///
/// Either loop trips it on failure; the registry holds a clone per session
/// to force a close on shutdown. Tripping is idempotent, and the flag
/// stays readable for watchers that subscribe after the trip.
#[derive(Debug, Clone)]
pub struct CloseSignal {
    tripped: Arc<AtomicBool>,
    tx: broadcast::Sender<()>,
}

impl CloseSignal {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        CloseSignal {
            tripped: Arc::new(AtomicBool::new(false)),
            tx,
        }
    }

    /// Signal close to every loop watching this session.
    pub fn trip(&self) {
        self.tripped.store(true, Ordering::SeqCst);
        let _ = self.tx.send(());
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }

    pub fn watch(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }
}

impl Default for CloseSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Protocol driver for one peer connection.
pub struct SyncSession {
    conn_id: u64,
    peer: SocketAddr,
    cursor: Clock,
    log: SharedLog,
    config: SyncConfig,
}

impl SyncSession {
    /// A fresh session starts with a zero cursor, so the first push offers
    /// the peer the full local history and the merge dedupe sorts out the
    /// overlap.
    pub fn new(conn_id: u64, peer: SocketAddr, log: SharedLog, config: SyncConfig) -> Self {
        SyncSession {
            conn_id,
            peer,
            cursor: Clock::ZERO,
            log,
            config,
        }
    }

    /// Drive the session until both loops have terminated.
    ///
    /// Returns only after push and pull have both stopped, whether the
    /// cause was a peer failure or `close` being tripped externally.
    pub async fn run(self, stream: TcpStream, close: CloseSignal) {
        let SyncSession {
            conn_id,
            peer,
            cursor,
            log,
            config,
        } = self;
        let (read_half, write_half) = stream.into_split();

        let push = {
            let log = log.clone();
            let close = close.clone();
            let period = config.push_interval;
            let max_frame = config.max_frame_len;
            tokio::spawn(async move {
                match push_loop(&log, write_half, cursor, period, max_frame, &close).await {
                    Ok(()) => debug!(conn_id, peer = %peer, "push loop stopped"),
                    Err(e) => {
                        info!(conn_id, peer = %peer, error = %e, "push loop ended");
                        metrics::session_error("push");
                    }
                }
                close.trip();
            })
        };

        let pull = {
            let close = close.clone();
            let max_frame = config.max_frame_len;
            tokio::spawn(async move {
                match pull_loop(&log, read_half, max_frame, &close).await {
                    Ok(()) => debug!(conn_id, peer = %peer, "pull loop stopped"),
                    Err(e) if e.is_clean_close() => {
                        info!(conn_id, peer = %peer, "peer disconnected")
                    }
                    Err(e) => {
                        warn!(conn_id, peer = %peer, error = %e, "pull loop failed");
                        metrics::session_error("pull");
                    }
                }
                close.trip();
            })
        };

        // Completion barrier: the session is closed only once both
        // directions are done.
        let (push_res, pull_res) = tokio::join!(push, pull);
        if let Err(e) = push_res {
            warn!(conn_id, error = %e, "push task aborted");
        }
        if let Err(e) = pull_res {
            warn!(conn_id, error = %e, "pull task aborted");
        }
        debug!(conn_id, peer = %peer, "session fully closed");
    }
}

/// Outbound direction: offer the peer everything past the cursor, on a
/// fixed cadence. Empty deltas are skipped; the cursor still only ever
/// advances to clocks that were actually offered. The wire layer splits
/// a delta over `max_frame` at entry boundaries, so a long backlog never
/// produces a frame the peer would have to reject.
async fn push_loop(
    log: &SharedLog,
    mut io: OwnedWriteHalf,
    mut cursor: Clock,
    period: Duration,
    max_frame: usize,
    close: &CloseSignal,
) -> SyncResult<()> {
    let mut ticker = tokio::time::interval(period);
    let mut closed = close.watch();

    loop {
        // Catches a trip that landed before this loop subscribed.
        if close.is_tripped() {
            return Ok(());
        }
        tokio::select! {
            _ = ticker.tick() => {
                let delta = log.since(cursor).await;
                cursor = cursor.merge(delta.last_message_at());
                if delta.is_empty() {
                    continue;
                }
                wire::send_delta(&mut io, &delta, max_frame).await?;
                metrics::delta_sent(delta.len());
                debug!(entries = delta.len(), cursor = %cursor, "delta pushed");
            }
            _ = closed.recv() => return Ok(()),
        }
    }
}

/// Inbound direction: merge deltas as they arrive. Blocking on the read
/// is intentional; transport closure is what eventually unblocks it.
async fn pull_loop(
    log: &SharedLog,
    mut io: OwnedReadHalf,
    max_frame: usize,
    close: &CloseSignal,
) -> SyncResult<()> {
    let mut closed = close.watch();

    loop {
        if close.is_tripped() {
            return Ok(());
        }
        tokio::select! {
            inbound = wire::recv_delta(&mut io, max_frame) => {
                let delta = inbound?;
                metrics::delta_received(delta.len());
                let adopted = log.merge(&delta).await;
                debug!(entries = delta.len(), adopted, "delta merged");
            }
            _ = closed.recv() => return Ok(()),
        }
    }
}
