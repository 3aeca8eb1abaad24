/*
    shared.rs - Shared handle to a node's live log

    One node owns exactly one live log, touched concurrently by every sync
    session plus the local input and display tasks. Coordination is a
    single reader/writer lock: mutators take exclusive access, queries take
    shared access. Callers only ever get whole operations; the entry
    sequence of the live instance is never exposed around the lock, which
    is what rules out torn reads mid-merge.
*/

use super::clock::Clock;
use super::log::Log;
use crate::metrics;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cloneable handle to the node-wide replicated log.
///
/// Clones share one underlying log. Every clone can be used from any task.
#[derive(Debug, Clone, Default)]
pub struct SharedLog {
    inner: Arc<RwLock<Log>>,
}

impl SharedLog {
    pub fn new() -> Self {
        SharedLog {
            inner: Arc::new(RwLock::new(Log::new())),
        }
    }

    /// Append a locally authored entry and return its assigned clock.
    ///
    /// The write lock serializes concurrent appenders, so clocks handed
    /// out by one node are unique and strictly increasing.
    pub async fn append(&self, author: &str, text: &str) -> Clock {
        let clock = self.inner.write().await.append(author, text);
        metrics::entry_appended();
        clock
    }

    /// Detached snapshot of every entry with clock strictly greater than `t`.
    pub async fn since(&self, t: Clock) -> Log {
        self.inner.read().await.since(t)
    }

    /// Merge a delta received from a peer. Returns the number of entries
    /// adopted.
    pub async fn merge(&self, delta: &Log) -> usize {
        let adopted = self.inner.write().await.merge(delta);
        metrics::entries_merged(adopted);
        adopted
    }

    /// Clock of the newest entry, zero when the log is empty.
    pub async fn last_message_at(&self) -> Clock {
        self.inner.read().await.last_message_at()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Full snapshot of the current state. Test and display helper; the
    /// sync path only ever ships `since` deltas.
    pub async fn snapshot(&self) -> Log {
        self.inner.read().await.clone()
    }
}
