/*
    log.rs - Append-only replicated log

    An ordered, deduplicated sequence of entries. The log is a
    join-semilattice under merge: commutative, associative, idempotent.
    That is the whole convergence argument; replicas that exchange deltas
    in any order, any number of times, end up with the same sequence.

    Invariant: entries are strictly sorted by (clock, author). Both
    mutators (append, merge) preserve it, and inbound wire deltas are
    checked against it before they reach merge.
*/

use super::clock::Clock;
use super::entry::Entry;
use serde::{Deserialize, Serialize};

/// A replica's view of the conversation.
///
/// `Log` is the plain value type: `since` snapshots and wire deltas are
/// detached `Log` instances sharing nothing with their source. The live,
/// concurrently written instance of a node is always wrapped in
/// [`SharedLog`](super::shared::SharedLog).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Entries in canonical order. Serialized as `messages` on the wire.
    #[serde(rename = "messages")]
    entries: Vec<Entry>,
}

impl Log {
    /// Create an empty log.
    pub fn new() -> Self {
        Log {
            entries: Vec::new(),
        }
    }

    /// Append a locally authored entry and return its assigned clock.
    ///
    /// The assigned clock is one past the highest clock the log holds, so
    /// the first entry of an empty log gets clock 1. The new entry always
    /// sorts last.
    pub fn append(&mut self, author: &str, text: &str) -> Clock {
        let clock = match self.entries.last() {
            Some(last) => last.clock.increment(),
            None => Clock::ZERO.increment(),
        };
        self.entries.push(Entry::new(clock, author, text));
        debug_assert!(self.is_canonical(), "append broke canonical order");
        clock
    }

    /// Snapshot of every entry with clock strictly greater than `t`.
    ///
    /// Canonical order makes the qualifying entries a contiguous suffix,
    /// so this is a binary search plus a copy of the tail.
    pub fn since(&self, t: Clock) -> Log {
        let start = self.entries.partition_point(|e| e.clock <= t);
        Log {
            entries: self.entries[start..].to_vec(),
        }
    }

    /// Clock of the newest entry, or zero for an empty log.
    pub fn last_message_at(&self) -> Clock {
        self.entries.last().map(|e| e.clock).unwrap_or(Clock::ZERO)
    }

    /// Merge another replica's entries into this log, in place.
    ///
    /// A linear merge of two sorted runs. When both sides hold an entry
    /// with the same (clock, author) key, the copy already in `self` is
    /// kept. Returns the number of entries adopted from `other`.
    pub fn merge(&mut self, other: &Log) -> usize {
        if other.entries.is_empty() {
            return 0;
        }

        let ours = std::mem::take(&mut self.entries);
        let before = ours.len();
        let mut merged = Vec::with_capacity(ours.len() + other.entries.len());
        let mut theirs = other.entries.iter().peekable();

        for entry in ours {
            // Take every remote entry that sorts before this one, and skip
            // their copy of a key we already hold.
            while let Some(remote) = theirs.next_if(|r| r.key() <= entry.key()) {
                if remote.key() < entry.key() {
                    merged.push(remote.clone());
                }
            }
            merged.push(entry);
        }
        merged.extend(theirs.cloned());

        self.entries = merged;
        debug_assert!(self.is_canonical(), "merge broke canonical order");
        self.entries.len() - before
    }

    /// Entries in canonical order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when entries are strictly sorted by (clock, author).
    ///
    /// Always true for logs built through `append` and `merge`; used to
    /// validate deltas decoded from the wire before they are merged.
    pub fn is_canonical(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].key() < w[1].key())
    }
}
