/*
    entry.rs - Log entry model

    One immutable record in the replicated log. The pair (clock, author) is
    the entry's logical key: a well-formed log never holds two entries with
    the same key, and canonical order sorts by clock with author as the
    tie-break. Entries are value objects; nothing mutates them after append.
*/

use super::clock::Clock;
use serde::{Deserialize, Serialize};

/// A single replicated record: who wrote what, at which logical time.
///
/// Field names on the wire (`whomst`, `txt`) are part of the sync protocol
/// and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    /// Logical timestamp assigned by the appending node.
    pub clock: Clock,

    /// Author identity, taken verbatim from the appending process.
    #[serde(rename = "whomst")]
    pub author: String,

    /// Message body.
    #[serde(rename = "txt")]
    pub text: String,
}

impl Entry {
    pub fn new(clock: Clock, author: impl Into<String>, text: impl Into<String>) -> Self {
        Entry {
            clock,
            author: author.into(),
            text: text.into(),
        }
    }

    /// The entry's logical key. Uniqueness of this pair is a log invariant;
    /// it is also the canonical sort key.
    pub fn key(&self) -> (Clock, &str) {
        (self.clock, self.author.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_orders_by_clock_then_author() {
        let early = Entry::new(Clock(1), "zed", "first");
        let late = Entry::new(Clock(2), "amy", "second");
        assert!(early.key() < late.key());

        let a = Entry::new(Clock(3), "amy", "tie");
        let z = Entry::new(Clock(3), "zed", "tie");
        assert!(a.key() < z.key());
    }

    #[test]
    fn test_key_ignores_text() {
        let a = Entry::new(Clock(5), "nora", "one text");
        let b = Entry::new(Clock(5), "nora", "another text");
        assert_eq!(a.key(), b.key());
        assert_ne!(a, b);
    }

    #[test]
    fn test_wire_field_names() {
        let entry = Entry::new(Clock(7), "ada", "hi there");
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"clock":7,"whomst":"ada","txt":"hi there"}"#);

        let back: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_author_and_text_roundtrip_unicode() {
        let entry = Entry::new(Clock(1), "毛玉", "héllo ∞");
        let json = serde_json::to_string(&entry).unwrap();
        let back: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
