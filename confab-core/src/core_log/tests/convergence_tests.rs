/*
    Convergence tests - full replica convergence scenarios

    Tests:
    1. Two divergent replicas converge through bidirectional merge
    2. Merge order does not matter (commutativity)
    3. Merge grouping does not matter (associativity)
    4. Re-merging is a no-op (idempotence)
    5. Deltas relayed through an intermediate replica still converge
*/

use crate::core_log::{Clock, Log};

fn keys(log: &Log) -> Vec<(u64, String)> {
    log.entries()
        .iter()
        .map(|e| (e.clock.value(), e.author.clone()))
        .collect()
}

#[test]
fn test_two_replica_convergence() {
    // Two replicas diverge independently.
    let mut replica1 = Log::new();
    replica1.append("alice", "hello from one");
    replica1.append("alice", "more from one");

    let mut replica2 = Log::new();
    replica2.append("bob", "hello from two");

    // Sync: merge in both directions.
    let mut synced1 = replica1.clone();
    synced1.merge(&replica2);
    let mut synced2 = replica2.clone();
    synced2.merge(&replica1);

    // Both converge to the same canonical sequence.
    assert_eq!(keys(&synced1), keys(&synced2));
    assert_eq!(synced1.len(), 3);
    assert!(synced1.is_canonical());

    // Every original entry survived on both sides.
    for replica in [&synced1, &synced2] {
        assert!(replica.entries().iter().any(|e| e.text == "hello from one"));
        assert!(replica.entries().iter().any(|e| e.text == "more from one"));
        assert!(replica.entries().iter().any(|e| e.text == "hello from two"));
    }
}

#[test]
fn test_merge_commutative() {
    let mut a = Log::new();
    a.append("alice", "a1");
    a.append("alice", "a2");

    let mut b = Log::new();
    b.append("bob", "b1");
    b.append("bob", "b2");
    b.append("bob", "b3");

    let mut ab = a.clone();
    ab.merge(&b);
    let mut ba = b.clone();
    ba.merge(&a);

    assert_eq!(keys(&ab), keys(&ba));
    assert_eq!(ab.len(), 5);
}

#[test]
fn test_merge_associative() {
    let mut a = Log::new();
    a.append("alice", "from a");
    let mut b = Log::new();
    b.append("bob", "from b");
    let mut c = Log::new();
    c.append("carol", "from c");
    c.append("carol", "again from c");

    // (A ∪ B) ∪ C
    let mut left = a.clone();
    left.merge(&b);
    left.merge(&c);

    // A ∪ (B ∪ C)
    let mut bc = b.clone();
    bc.merge(&c);
    let mut right = a.clone();
    right.merge(&bc);

    assert_eq!(left, right);
    assert_eq!(left.len(), 4);
}

#[test]
fn test_merge_idempotent_with_self() {
    let mut log = Log::new();
    log.append("alice", "hi");
    log.append("bob", "yo");

    let before = log.clone();
    let copy = log.clone();
    let adopted = log.merge(&copy);

    assert_eq!(adopted, 0);
    assert_eq!(log, before);
    assert_eq!(log.len(), 2);
}

#[test]
fn test_merge_idempotent_with_past_state() {
    let mut log = Log::new();
    log.append("alice", "one");
    let earlier = log.clone();
    log.append("alice", "two");

    let before = log.clone();
    log.merge(&earlier);
    assert_eq!(log, before);
}

#[test]
fn test_relay_through_intermediate_replica() {
    // Entry authored at A reaches C only via B's merged state.
    let mut a = Log::new();
    a.append("alice", "origin");

    let mut b = Log::new();
    b.merge(&a.since(Clock::ZERO));
    b.append("bob", "relay note");

    let mut c = Log::new();
    c.merge(&b.since(Clock::ZERO));

    assert_eq!(c.len(), 2);
    assert!(c.entries().iter().any(|e| e.author == "alice"));
    assert!(c.entries().iter().any(|e| e.author == "bob"));
    assert_eq!(keys(&c), keys(&b));
}

#[test]
fn test_convergence_under_repeated_partial_deltas() {
    // Replicas exchanging overlapping deltas in odd orders still converge.
    let mut a = Log::new();
    a.append("alice", "a1");
    a.append("alice", "a2");
    a.append("alice", "a3");

    let mut b = Log::new();
    b.append("bob", "b1");

    let tail_a = a.since(Clock(1));
    let full_a = a.since(Clock::ZERO);

    b.merge(&tail_a);
    b.merge(&full_a);
    b.merge(&tail_a);

    a.merge(&b.since(Clock::ZERO));
    b.merge(&a.since(Clock::ZERO));

    assert_eq!(keys(&a), keys(&b));
    assert_eq!(a.len(), 4);
    assert!(a.is_canonical());
}
