/*
    core_log subsystem - the replicated log

    The authoritative state of a node: an ordered, deduplicated sequence of
    immutable entries stamped with Lamport clocks. Merge is a conflict-free
    join, so independently evolving replicas converge on the same sequence
    no matter how their deltas interleave.
*/

pub mod clock;
pub mod entry;
pub mod log;
pub mod shared;

#[cfg(test)]
pub mod tests;

pub use clock::Clock;
pub use entry::Entry;
pub use log::Log;
pub use shared::SharedLog;
