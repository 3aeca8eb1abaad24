/*
    clock.rs - Lamport clock

    A scalar logical timestamp. Events are ordered by counter value, never
    by wall time. Appending increments the highest clock a log holds;
    merging replicas takes the pairwise maximum, so a clock never moves
    backwards past something it has observed.

    Clock values are only comparable within one log's namespace.
*/

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar Lamport clock. Zero means no messages observed yet.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Clock(pub u64);

impl Clock {
    /// The clock of a log that has observed nothing.
    pub const ZERO: Clock = Clock(0);

    /// The clock for the event following this one.
    pub fn increment(self) -> Clock {
        Clock(self.0 + 1)
    }

    /// Lamport join: the larger of the two clocks.
    pub fn merge(self, other: Clock) -> Clock {
        Clock(self.0.max(other.0))
    }

    /// Raw counter value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Clock {
    fn from(value: u64) -> Self {
        Clock(value)
    }
}
