//! Tie-break sequence generator.
//!
//! # Invariants
//! - Every value returned by `next` is strictly greater than all previous
//!   values from the same sequencer.
//! - The counter is never reset or decremented, including by rollback.

/// Insertion sequence number attached to every timeline event.
pub type SequenceNo = u64;

/// Monotonic counter owned by one registry and threaded through appends.
///
/// Carries no wall-clock meaning; it only orders events that share an
/// effective time.
#[derive(Debug, Default)]
pub struct Sequencer {
    last: SequenceNo,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws the next sequence number.
    pub fn next(&mut self) -> SequenceNo {
        self.last += 1;
        self.last
    }

    /// Returns the most recently drawn value (`0` before the first draw).
    pub fn last(&self) -> SequenceNo {
        self.last
    }
}
