//! Per-attribute event timeline.
//!
//! # Responsibility
//! - Keep one attribute's history ordered by `(effective_at, sequence)`.
//! - Answer point-in-time reads and suffix truncation for rollback.
//!
//! # Invariants
//! - `events` is sorted ascending by `(effective_at, sequence)` at all times.
//! - Sequence numbers are unique within a timeline.
//! - Appends may land anywhere in the history, not only at the end.

use crate::model::sequencer::{SequenceNo, Sequencer};
use crate::model::time::{QueryTime, Timestamp};

/// One recorded attribute change.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Event<V> {
    effective_at: Timestamp,
    sequence: SequenceNo,
    value: V,
}

impl<V> Event<V> {
    fn key(&self) -> (Timestamp, SequenceNo) {
        (self.effective_at, self.sequence)
    }
}

/// Ordered event log for one attribute of one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline<V> {
    events: Vec<Event<V>>,
}

impl<V> Default for Timeline<V> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<V> Timeline<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` as effective at `effective_at`.
    ///
    /// The drawn sequence number is greater than any already present, so the
    /// new event sorts after every event with the same effective time.
    /// Returns the sequence number assigned to the event.
    pub fn append(
        &mut self,
        sequencer: &mut Sequencer,
        effective_at: Timestamp,
        value: V,
    ) -> SequenceNo {
        let sequence = sequencer.next();
        let event = Event {
            effective_at,
            sequence,
            value,
        };
        let key = event.key();
        let position = self.events.partition_point(|event| event.key() <= key);
        self.events.insert(position, event);
        sequence
    }

    /// Returns the value in effect at `query`.
    ///
    /// `QueryTime::Now` resolves to the event with the greatest ordering key.
    /// A concrete instant resolves to the greatest key whose effective time is
    /// `<= at`; same-instant events resolve to the highest sequence.
    pub fn read_at(&self, query: QueryTime) -> Option<&V> {
        match query {
            QueryTime::Now => self.latest(),
            QueryTime::At(at) => {
                let end = self.visible_len(at);
                end.checked_sub(1).map(|index| &self.events[index].value)
            }
        }
    }

    /// Returns the most recently effective value.
    pub fn latest(&self) -> Option<&V> {
        self.events.last().map(|event| &event.value)
    }

    /// Drops every event effective after `horizon`.
    ///
    /// Events exactly at `horizon` are all kept. Returns the number of
    /// discarded events.
    pub fn truncate(&mut self, horizon: Timestamp) -> usize {
        let keep = self.visible_len(horizon);
        let discarded = self.events.len() - keep;
        self.events.truncate(keep);
        discarded
    }

    fn visible_len(&self, at: Timestamp) -> usize {
        self.events.partition_point(|event| event.effective_at <= at)
    }
}
