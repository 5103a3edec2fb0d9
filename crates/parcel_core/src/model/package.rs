//! Package entity model.
//!
//! # Responsibility
//! - Own the weight, destination and delivery timelines of one package.
//! - Compose timeline reads into presence and snapshot answers.
//!
//! # Invariants
//! - `created_at` never changes after construction.
//! - Every timeline holds a seed event at `created_at` until a rollback
//!   horizon earlier than `created_at` removes the package entirely.
//! - The delivery timeline stores the delivery instant itself, not a flag.

use crate::model::sequencer::Sequencer;
use crate::model::time::{DeliveryState, QueryTime, Timestamp};
use crate::model::timeline::Timeline;
use serde::{Deserialize, Serialize};

/// Caller-provided tracking identifier.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type PackageId = String;

/// Attribute values of a package at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSnapshot {
    /// Weight in grams.
    pub weight: u64,
    /// Destination exactly as provided (case-sensitive).
    pub destination: String,
}

/// Temporal record of one tracked package.
#[derive(Debug, Clone)]
pub struct Package {
    created_at: Timestamp,
    weight: Timeline<u64>,
    destination: Timeline<String>,
    delivery: Timeline<DeliveryState>,
}

impl Package {
    /// Creates a package whose three timelines are seeded at `created_at`.
    ///
    /// Each seed draws its own sequence number.
    pub fn create(
        sequencer: &mut Sequencer,
        created_at: Timestamp,
        weight: u64,
        destination: impl Into<String>,
    ) -> Self {
        let mut package = Self {
            created_at,
            weight: Timeline::new(),
            destination: Timeline::new(),
            delivery: Timeline::new(),
        };
        package
            .delivery
            .append(sequencer, created_at, DeliveryState::Pending);
        package.weight.append(sequencer, created_at, weight);
        package
            .destination
            .append(sequencer, created_at, destination.into());
        package
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Records a weight change effective at `at`.
    pub fn set_weight(&mut self, sequencer: &mut Sequencer, weight: u64, at: Timestamp) {
        self.weight.append(sequencer, at, weight);
    }

    /// Records a destination change effective at `at`.
    pub fn set_destination(
        &mut self,
        sequencer: &mut Sequencer,
        destination: impl Into<String>,
        at: Timestamp,
    ) {
        self.destination.append(sequencer, at, destination.into());
    }

    /// Records delivery starting at `at`.
    pub fn mark_delivered(&mut self, sequencer: &mut Sequencer, at: Timestamp) {
        self.delivery.append(sequencer, at, DeliveryState::DeliveredAt(at));
    }

    pub fn weight_at(&self, query: QueryTime) -> Option<u64> {
        self.weight.read_at(query).copied()
    }

    pub fn destination_at(&self, query: QueryTime) -> Option<&str> {
        self.destination.read_at(query).map(String::as_str)
    }

    /// Returns whether the package is present at `query`.
    ///
    /// A concrete instant `t` requires `created_at <= t < delivered_at(t)`.
    /// `Now` only requires that the most recently effective delivery state
    /// is still pending.
    pub fn is_present_at(&self, query: QueryTime) -> bool {
        match query {
            QueryTime::Now => self
                .delivery
                .latest()
                .is_some_and(|state| state.is_pending()),
            QueryTime::At(at) => {
                self.created_at <= at
                    && self
                        .delivery
                        .read_at(query)
                        .is_some_and(|state| state.is_present_at(at))
            }
        }
    }

    /// Returns whether the package has been created by `at`, regardless of
    /// delivery.
    pub fn is_created_by(&self, at: Timestamp) -> bool {
        self.created_at <= at
    }

    /// Returns weight and destination at `query` when the package is present.
    pub fn snapshot_at(&self, query: QueryTime) -> Option<PackageSnapshot> {
        if !self.is_present_at(query) {
            return None;
        }
        self.read_snapshot(query)
    }

    /// Returns the most recently effective weight and destination, ignoring
    /// delivery.
    pub fn latest_snapshot(&self) -> Option<PackageSnapshot> {
        self.read_snapshot(QueryTime::Now)
    }

    /// Truncates every timeline to `horizon`.
    ///
    /// Returns the number of discarded events across all timelines.
    pub fn rollback(&mut self, horizon: Timestamp) -> usize {
        self.delivery.truncate(horizon)
            + self.weight.truncate(horizon)
            + self.destination.truncate(horizon)
    }

    fn read_snapshot(&self, query: QueryTime) -> Option<PackageSnapshot> {
        Some(PackageSnapshot {
            weight: self.weight_at(query)?,
            destination: self.destination_at(query)?.to_string(),
        })
    }
}
