//! Temporal domain model for tracked packages.
//!
//! # Responsibility
//! - Define the event timeline used for every tracked attribute.
//! - Define the package aggregate that composes timelines into snapshots.
//!
//! # Invariants
//! - Writes flow package -> timeline; reads flow back the same way.
//! - Ordering among same-instant events comes only from `Sequencer`.

pub mod package;
pub mod sequencer;
pub mod time;
pub mod timeline;
