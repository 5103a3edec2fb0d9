//! Registry of temporally tracked packages.
//!
//! # Responsibility
//! - Validate caller input and route writes to package timelines.
//! - Answer point-in-time queries and apply global rollback.
//!
//! # Invariants
//! - Validation happens before any state or sequencer change.
//! - Errors carry one of two kinds: invalid argument or not found.

pub mod config;
pub mod error;
pub mod package_registry;
