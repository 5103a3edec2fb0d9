//! Scenario replay harness.
//!
//! # Responsibility
//! - Load recorded call scenarios from JSON.
//! - Decode and validate each call before it reaches the registry.
//! - Compare actual outputs with recorded ones.
//!
//! # Invariants
//! - Each case starts from an empty registry.
//! - Rejected calls are rendered as `{"error": "<kind>"}` values.

pub mod command;
pub mod runner;
pub mod scenario;
