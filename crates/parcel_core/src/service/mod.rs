//! Read-side services built on the registry.
//!
//! # Responsibility
//! - Aggregate current package state for reporting callers.
//! - Keep aggregation out of the temporal core.

pub mod report;
