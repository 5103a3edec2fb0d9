//! Time markers shared by timelines, packages and the registry.
//!
//! # Responsibility
//! - Name the effective-time type used across the core.
//! - Represent the "now" query and "not yet delivered" sentinels as tagged
//!   values instead of reserved numbers.
//!
//! # Invariants
//! - `DeliveryState::Pending` keeps a package present at every instant.
//! - A `QueryTime::Now` never carries a concrete timestamp.

use std::fmt::{Display, Formatter};

/// Effective instant of an event, in caller-defined units (seconds in the
/// replay fixtures).
///
/// Kept signed so that negative caller input can be rejected explicitly by
/// registry validation instead of wrapping.
pub type Timestamp = i64;

/// Instant a read is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryTime {
    /// Most recently effective state on every timeline.
    Now,
    /// State as of the given instant (inclusive).
    At(Timestamp),
}

impl QueryTime {
    pub fn is_now(self) -> bool {
        matches!(self, Self::Now)
    }
}

impl Display for QueryTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Now => write!(f, "now"),
            Self::At(at) => write!(f, "{at}"),
        }
    }
}

/// Value carried by a package's delivery timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryState {
    /// Not delivered; behaves as an unbounded delivery instant.
    Pending,
    /// Delivered starting at this instant.
    DeliveredAt(Timestamp),
}

impl DeliveryState {
    /// Returns whether a package carrying this state is still present at `at`.
    pub fn is_present_at(self, at: Timestamp) -> bool {
        match self {
            Self::Pending => true,
            Self::DeliveredAt(delivered_at) => at < delivered_at,
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::{DeliveryState, QueryTime};

    #[test]
    fn presence_window_excludes_delivery_instant() {
        let state = DeliveryState::DeliveredAt(10);
        assert!(state.is_present_at(9));
        assert!(!state.is_present_at(10));
        assert!(!state.is_present_at(11));
        assert!(!state.is_pending());
        assert!(DeliveryState::Pending.is_present_at(i64::MAX));
    }

    #[test]
    fn query_time_renders_for_log_lines() {
        assert!(QueryTime::Now.is_now());
        assert!(!QueryTime::At(7).is_now());
        assert_eq!(QueryTime::At(7).to_string(), "7");
        assert_eq!(QueryTime::Now.to_string(), "now");
    }
}
