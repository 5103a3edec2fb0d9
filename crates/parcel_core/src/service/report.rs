//! Current-state reports over the package registry.
//!
//! # Responsibility
//! - Provide list, ranking and average queries for reporting callers.
//!
//! # Invariants
//! - Reports read only through `PackageRegistry::get`, so they observe the
//!   same visibility rules as current-state lookups.
//! - Output ordering is deterministic.

use crate::model::package::{PackageId, PackageSnapshot};
use crate::registry::error::{ArgumentError, RegistryResult};
use crate::registry::package_registry::PackageRegistry;
use serde::{Deserialize, Serialize};

/// One row of the heaviest-packages ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedPackage {
    pub id: PackageId,
    pub weight: u64,
    pub destination: String,
}

/// Lists ids currently headed to `destination`, ascending.
///
/// Destination comparison is exact and case-sensitive.
///
/// # Errors
/// - `InvalidArgument` when `destination` is empty.
pub fn list_ids_by_destination(
    registry: &PackageRegistry,
    destination: &str,
) -> RegistryResult<Vec<PackageId>> {
    if destination.is_empty() {
        return Err(ArgumentError::EmptyDestination.into());
    }

    Ok(current_snapshots(registry)
        .filter(|(_, snapshot)| snapshot.destination == destination)
        .map(|(id, _)| id.to_string())
        .collect())
}

/// Returns up to `n` packages ordered by weight descending, then id
/// ascending.
///
/// # Errors
/// - `InvalidArgument` when `n` is negative.
pub fn top_n_heaviest(registry: &PackageRegistry, n: i64) -> RegistryResult<Vec<RankedPackage>> {
    let limit = usize::try_from(n).map_err(|_| ArgumentError::NegativeCount(n))?;

    let mut ranked: Vec<RankedPackage> = current_snapshots(registry)
        .map(|(id, snapshot)| RankedPackage {
            id: id.to_string(),
            weight: snapshot.weight,
            destination: snapshot.destination,
        })
        .collect();
    ranked.sort_by(|left, right| {
        right
            .weight
            .cmp(&left.weight)
            .then_with(|| left.id.cmp(&right.id))
    });
    ranked.truncate(limit);
    Ok(ranked)
}

/// Mean current weight rounded half-to-even to two decimals, or `None` when
/// no package is visible.
pub fn average_weight(registry: &PackageRegistry) -> Option<f64> {
    let (count, total) = current_snapshots(registry)
        .fold((0_u64, 0_u128), |(count, total), (_, snapshot)| {
            (count + 1, total + u128::from(snapshot.weight))
        });
    if count == 0 {
        return None;
    }

    let mean = total as f64 / count as f64;
    Some((mean * 100.0).round_ties_even() / 100.0)
}

fn current_snapshots(
    registry: &PackageRegistry,
) -> impl Iterator<Item = (&str, PackageSnapshot)> + '_ {
    registry
        .ids()
        .filter_map(move |id| registry.get(id).map(|snapshot| (id, snapshot)))
}
