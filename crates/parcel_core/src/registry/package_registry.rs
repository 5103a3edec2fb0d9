//! In-memory temporal package registry.
//!
//! # Responsibility
//! - Own every package and the sequencer shared by their timelines.
//! - Validate input before any mutation.
//! - Apply global rollback across all packages.
//!
//! # Invariants
//! - A failed call leaves the registry unchanged.
//! - The sequencer is never rewound, including by rollback.
//! - `clock` is the greatest effective time accepted so far, capped by the
//!   last rollback horizon; current-state writes take effect at `clock`.

use crate::model::package::{Package, PackageId, PackageSnapshot};
use crate::model::sequencer::Sequencer;
use crate::model::time::{QueryTime, Timestamp};
use crate::registry::config::RegistryConfig;
use crate::registry::error::{ArgumentError, RegistryError, RegistryResult};
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of a global rollback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollbackSummary {
    /// Packages created after the horizon and removed entirely.
    pub removed_packages: usize,
    /// Events discarded from the timelines of surviving packages.
    pub discarded_events: usize,
}

/// Registry of temporally tracked packages.
#[derive(Debug, Default)]
pub struct PackageRegistry {
    config: RegistryConfig,
    sequencer: Sequencer,
    packages: BTreeMap<PackageId, Package>,
    retired_ids: BTreeSet<PackageId>,
    clock: Timestamp,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Creates a package effective at `at`.
    ///
    /// # Errors
    /// - `InvalidArgument` for negative `at` or `weight`, empty `id` or
    ///   `destination`, or an id that was already created.
    pub fn create_at(
        &mut self,
        at: Timestamp,
        id: &str,
        weight: i64,
        destination: &str,
    ) -> RegistryResult<()> {
        let result = self.create_with(QueryTime::At(at), id, weight, destination);
        log_write("package_create", id, QueryTime::At(at), &result);
        result
    }

    /// Creates a package effective at the registry clock.
    pub fn create(&mut self, id: &str, weight: i64, destination: &str) -> RegistryResult<()> {
        let result = self.create_with(QueryTime::Now, id, weight, destination);
        log_write("package_create", id, QueryTime::Now, &result);
        result
    }

    /// Records a weight change effective at `at`.
    ///
    /// # Errors
    /// - `InvalidArgument` for negative `at` or `weight`, or an empty `id`.
    /// - `NotFound` when the package is not present at `at`.
    pub fn set_weight_at(&mut self, at: Timestamp, id: &str, weight: i64) -> RegistryResult<()> {
        let result = self.set_weight_with(QueryTime::At(at), id, weight);
        log_write("package_set_weight", id, QueryTime::At(at), &result);
        result
    }

    /// Records a weight change effective at the registry clock.
    pub fn set_weight(&mut self, id: &str, weight: i64) -> RegistryResult<()> {
        let result = self.set_weight_with(QueryTime::Now, id, weight);
        log_write("package_set_weight", id, QueryTime::Now, &result);
        result
    }

    /// Records a destination change effective at `at`.
    ///
    /// # Errors
    /// - `InvalidArgument` for negative `at`, or an empty `id` or
    ///   `destination`.
    /// - `NotFound` when the package is not present at `at`.
    pub fn redirect_at(
        &mut self,
        at: Timestamp,
        id: &str,
        destination: &str,
    ) -> RegistryResult<()> {
        let result = self.redirect_with(QueryTime::At(at), id, destination);
        log_write("package_redirect", id, QueryTime::At(at), &result);
        result
    }

    /// Records a destination change effective at the registry clock.
    pub fn redirect(&mut self, id: &str, destination: &str) -> RegistryResult<()> {
        let result = self.redirect_with(QueryTime::Now, id, destination);
        log_write("package_redirect", id, QueryTime::Now, &result);
        result
    }

    /// Marks a package delivered starting at `at`.
    ///
    /// Only identity and creation time are checked: delivering an already
    /// delivered package records another delivery event.
    ///
    /// # Errors
    /// - `InvalidArgument` for negative `at` or an empty `id`.
    /// - `NotFound` when the id is unknown or created after `at`.
    pub fn mark_delivered_at(&mut self, at: Timestamp, id: &str) -> RegistryResult<()> {
        let result = self.mark_delivered_with(at, id);
        log_write("package_deliver", id, QueryTime::At(at), &result);
        result
    }

    /// Returns the package state as of `at`.
    ///
    /// `Ok(None)` when the id was never created, is not yet created at `at`,
    /// or was delivered by `at`.
    ///
    /// # Errors
    /// - `InvalidArgument` for negative `at`.
    pub fn get_at(&self, at: Timestamp, id: &str) -> RegistryResult<Option<PackageSnapshot>> {
        validate_timestamp(at)?;
        Ok(self.snapshot(QueryTime::At(at), id))
    }

    /// Returns the current package state (most recently effective events).
    pub fn get(&self, id: &str) -> Option<PackageSnapshot> {
        self.snapshot(QueryTime::Now, id)
    }

    /// Rolls the whole registry back to `horizon`.
    ///
    /// Packages created after `horizon` are removed permanently; every other
    /// package loses the events effective after `horizon`. Events exactly at
    /// `horizon` survive.
    ///
    /// # Errors
    /// - `InvalidArgument` for negative `horizon`.
    pub fn rollback(&mut self, horizon: Timestamp) -> RegistryResult<RollbackSummary> {
        if let Err(err) = validate_timestamp(horizon) {
            let err = RegistryError::from(err);
            debug!(
                "event=rollback module=registry status=rejected error_code={}",
                err.kind().as_str()
            );
            return Err(err);
        }

        let reuse_ids = self.config.reuse_rolled_back_ids;
        let retired_ids = &mut self.retired_ids;
        let mut summary = RollbackSummary::default();

        self.packages.retain(|id, package| {
            if package.created_at() <= horizon {
                return true;
            }
            summary.removed_packages += 1;
            if !reuse_ids {
                retired_ids.insert(id.clone());
            }
            false
        });

        for package in self.packages.values_mut() {
            summary.discarded_events += package.rollback(horizon);
        }
        self.clock = self.clock.min(horizon);

        info!(
            "event=rollback module=registry status=ok horizon={} removed_packages={} discarded_events={} remaining_packages={}",
            horizon,
            summary.removed_packages,
            summary.discarded_events,
            self.packages.len()
        );
        Ok(summary)
    }

    /// Sorted ids of every stored package, delivered or not.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.packages.keys().map(String::as_str)
    }

    /// Returns the stored package record, if any.
    pub fn package(&self, id: &str) -> Option<&Package> {
        self.packages.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.packages.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Instant at which current-state writes take effect.
    pub fn clock(&self) -> Timestamp {
        self.clock
    }

    fn create_with(
        &mut self,
        when: QueryTime,
        id: &str,
        weight: i64,
        destination: &str,
    ) -> RegistryResult<()> {
        let at = self.effective_time(when)?;
        validate_id(id)?;
        if self.packages.contains_key(id) || self.retired_ids.contains(id) {
            return Err(ArgumentError::DuplicateId(id.to_string()).into());
        }
        let weight = validate_weight(weight)?;
        validate_destination(destination)?;

        let package = Package::create(&mut self.sequencer, at, weight, destination);
        self.packages.insert(id.to_string(), package);
        self.advance_clock(at);
        Ok(())
    }

    fn set_weight_with(&mut self, when: QueryTime, id: &str, weight: i64) -> RegistryResult<()> {
        let at = self.effective_time(when)?;
        validate_id(id)?;
        self.ensure_present(id, when)?;
        let weight = validate_weight(weight)?;

        let package = stored_mut(&mut self.packages, id)?;
        package.set_weight(&mut self.sequencer, weight, at);
        self.advance_clock(at);
        Ok(())
    }

    fn redirect_with(
        &mut self,
        when: QueryTime,
        id: &str,
        destination: &str,
    ) -> RegistryResult<()> {
        let at = self.effective_time(when)?;
        validate_id(id)?;
        self.ensure_present(id, when)?;
        validate_destination(destination)?;

        let package = stored_mut(&mut self.packages, id)?;
        package.set_destination(&mut self.sequencer, destination, at);
        self.advance_clock(at);
        Ok(())
    }

    fn mark_delivered_with(&mut self, at: Timestamp, id: &str) -> RegistryResult<()> {
        validate_timestamp(at)?;
        validate_id(id)?;
        let created = self
            .packages
            .get(id)
            .is_some_and(|package| package.is_created_by(at));
        if !created {
            return Err(RegistryError::NotFound(id.to_string()));
        }

        let package = stored_mut(&mut self.packages, id)?;
        package.mark_delivered(&mut self.sequencer, at);
        self.advance_clock(at);
        Ok(())
    }

    fn snapshot(&self, query: QueryTime, id: &str) -> Option<PackageSnapshot> {
        let package = self.packages.get(id)?;
        if query.is_now() && !self.config.current_queries_respect_delivery {
            return package.latest_snapshot();
        }
        package.snapshot_at(query)
    }

    fn ensure_present(&self, id: &str, when: QueryTime) -> RegistryResult<()> {
        let present = match self.packages.get(id) {
            None => false,
            Some(_) if when.is_now() && !self.config.current_queries_respect_delivery => true,
            Some(package) => package.is_present_at(when),
        };
        if present {
            Ok(())
        } else {
            Err(RegistryError::NotFound(id.to_string()))
        }
    }

    fn effective_time(&self, when: QueryTime) -> RegistryResult<Timestamp> {
        match when {
            QueryTime::Now => Ok(self.clock),
            QueryTime::At(at) => {
                validate_timestamp(at)?;
                Ok(at)
            }
        }
    }

    fn advance_clock(&mut self, at: Timestamp) {
        self.clock = self.clock.max(at);
    }
}

fn stored_mut<'a>(
    packages: &'a mut BTreeMap<PackageId, Package>,
    id: &str,
) -> RegistryResult<&'a mut Package> {
    packages
        .get_mut(id)
        .ok_or_else(|| RegistryError::NotFound(id.to_string()))
}

fn validate_timestamp(at: Timestamp) -> Result<(), ArgumentError> {
    if at < 0 {
        return Err(ArgumentError::NegativeTimestamp(at));
    }
    Ok(())
}

fn validate_id(id: &str) -> Result<(), ArgumentError> {
    if id.is_empty() {
        return Err(ArgumentError::EmptyId);
    }
    Ok(())
}

fn validate_weight(weight: i64) -> Result<u64, ArgumentError> {
    u64::try_from(weight).map_err(|_| ArgumentError::NegativeWeight(weight))
}

fn validate_destination(destination: &str) -> Result<(), ArgumentError> {
    if destination.is_empty() {
        return Err(ArgumentError::EmptyDestination);
    }
    Ok(())
}

fn log_write(event: &str, id: &str, when: QueryTime, result: &RegistryResult<()>) {
    match result {
        Ok(()) => debug!(
            "event={} module=registry status=ok id={} at={}",
            event, id, when
        ),
        Err(err) => debug!(
            "event={} module=registry status=rejected at={} error_code={}",
            event,
            when,
            err.kind().as_str()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{PackageRegistry, RollbackSummary};
    use crate::model::package::PackageSnapshot;
    use crate::registry::config::RegistryConfig;
    use crate::registry::error::{ArgumentError, ErrorKind, RegistryError};

    fn snapshot(weight: u64, destination: &str) -> PackageSnapshot {
        PackageSnapshot {
            weight,
            destination: destination.to_string(),
        }
    }

    #[test]
    fn current_writes_take_effect_at_registry_clock() {
        let mut registry = PackageRegistry::new();
        registry
            .create_at(7, "A", 10, "X")
            .expect("create should succeed");
        assert_eq!(registry.clock(), 7);

        registry
            .create("B", 5, "Y")
            .expect("current create should succeed");
        assert_eq!(registry.package("B").map(|p| p.created_at()), Some(7));
        assert_eq!(registry.get_at(6, "B").expect("valid query"), None);
        assert_eq!(
            registry.get_at(7, "B").expect("valid query"),
            Some(snapshot(5, "Y"))
        );
    }

    #[test]
    fn current_write_wins_over_same_instant_history() {
        let mut registry = PackageRegistry::new();
        registry
            .create_at(3, "A", 10, "X")
            .expect("create should succeed");
        registry
            .set_weight_at(3, "A", 11)
            .expect("update should succeed");
        registry
            .set_weight("A", 12)
            .expect("current update should succeed");

        assert_eq!(registry.get("A"), Some(snapshot(12, "X")));
        assert_eq!(
            registry.get_at(3, "A").expect("valid query"),
            Some(snapshot(12, "X"))
        );
    }

    #[test]
    fn failed_calls_do_not_touch_sequencer_or_state() {
        let mut registry = PackageRegistry::new();
        registry
            .create_at(0, "A", 10, "X")
            .expect("create should succeed");
        let sequence_before = registry.sequencer.last();

        let err = registry
            .set_weight_at(2, "A", -1)
            .expect_err("negative weight must fail");
        assert_eq!(
            err,
            RegistryError::InvalidArgument(ArgumentError::NegativeWeight(-1))
        );
        let err = registry
            .redirect_at(2, "A", "")
            .expect_err("empty destination must fail");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        assert_eq!(registry.sequencer.last(), sequence_before);
        assert_eq!(registry.clock(), 0);
        assert_eq!(registry.get("A"), Some(snapshot(10, "X")));
    }

    #[test]
    fn rollback_reports_removed_and_discarded_counts() {
        let mut registry = PackageRegistry::new();
        registry.create_at(0, "A", 10, "X").expect("create A");
        registry.set_weight_at(6, "A", 20).expect("update A");
        registry.create_at(8, "B", 1, "Y").expect("create B");

        let summary = registry.rollback(5).expect("rollback should succeed");
        assert_eq!(
            summary,
            RollbackSummary {
                removed_packages: 1,
                discarded_events: 1,
            }
        );
        assert_eq!(registry.clock(), 5);
        assert!(!registry.contains("B"));
    }

    #[test]
    fn rollback_never_rewinds_sequencer() {
        let mut registry = PackageRegistry::new();
        registry.create_at(0, "A", 10, "X").expect("create A");
        registry.set_weight_at(5, "A", 20).expect("update A");
        let sequence_before = registry.sequencer.last();

        registry.rollback(4).expect("rollback should succeed");
        assert_eq!(registry.sequencer.last(), sequence_before);

        registry
            .set_weight_at(4, "A", 30)
            .expect("update after rollback");
        assert!(registry.sequencer.last() > sequence_before);
        assert_eq!(
            registry.get_at(4, "A").expect("valid query"),
            Some(snapshot(30, "X"))
        );
    }

    #[test]
    fn rolled_back_ids_stay_reserved_by_default() {
        let mut registry = PackageRegistry::new();
        registry.create_at(10, "A", 1, "X").expect("create A");
        registry.rollback(5).expect("rollback should succeed");

        let err = registry
            .create_at(1, "A", 1, "X")
            .expect_err("re-creating a rolled back id must fail");
        assert!(err.is_duplicate());
    }

    #[test]
    fn legacy_config_frees_rolled_back_ids() {
        let mut registry = PackageRegistry::with_config(RegistryConfig::legacy());
        registry.create_at(10, "A", 1, "X").expect("create A");
        registry.rollback(5).expect("rollback should succeed");

        registry
            .create_at(1, "A", 2, "Y")
            .expect("legacy mode should allow re-creation");
        assert_eq!(
            registry.get_at(1, "A").expect("valid query"),
            Some(snapshot(2, "Y"))
        );
    }
}
