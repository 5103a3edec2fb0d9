//! Core temporal registry for parcel tracking.
//! This crate is the single source of truth for "as of" package state.

pub mod logging;
pub mod model;
pub mod registry;
pub mod replay;
pub mod service;

pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogSink,
};
pub use model::package::{Package, PackageId, PackageSnapshot};
pub use model::sequencer::{SequenceNo, Sequencer};
pub use model::time::{DeliveryState, QueryTime, Timestamp};
pub use model::timeline::Timeline;
pub use registry::config::RegistryConfig;
pub use registry::error::{ArgumentError, ErrorKind, RegistryError, RegistryResult};
pub use registry::package_registry::{PackageRegistry, RollbackSummary};
pub use replay::command::{outputs_match, Command};
pub use replay::runner::{CaseReport, ReplayRunner, StepMismatch, SuiteReport};
pub use replay::scenario::{
    load_suite, parse_suite, ReplayError, ReplayResult, ScenarioStep, ScenarioSuite,
};
pub use service::report::{average_weight, list_ids_by_destination, top_n_heaviest, RankedPackage};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
