//! Registry behavior switches.

/// Construction-time configuration for `PackageRegistry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// When `true`, current-state reads and current-state updates treat a
    /// package whose latest delivery event has happened as absent. When
    /// `false`, current-state calls ignore delivery entirely.
    pub current_queries_respect_delivery: bool,
    /// When `true`, an id removed by rollback may be created again. When
    /// `false`, an id can be created at most once for the registry lifetime.
    pub reuse_rolled_back_ids: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            current_queries_respect_delivery: true,
            reuse_rolled_back_ids: false,
        }
    }
}

impl RegistryConfig {
    /// Compatibility profile for older scenario suites: current-state calls
    /// skip delivery gating and rollback frees the ids of removed packages.
    pub fn legacy() -> Self {
        Self {
            current_queries_respect_delivery: false,
            reuse_rolled_back_ids: true,
        }
    }
}
