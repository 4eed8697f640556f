//! Configuration and dependency initialization.

mod dependencies;

pub use dependencies::Dependencies;

/// Default prefix for pre-check probe index names.
pub const DEFAULT_PROBE_PREFIX: &str = "index-keeper";

/// Configuration for the reconciler.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Prefix of probe index names; a random UUID is appended.
    pub probe_prefix: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            probe_prefix: DEFAULT_PROBE_PREFIX.to_string(),
        }
    }
}

impl ReconcilerConfig {
    pub fn with_probe_prefix(probe_prefix: impl Into<String>) -> Self {
        Self {
            probe_prefix: probe_prefix.into(),
        }
    }
}
