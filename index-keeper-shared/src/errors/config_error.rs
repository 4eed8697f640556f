//! Errors raised while reading the desired state and its mapping documents.

use std::path::PathBuf;

use thiserror::Error;

use super::ValidationError;

/// Errors from turning raw configuration input into a validated desired state.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration source could not be read.
    #[error("Read error: {0}")]
    ReadError(#[from] std::io::Error),

    /// The configuration is not valid YAML or does not have the expected shape.
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// The configuration parsed but violates a validation rule.
    #[error(transparent)]
    ValidationError(#[from] ValidationError),
}

/// Errors from loading a mapping/settings document.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("read mapping file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("mapping json is invalid: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("mapping document must be a JSON object")]
    NotAnObject,
}
