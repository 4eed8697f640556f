//! Pre-check error types.

use index_keeper_repository::EngineError;
use thiserror::Error;

/// Errors from the dry-run pre-check.
#[derive(Error, Debug)]
pub enum PreCheckError {
    #[error("check index {index} exists: {source}")]
    IndexLookup {
        index: String,
        #[source]
        source: EngineError,
    },

    #[error("pre create index {index} using probe {probe}: {source}")]
    ProbeCreate {
        index: String,
        probe: String,
        #[source]
        source: EngineError,
    },

    #[error("delete probe {probe} for index {index}: {source}")]
    ProbeDelete {
        index: String,
        probe: String,
        #[source]
        source: EngineError,
    },

    #[error("check index {index} exists for alias {alias}: {source}")]
    AliasMemberLookup {
        alias: String,
        index: String,
        #[source]
        source: EngineError,
    },

    #[error("index {index} for alias {alias} is not found")]
    MissingAliasMember { alias: String, index: String },
}

impl PreCheckError {
    /// The declared index or alias the failure concerns.
    pub fn entity(&self) -> &str {
        match self {
            Self::IndexLookup { index, .. }
            | Self::ProbeCreate { index, .. }
            | Self::ProbeDelete { index, .. } => index,
            Self::AliasMemberLookup { alias, .. } | Self::MissingAliasMember { alias, .. } => alias,
        }
    }

    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            Self::IndexLookup { source, .. }
            | Self::ProbeCreate { source, .. }
            | Self::ProbeDelete { source, .. }
            | Self::AliasMemberLookup { source, .. } => Some(source),
            Self::MissingAliasMember { .. } => None,
        }
    }
}
