//! Convergence error types.

use std::fmt;

use index_keeper_repository::EngineError;
use thiserror::Error;

/// The sub-operation of index convergence that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOperation {
    Exists,
    Create,
    GetMapping,
    PutMapping,
    GetSettings,
    PutSettings,
    Reindex,
    Open,
    Close,
}

impl fmt::Display for IndexOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exists => "existence check",
            Self::Create => "create",
            Self::GetMapping => "get mapping",
            Self::PutMapping => "put mapping",
            Self::GetSettings => "get settings",
            Self::PutSettings => "put settings",
            Self::Reindex => "reindex",
            Self::Open => "open",
            Self::Close => "close",
        };
        f.write_str(name)
    }
}

/// Errors from converging a single index.
#[derive(Error, Debug)]
pub enum ConvergenceError {
    #[error("index {index}: {operation} failed: {source}")]
    Operation {
        index: String,
        operation: IndexOperation,
        #[source]
        source: EngineError,
    },

    #[error("index {index}: reindex source {source_index} is not found")]
    MissingReindexSource { index: String, source_index: String },
}

impl ConvergenceError {
    pub(crate) fn operation(index: &str, operation: IndexOperation, source: EngineError) -> Self {
        Self::Operation {
            index: index.to_string(),
            operation,
            source,
        }
    }

    /// The declared index the failure concerns.
    pub fn index(&self) -> &str {
        match self {
            Self::Operation { index, .. } | Self::MissingReindexSource { index, .. } => index,
        }
    }

    /// The failed sub-operation. A missing reindex source counts as a reindex failure.
    pub fn failed_operation(&self) -> IndexOperation {
        match self {
            Self::Operation { operation, .. } => *operation,
            Self::MissingReindexSource { .. } => IndexOperation::Reindex,
        }
    }

    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            Self::Operation { source, .. } => Some(source),
            Self::MissingReindexSource { .. } => None,
        }
    }
}
