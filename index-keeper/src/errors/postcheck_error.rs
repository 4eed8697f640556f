//! Post-check error types.

use std::fmt;

use index_keeper_repository::EngineError;
use thiserror::Error;

/// Kind of declared entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Index,
    Alias,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => f.write_str("index"),
            Self::Alias => f.write_str("alias"),
        }
    }
}

/// Errors from the post-run existence check.
#[derive(Error, Debug)]
pub enum PostCheckError {
    #[error("check created {kind} {name} exists: {source}")]
    Lookup {
        kind: EntityKind,
        name: String,
        #[source]
        source: EngineError,
    },

    #[error("created {kind} {name} is not found")]
    Missing { kind: EntityKind, name: String },
}

impl PostCheckError {
    pub fn entity(&self) -> (EntityKind, &str) {
        match self {
            Self::Lookup { kind, name, .. } | Self::Missing { kind, name } => (*kind, name),
        }
    }

    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            Self::Lookup { source, .. } => Some(source),
            Self::Missing { .. } => None,
        }
    }
}
