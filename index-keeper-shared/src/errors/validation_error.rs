//! Validation error types.
//!
//! Every variant names the entity that broke the rule so the operator can
//! find it in the configuration.

use thiserror::Error;

use super::MappingError;

/// A violated static validation rule.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("index name is empty")]
    EmptyIndexName,

    #[error("duplicated index name {0}")]
    DuplicateIndexName(String),

    #[error("invalid mapping for index {index}: {source}")]
    InvalidMapping {
        index: String,
        #[source]
        source: MappingError,
    },

    #[error("reindex slices for index {index} must be at least 1")]
    InvalidSlices { index: String },

    #[error("index {0} cannot reindex from itself")]
    ReindexFromSelf(String),

    #[error("index {0} is declared closed but has a reindex source")]
    ReindexIntoClosedIndex(String),

    #[error("alias name is empty")]
    EmptyAliasName,

    #[error("alias {0} has the same name as a declared index")]
    AliasCollidesWithIndex(String),

    #[error("duplicated alias name {0}")]
    DuplicateAliasName(String),

    #[error("no indices in {0} alias")]
    EmptyAliasMembers(String),

    #[error("alias {0} has an empty index name")]
    EmptyAliasMember(String),
}

impl ValidationError {
    /// Name of the offending entity, if the rule concerns a named one.
    pub fn entity(&self) -> Option<&str> {
        match self {
            Self::EmptyIndexName | Self::EmptyAliasName => None,
            Self::DuplicateIndexName(name)
            | Self::ReindexFromSelf(name)
            | Self::ReindexIntoClosedIndex(name)
            | Self::AliasCollidesWithIndex(name)
            | Self::DuplicateAliasName(name)
            | Self::EmptyAliasMembers(name)
            | Self::EmptyAliasMember(name) => Some(name),
            Self::InvalidMapping { index, .. } | Self::InvalidSlices { index } => Some(index),
        }
    }
}
