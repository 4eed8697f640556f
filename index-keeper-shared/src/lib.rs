//! # Index Keeper Shared
//!
//! This crate defines the desired-state model consumed by the reconciliation
//! engine: declared indices and aliases, the YAML format they are read from,
//! the mapping/settings documents they reference, and the static validator
//! that runs before any cluster contact.

pub mod errors;
pub mod types;
pub mod validation;

pub use errors::{ConfigError, MappingError, ValidationError};
pub use types::{
    AliasSpec, DesiredState, IndexBody, IndexSpec, IndexStatus, MappingSource, ReindexPolicy,
    ReindexTrigger,
};
pub use validation::{validate, ValidatedState};
