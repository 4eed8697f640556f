//! # Index Keeper Repository
//!
//! This crate provides the capability interface the reconciliation engine
//! uses to talk to the search cluster, the request types that cross it, and
//! a concrete implementation for OpenSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use config::{ConnectionConfig, RetryConfig};
pub use errors::EngineError;
pub use interfaces::EngineClient;
pub use opensearch::{OpenSearchClient, RoundRobinConnectionPool};
pub use types::{AliasAction, AliasActions, ReindexRequest};
