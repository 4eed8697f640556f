//! OpenSearch implementation of the engine client.
//!
//! This module provides a concrete implementation of `EngineClient`
//! using OpenSearch as the backend.

mod client;
mod pool;

pub use client::OpenSearchClient;
pub use pool::RoundRobinConnectionPool;
