//! Engine client trait definition.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::EngineError;
use crate::types::{AliasActions, ReindexRequest};

/// The capabilities the reconciliation engine needs from the search cluster.
///
/// Every call is a single request. Non-success responses are reported as
/// `EngineError::RequestFailed` carrying the status code and raw body.
/// Implementations may retry transient failures internally, but must not
/// retry anything else.
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Whether an index with exactly this name exists.
    async fn index_exists(&self, name: &str) -> Result<bool, EngineError>;

    /// Create an index, with an optional creation document
    /// (`settings`, `mappings`, `aliases`). Without one the engine applies
    /// its defaults.
    async fn create_index(&self, name: &str, body: Option<&Value>) -> Result<(), EngineError>;

    async fn delete_index(&self, name: &str) -> Result<(), EngineError>;

    /// Open an index. Opening an already-open index succeeds.
    async fn open_index(&self, name: &str) -> Result<(), EngineError>;

    /// Close an index. Closing an already-closed index succeeds.
    async fn close_index(&self, name: &str) -> Result<(), EngineError>;

    /// The live mapping of an index, without the per-index envelope.
    async fn get_mapping(&self, name: &str) -> Result<Value, EngineError>;

    async fn put_mapping(&self, name: &str, mapping: &Value) -> Result<(), EngineError>;

    /// The live settings of an index, without the per-index envelope.
    async fn get_settings(&self, name: &str) -> Result<Value, EngineError>;

    async fn put_settings(&self, name: &str, settings: &Value) -> Result<(), EngineError>;

    /// Whether an alias with exactly this name exists.
    async fn alias_exists(&self, name: &str) -> Result<bool, EngineError>;

    /// Apply a batch of alias actions atomically: either every action is
    /// applied or none is.
    async fn update_aliases(&self, actions: &AliasActions) -> Result<(), EngineError>;

    async fn reindex(&self, request: &ReindexRequest) -> Result<(), EngineError>;
}
