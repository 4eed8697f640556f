//! Request types for engine operations.

use serde::Serialize;
use serde_json::{json, Value};

/// Wildcard that matches every index in an alias action.
pub const ALL_INDICES: &str = "*";

/// A single action in an alias update batch.
///
/// Serializes to the engine's `{"remove": {...}}` / `{"add": {...}}` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasAction {
    Remove { index: String, alias: String },
    Add { index: String, alias: String },
}

/// An ordered batch of alias actions, applied atomically by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AliasActions {
    pub actions: Vec<AliasAction>,
}

impl AliasActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detach `alias` from every index.
    pub fn remove_all(mut self, alias: impl Into<String>) -> Self {
        self.actions.push(AliasAction::Remove {
            index: ALL_INDICES.to_string(),
            alias: alias.into(),
        });
        self
    }

    /// Attach `alias` to `index`.
    pub fn add(mut self, index: impl Into<String>, alias: impl Into<String>) -> Self {
        self.actions.push(AliasAction::Add {
            index: index.into(),
            alias: alias.into(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Indices the batch attaches an alias to, in order.
    pub fn added_indices(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().filter_map(|action| match action {
            AliasAction::Add { index, .. } => Some(index.as_str()),
            AliasAction::Remove { .. } => None,
        })
    }
}

/// A request to copy every document from one index into another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReindexRequest {
    pub source: String,
    pub dest: String,
    pub slices: u32,
    pub wait_for_completion: bool,
}

impl ReindexRequest {
    /// The request body for the engine's reindex endpoint.
    pub fn body(&self) -> Value {
        json!({
            "source": { "index": self.source },
            "dest": { "index": self.dest }
        })
    }
}
