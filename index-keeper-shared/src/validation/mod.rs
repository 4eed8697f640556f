//! Static validation of a desired state.
//!
//! Validation never talks to the cluster. Rules run in a fixed order and the
//! first violation is returned:
//!
//! 1. index names are non-empty and unique
//! 2. mapping documents load and are JSON objects
//! 3. enumerated values are valid (enforced while parsing) and reindex
//!    slices are positive
//! 4. no index both reindexes from a source and is declared closed
//! 5. alias names are non-empty, unique and distinct from index names, and
//!    every alias has at least one non-empty member

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::debug;

use crate::errors::ValidationError;
use crate::types::{AliasSpec, DesiredState, IndexBody, IndexSpec};

/// A desired state that passed validation, with its mapping documents loaded.
#[derive(Debug, Clone)]
pub struct ValidatedState {
    state: DesiredState,
    bodies: HashMap<String, IndexBody>,
}

impl ValidatedState {
    pub fn state(&self) -> &DesiredState {
        &self.state
    }

    pub fn indices(&self) -> &[IndexSpec] {
        &self.state.indices
    }

    pub fn aliases(&self) -> &[AliasSpec] {
        &self.state.aliases
    }

    /// The loaded mapping/settings document for an index, if it declares one.
    pub fn body(&self, index: &str) -> Option<&IndexBody> {
        self.bodies.get(index)
    }
}

/// Validate a desired state, resolving relative mapping paths against `base_dir`.
pub fn validate(state: DesiredState, base_dir: &Path) -> Result<ValidatedState, ValidationError> {
    check_index_names(&state.indices)?;
    let bodies = load_bodies(&state.indices, base_dir)?;
    check_reindex_policies(&state.indices)?;
    check_aliases(&state)?;

    debug!(
        indices = state.indices.len(),
        aliases = state.aliases.len(),
        "Desired state validated"
    );

    Ok(ValidatedState { state, bodies })
}

fn check_index_names(indices: &[IndexSpec]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(indices.len());
    for index in indices {
        if index.name.is_empty() {
            return Err(ValidationError::EmptyIndexName);
        }
        if !seen.insert(index.name.as_str()) {
            return Err(ValidationError::DuplicateIndexName(index.name.clone()));
        }
    }
    Ok(())
}

fn load_bodies(
    indices: &[IndexSpec],
    base_dir: &Path,
) -> Result<HashMap<String, IndexBody>, ValidationError> {
    let mut bodies = HashMap::new();
    for index in indices {
        let Some(source) = index.mapping_source() else {
            continue;
        };
        let body = IndexBody::load(source, base_dir).map_err(|source| {
            ValidationError::InvalidMapping {
                index: index.name.clone(),
                source,
            }
        })?;
        bodies.insert(index.name.clone(), body);
    }
    Ok(bodies)
}

fn check_reindex_policies(indices: &[IndexSpec]) -> Result<(), ValidationError> {
    for index in indices {
        if let Some(policy) = &index.reindex {
            if policy.slices == 0 {
                return Err(ValidationError::InvalidSlices {
                    index: index.name.clone(),
                });
            }
        }
    }

    for index in indices {
        let Some(policy) = index.active_reindex() else {
            continue;
        };
        if policy.source == index.name {
            return Err(ValidationError::ReindexFromSelf(index.name.clone()));
        }
        if index.is_closed() {
            return Err(ValidationError::ReindexIntoClosedIndex(index.name.clone()));
        }
    }
    Ok(())
}

fn check_aliases(state: &DesiredState) -> Result<(), ValidationError> {
    let index_names: HashSet<&str> = state.indices.iter().map(|i| i.name.as_str()).collect();
    let mut seen = HashSet::with_capacity(state.aliases.len());

    for alias in &state.aliases {
        if alias.name.is_empty() {
            return Err(ValidationError::EmptyAliasName);
        }
        if index_names.contains(alias.name.as_str()) {
            return Err(ValidationError::AliasCollidesWithIndex(alias.name.clone()));
        }
        if !seen.insert(alias.name.as_str()) {
            return Err(ValidationError::DuplicateAliasName(alias.name.clone()));
        }
        if alias.members.is_empty() {
            return Err(ValidationError::EmptyAliasMembers(alias.name.clone()));
        }
        if alias.members.iter().any(String::is_empty) {
            return Err(ValidationError::EmptyAliasMember(alias.name.clone()));
        }
    }
    Ok(())
}
