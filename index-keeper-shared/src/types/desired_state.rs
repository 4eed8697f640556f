//! The full desired state of one run.

use std::io::Read;

use serde::Deserialize;

use super::{AliasSpec, IndexSpec};
use crate::errors::ConfigError;

/// Ordered indices and aliases declared for one run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesiredState {
    #[serde(default, rename = "index")]
    pub indices: Vec<IndexSpec>,
    #[serde(default, rename = "alias")]
    pub aliases: Vec<AliasSpec>,
}

impl DesiredState {
    pub fn new(indices: Vec<IndexSpec>, aliases: Vec<AliasSpec>) -> Self {
        Self { indices, aliases }
    }

    /// Parse a desired state from YAML text.
    ///
    /// An empty document is an empty desired state.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a desired state from a YAML stream (e.g. stdin).
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, ConfigError> {
        let mut yaml = String::new();
        reader.read_to_string(&mut yaml)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn index(&self, name: &str) -> Option<&IndexSpec> {
        self.indices.iter().find(|index| index.name == name)
    }
}
