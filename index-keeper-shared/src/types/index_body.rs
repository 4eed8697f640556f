//! Mapping/settings documents.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use super::MappingSource;
use crate::errors::MappingError;

/// A loaded index creation document (`settings`, `mappings`, `aliases`).
///
/// The document is sent verbatim when the index is created; the `settings`
/// and `mappings` sections are what convergence diffs against the cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexBody {
    document: Map<String, Value>,
}

impl IndexBody {
    pub fn new(document: Map<String, Value>) -> Self {
        Self { document }
    }

    /// Parse a document from JSON text. The top level must be an object.
    pub fn from_json_str(json: &str) -> Result<Self, MappingError> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(document) => Ok(Self { document }),
            _ => Err(MappingError::NotAnObject),
        }
    }

    /// Load the document a mapping source refers to.
    ///
    /// Relative paths are resolved against `base_dir`.
    pub fn load(source: &MappingSource, base_dir: &Path) -> Result<Self, MappingError> {
        match source {
            MappingSource::Inline(document) => Ok(Self::new(document.clone())),
            MappingSource::Path(path) => {
                let path = base_dir.join(path);
                let json = fs::read_to_string(&path).map_err(|source| MappingError::Read {
                    path: path.clone(),
                    source,
                })?;
                Self::from_json_str(&json)
            }
        }
    }

    pub fn settings(&self) -> Option<&Value> {
        self.section("settings")
    }

    pub fn mappings(&self) -> Option<&Value> {
        self.section("mappings")
    }

    fn section(&self, key: &str) -> Option<&Value> {
        self.document.get(key).filter(|value| !value.is_null())
    }

    /// The whole document as a JSON value, for use as a create body.
    pub fn to_value(&self) -> Value {
        Value::Object(self.document.clone())
    }
}
