//! Declared index specification.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::enum_or_default;

/// Desired open/close status of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexStatus {
    #[default]
    Open,
    Close,
}

impl FromStr for IndexStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "close" => Ok(Self::Close),
            other => Err(format!(
                "unknown index status {other:?}, expected one of: open, close"
            )),
        }
    }
}

impl fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("open"),
            Self::Close => f.write_str("close"),
        }
    }
}

/// When a reindex policy fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReindexTrigger {
    /// On every run, as long as the source exists.
    Always,
    /// Only on the run that creates the destination index.
    #[default]
    FirstCreated,
}

impl FromStr for ReindexTrigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(Self::Always),
            "firstCreated" => Ok(Self::FirstCreated),
            other => Err(format!(
                "unknown reindex trigger {other:?}, expected one of: always, firstCreated"
            )),
        }
    }
}

impl fmt::Display for ReindexTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("always"),
            Self::FirstCreated => f.write_str("firstCreated"),
        }
    }
}

fn default_slices() -> u32 {
    1
}

/// Policy for copying documents into an index from an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReindexPolicy {
    /// Index to copy documents from. Empty disables the policy.
    #[serde(default)]
    pub source: String,
    /// Number of parallel slices for the reindex task.
    #[serde(default = "default_slices")]
    pub slices: u32,
    #[serde(default, rename = "waitForCompletion")]
    pub wait_for_completion: bool,
    #[serde(default, rename = "on", deserialize_with = "enum_or_default")]
    pub trigger: ReindexTrigger,
}

impl Default for ReindexPolicy {
    fn default() -> Self {
        Self {
            source: String::new(),
            slices: default_slices(),
            wait_for_completion: false,
            trigger: ReindexTrigger::default(),
        }
    }
}

impl ReindexPolicy {
    /// Whether the policy names a source at all.
    pub fn is_enabled(&self) -> bool {
        !self.source.is_empty()
    }
}

/// Where an index's mapping/settings document comes from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MappingSource {
    /// Path to a JSON document on disk.
    Path(PathBuf),
    /// Document written directly in the configuration.
    Inline(Map<String, Value>),
}

/// A declared index.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexSpec {
    pub name: String,
    #[serde(default)]
    pub mapping: Option<MappingSource>,
    #[serde(default, deserialize_with = "enum_or_default")]
    pub status: IndexStatus,
    #[serde(default)]
    pub reindex: Option<ReindexPolicy>,
}

impl IndexSpec {
    /// Create a spec with engine-default mapping, open status and no reindex.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mapping: None,
            status: IndexStatus::Open,
            reindex: None,
        }
    }

    pub fn with_mapping(mut self, mapping: MappingSource) -> Self {
        self.mapping = Some(mapping);
        self
    }

    pub fn with_status(mut self, status: IndexStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_reindex(mut self, reindex: ReindexPolicy) -> Self {
        self.reindex = Some(reindex);
        self
    }

    /// The mapping source, treating an empty path as absent.
    pub fn mapping_source(&self) -> Option<&MappingSource> {
        match &self.mapping {
            Some(MappingSource::Path(path)) if path.as_os_str().is_empty() => None,
            other => other.as_ref(),
        }
    }

    /// The reindex policy, if one with a non-empty source is declared.
    pub fn active_reindex(&self) -> Option<&ReindexPolicy> {
        self.reindex.as_ref().filter(|policy| policy.is_enabled())
    }

    pub fn is_closed(&self) -> bool {
        self.status == IndexStatus::Close
    }
}
