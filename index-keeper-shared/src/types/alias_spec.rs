//! Declared alias specification.

use serde::Deserialize;

/// A declared alias and the ordered indices it must resolve to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasSpec {
    pub name: String,
    #[serde(default, rename = "index")]
    pub members: Vec<String>,
}

impl AliasSpec {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}
