//! Desired-state types.
//!
//! These are constructed once per run from the parsed configuration and are
//! never mutated afterwards.

pub mod alias_spec;
pub mod desired_state;
pub mod index_body;
pub mod index_spec;

pub use alias_spec::AliasSpec;
pub use desired_state::DesiredState;
pub use index_body::IndexBody;
pub use index_spec::{IndexSpec, IndexStatus, MappingSource, ReindexPolicy, ReindexTrigger};

use std::fmt::Display;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer};

/// Deserialize a closed enumeration from its string form.
///
/// A missing, null or empty value yields the enum's default; anything else
/// must name a variant.
pub(crate) fn enum_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(value) => value.parse().map_err(de::Error::custom),
    }
}
