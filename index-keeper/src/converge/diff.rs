//! Semantic comparison of mapping and settings documents.
//!
//! Documents are compared structurally, never as text. A desired document
//! "matches" when it is contained in the live one: the engine adds defaults
//! and read-only keys of its own, so equality would never hold.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

const INDEX_PREFIX: &str = "index.";

/// Whether every key path of `desired` is present in `live` with an equal value.
///
/// Scalars compare by their string form, since the engine echoes settings
/// back as strings. An empty desired object is satisfied by a missing key.
pub fn contains(live: &Value, desired: &Value) -> bool {
    match (live, desired) {
        (Value::Object(live), Value::Object(desired)) => desired.iter().all(|(key, want)| {
            match live.get(key) {
                Some(have) => contains(have, want),
                None => is_empty_object(want),
            }
        }),
        (Value::Array(live), Value::Array(desired)) => {
            live.len() == desired.len()
                && live.iter().zip(desired).all(|(have, want)| contains(have, want))
        }
        (Value::Null, Value::Null) => true,
        (live, desired) => match (scalar(live), scalar(desired)) {
            (Some(have), Some(want)) => have == want,
            _ => false,
        },
    }
}

/// Whether the desired mapping is already in effect.
pub fn mapping_matches(live: &Value, desired: &Value) -> bool {
    contains(live, desired)
}

/// The settings that must be pushed to reach `desired`, as a flat
/// `index.<key>` document, or `None` when nothing differs.
pub fn settings_delta(live: &Value, desired: &Value) -> Option<Value> {
    let live = flatten_settings(live);
    let delta: Map<String, Value> = flatten_settings(desired)
        .into_iter()
        .filter(|(key, want)| !live.get(key).is_some_and(|have| contains(have, want)))
        .map(|(key, want)| (format!("{INDEX_PREFIX}{key}"), want))
        .collect();

    if delta.is_empty() {
        None
    } else {
        Some(Value::Object(delta))
    }
}

/// Flatten a settings document into dotted keys without the `index.` prefix.
///
/// `{"index": {"number_of_replicas": 1}}`, `{"number_of_replicas": 1}` and
/// `{"index.number_of_replicas": 1}` all flatten to `number_of_replicas`.
/// Empty objects contribute no keys.
pub fn flatten_settings(settings: &Value) -> BTreeMap<String, Value> {
    let mut flat = BTreeMap::new();
    flatten_into(&mut flat, String::new(), settings);
    flat.into_iter()
        .map(|(key, value)| match key.strip_prefix(INDEX_PREFIX) {
            Some(stripped) => (stripped.to_string(), value),
            None => (key, value),
        })
        .collect()
}

fn flatten_into(flat: &mut BTreeMap<String, Value>, path: String, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                flatten_into(flat, child_path, child);
            }
        }
        _ if path.is_empty() => {}
        _ => {
            flat.insert(path, value.clone());
        }
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn is_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(Map::is_empty)
}
