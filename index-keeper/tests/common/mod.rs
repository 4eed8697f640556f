//! In-memory cluster used by the integration tests.
//!
//! Behaves like the engine for the calls the reconciler makes: settings are
//! echoed back as strings with engine-owned keys added, mappings merge on
//! put, alias batches apply atomically, and unknown field types are
//! rejected. Every call is recorded in order.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use index_keeper::converge::diff::flatten_settings;
use index_keeper_repository::{AliasAction, AliasActions, EngineClient, EngineError, ReindexRequest};
use serde_json::{json, Map, Value};
use uuid::Uuid;

const FIELD_TYPES: &[&str] = &[
    "keyword", "text", "long", "integer", "short", "double", "float", "boolean", "date", "object",
    "nested",
];

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    IndexExists(String),
    CreateIndex(String),
    DeleteIndex(String),
    OpenIndex(String),
    CloseIndex(String),
    GetMapping(String),
    PutMapping(String),
    GetSettings(String),
    PutSettings(String),
    AliasExists(String),
    UpdateAliases(AliasActions),
    Reindex(ReindexRequest),
}

impl Call {
    /// Whether the call changes cluster state.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Self::IndexExists(_) | Self::GetMapping(_) | Self::GetSettings(_) | Self::AliasExists(_)
        )
    }

    /// The index or alias the call targets, for single-target calls.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::IndexExists(name)
            | Self::CreateIndex(name)
            | Self::DeleteIndex(name)
            | Self::OpenIndex(name)
            | Self::CloseIndex(name)
            | Self::GetMapping(name)
            | Self::PutMapping(name)
            | Self::GetSettings(name)
            | Self::PutSettings(name)
            | Self::AliasExists(name) => Some(name),
            Self::UpdateAliases(_) => None,
            Self::Reindex(request) => Some(&request.dest),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeIndex {
    pub mappings: Value,
    /// Flat settings without the `index.` prefix, as the engine stores them.
    pub settings: BTreeMap<String, Value>,
    pub open: bool,
    pub docs_from: Vec<String>,
}

/// The open state of each added index at the moment an alias batch applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutoverSnapshot {
    pub alias: String,
    pub members: Vec<(String, bool)>,
}

enum Behavior {
    Fail(EngineError),
    /// Apply the call, then report the error.
    FailAfterApply(EngineError),
    Hang,
}

struct Rule {
    matches: Box<dyn Fn(&Call) -> bool + Send + Sync>,
    behavior: Behavior,
}

#[derive(Default)]
struct ClusterState {
    indices: BTreeMap<String, FakeIndex>,
    aliases: BTreeMap<String, Vec<String>>,
    calls: Vec<Call>,
    snapshots: Vec<CutoverSnapshot>,
    rules: Vec<Rule>,
}

#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<ClusterState>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an open index directly, without recording a call.
    pub fn with_index(self, name: &str, mappings: Value) -> Self {
        self.state
            .lock()
            .unwrap()
            .indices
            .insert(name.to_string(), new_index(name, mappings, BTreeMap::new()));
        self
    }

    pub fn with_alias(self, alias: &str, members: &[&str]) -> Self {
        self.state.lock().unwrap().aliases.insert(
            alias.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    /// Close a seeded index without recording a call.
    pub fn close_index_now(&self, name: &str) {
        if let Some(index) = self.state.lock().unwrap().indices.get_mut(name) {
            index.open = false;
        }
    }

    /// Fail every call matching `matches` with `error`, without applying it.
    pub fn fail_when(&self, matches: impl Fn(&Call) -> bool + Send + Sync + 'static, error: EngineError) {
        self.add_rule(matches, Behavior::Fail(error));
    }

    /// Apply every call matching `matches`, then report `error`, like a
    /// request that timed out after the engine acted on it.
    pub fn fail_after_apply(
        &self,
        matches: impl Fn(&Call) -> bool + Send + Sync + 'static,
        error: EngineError,
    ) {
        self.add_rule(matches, Behavior::FailAfterApply(error));
    }

    /// Never answer calls matching `matches`.
    pub fn hang_when(&self, matches: impl Fn(&Call) -> bool + Send + Sync + 'static) {
        self.add_rule(matches, Behavior::Hang);
    }

    pub fn clear_rules(&self) {
        self.state.lock().unwrap().rules.clear();
    }

    fn add_rule(&self, matches: impl Fn(&Call) -> bool + Send + Sync + 'static, behavior: Behavior) {
        self.state.lock().unwrap().rules.push(Rule {
            matches: Box::new(matches),
            behavior,
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn index(&self, name: &str) -> Option<FakeIndex> {
        self.state.lock().unwrap().indices.get(name).cloned()
    }

    pub fn index_names(&self) -> Vec<String> {
        self.state.lock().unwrap().indices.keys().cloned().collect()
    }

    pub fn alias_members(&self, alias: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .aliases
            .get(alias)
            .cloned()
            .unwrap_or_default()
    }

    pub fn snapshots(&self) -> Vec<CutoverSnapshot> {
        self.state.lock().unwrap().snapshots.clone()
    }

    /// Record the call and decide how to answer it.
    async fn begin(&self, call: Call) -> Result<Option<EngineError>, EngineError> {
        let behavior = {
            let mut state = self.state.lock().unwrap();
            let behavior = state
                .rules
                .iter()
                .find(|rule| (rule.matches)(&call))
                .map(|rule| match &rule.behavior {
                    Behavior::Fail(e) => Behavior::Fail(e.clone()),
                    Behavior::FailAfterApply(e) => Behavior::FailAfterApply(e.clone()),
                    Behavior::Hang => Behavior::Hang,
                });
            state.calls.push(call);
            behavior
        };

        match behavior {
            None => Ok(None),
            Some(Behavior::Fail(e)) => Err(e),
            Some(Behavior::FailAfterApply(e)) => Ok(Some(e)),
            Some(Behavior::Hang) => std::future::pending().await,
        }
    }

    fn finish(result: Result<(), EngineError>, late: Option<EngineError>) -> Result<(), EngineError> {
        result?;
        match late {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn new_index(name: &str, mappings: Value, mut settings: BTreeMap<String, Value>) -> FakeIndex {
    settings
        .entry("number_of_shards".to_string())
        .or_insert_with(|| json!("1"));
    settings
        .entry("number_of_replicas".to_string())
        .or_insert_with(|| json!("1"));
    settings.insert("uuid".to_string(), json!(Uuid::new_v4().simple().to_string()));
    settings.insert("provided_name".to_string(), json!(name));
    settings.insert("creation_date".to_string(), json!("1718000000000"));
    settings.insert("version.created".to_string(), json!("136327827"));
    FakeIndex {
        mappings,
        settings,
        open: true,
        docs_from: Vec::new(),
    }
}

fn not_found(operation: &str, name: &str) -> EngineError {
    EngineError::request_failed(
        operation,
        404,
        format!(r#"{{"error":{{"type":"index_not_found_exception","index":"{name}"}},"status":404}}"#),
    )
}

fn bad_request(operation: &str, kind: &str, reason: &str) -> EngineError {
    EngineError::request_failed(
        operation,
        400,
        format!(r#"{{"error":{{"type":"{kind}","reason":"{reason}"}},"status":400}}"#),
    )
}

/// Engine-style string echo of a settings value.
fn echo(value: &Value) -> Value {
    match value {
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        other => other.clone(),
    }
}

fn check_field_types(operation: &str, mappings: &Value) -> Result<(), EngineError> {
    let Some(properties) = mappings.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };
    for (field, definition) in properties {
        if let Some(kind) = definition.get("type").and_then(Value::as_str) {
            if !FIELD_TYPES.contains(&kind) {
                return Err(bad_request(
                    operation,
                    "mapper_parsing_exception",
                    &format!("No handler for type [{kind}] declared on field [{field}]"),
                ));
            }
        }
        check_field_types(operation, definition)?;
    }
    Ok(())
}

/// Merge `update` into `mappings`, refusing type changes of existing fields.
fn merge_mappings(operation: &str, mappings: &mut Map<String, Value>, update: &Map<String, Value>) -> Result<(), EngineError> {
    for (key, value) in update {
        match (mappings.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                if let (Some(old), Some(new)) = (existing.get("type"), incoming.get("type")) {
                    if old != new {
                        return Err(bad_request(
                            operation,
                            "illegal_argument_exception",
                            &format!("mapper [{key}] cannot be changed from type [{old}] to [{new}]"),
                        ));
                    }
                }
                merge_mappings(operation, existing, incoming)?;
            }
            _ => {
                mappings.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(())
}

#[async_trait]
impl EngineClient for FakeCluster {
    async fn index_exists(&self, name: &str) -> Result<bool, EngineError> {
        self.begin(Call::IndexExists(name.to_string())).await?;
        Ok(self.state.lock().unwrap().indices.contains_key(name))
    }

    async fn create_index(&self, name: &str, body: Option<&Value>) -> Result<(), EngineError> {
        let late = self.begin(Call::CreateIndex(name.to_string())).await?;
        let result = (|| -> Result<(), EngineError> {
            let mut state = self.state.lock().unwrap();
            if state.indices.contains_key(name) {
                return Err(bad_request("create index", "resource_already_exists_exception", name));
            }
            let mappings = body
                .and_then(|b| b.get("mappings"))
                .cloned()
                .unwrap_or_else(|| json!({}));
            check_field_types("create index", &mappings)?;
            let settings: BTreeMap<String, Value> = body
                .and_then(|b| b.get("settings"))
                .map(|s| flatten_settings(s).into_iter().map(|(k, v)| (k, echo(&v))).collect())
                .unwrap_or_default();
            state
                .indices
                .insert(name.to_string(), new_index(name, mappings, settings));
            Ok(())
        })();
        Self::finish(result, late)
    }

    async fn delete_index(&self, name: &str) -> Result<(), EngineError> {
        let late = self.begin(Call::DeleteIndex(name.to_string())).await?;
        let result = {
            let mut state = self.state.lock().unwrap();
            match state.indices.remove(name) {
                Some(_) => {
                    for members in state.aliases.values_mut() {
                        members.retain(|member| member != name);
                    }
                    state.aliases.retain(|_, members| !members.is_empty());
                    Ok(())
                }
                None => Err(not_found("delete index", name)),
            }
        };
        Self::finish(result, late)
    }

    async fn open_index(&self, name: &str) -> Result<(), EngineError> {
        let late = self.begin(Call::OpenIndex(name.to_string())).await?;
        let result = match self.state.lock().unwrap().indices.get_mut(name) {
            Some(index) => {
                index.open = true;
                Ok(())
            }
            None => Err(not_found("open index", name)),
        };
        Self::finish(result, late)
    }

    async fn close_index(&self, name: &str) -> Result<(), EngineError> {
        let late = self.begin(Call::CloseIndex(name.to_string())).await?;
        let result = match self.state.lock().unwrap().indices.get_mut(name) {
            Some(index) => {
                index.open = false;
                Ok(())
            }
            None => Err(not_found("close index", name)),
        };
        Self::finish(result, late)
    }

    async fn get_mapping(&self, name: &str) -> Result<Value, EngineError> {
        self.begin(Call::GetMapping(name.to_string())).await?;
        self.state
            .lock()
            .unwrap()
            .indices
            .get(name)
            .map(|index| index.mappings.clone())
            .ok_or_else(|| not_found("get mapping", name))
    }

    async fn put_mapping(&self, name: &str, mapping: &Value) -> Result<(), EngineError> {
        let late = self.begin(Call::PutMapping(name.to_string())).await?;
        let result = (|| -> Result<(), EngineError> {
            let mut state = self.state.lock().unwrap();
            let index = state
                .indices
                .get_mut(name)
                .ok_or_else(|| not_found("put mapping", name))?;
            if !index.open {
                return Err(bad_request("put mapping", "index_closed_exception", name));
            }
            check_field_types("put mapping", mapping)?;
            let update = mapping.as_object().cloned().unwrap_or_default();
            if !index.mappings.is_object() {
                index.mappings = json!({});
            }
            if let Value::Object(existing) = &mut index.mappings {
                merge_mappings("put mapping", existing, &update)?;
            }
            Ok(())
        })();
        Self::finish(result, late)
    }

    async fn get_settings(&self, name: &str) -> Result<Value, EngineError> {
        self.begin(Call::GetSettings(name.to_string())).await?;
        let state = self.state.lock().unwrap();
        let index = state
            .indices
            .get(name)
            .ok_or_else(|| not_found("get settings", name))?;
        let flat: Map<String, Value> = index
            .settings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(json!({ "index": flat }))
    }

    async fn put_settings(&self, name: &str, settings: &Value) -> Result<(), EngineError> {
        let late = self.begin(Call::PutSettings(name.to_string())).await?;
        let result = match self.state.lock().unwrap().indices.get_mut(name) {
            Some(index) => {
                for (key, value) in flatten_settings(settings) {
                    index.settings.insert(key, echo(&value));
                }
                Ok(())
            }
            None => Err(not_found("put settings", name)),
        };
        Self::finish(result, late)
    }

    async fn alias_exists(&self, name: &str) -> Result<bool, EngineError> {
        self.begin(Call::AliasExists(name.to_string())).await?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .aliases
            .get(name)
            .is_some_and(|members| !members.is_empty()))
    }

    async fn update_aliases(&self, actions: &AliasActions) -> Result<(), EngineError> {
        let late = self.begin(Call::UpdateAliases(actions.clone())).await?;
        let result = (|| -> Result<(), EngineError> {
            let mut state = self.state.lock().unwrap();
            // Validate the whole batch before applying any of it.
            if let Some(missing) = actions
                .added_indices()
                .find(|index| !state.indices.contains_key(*index))
            {
                return Err(not_found("update aliases", missing));
            }

            let mut aliases = state.aliases.clone();
            let mut snapshots = Vec::new();
            for action in &actions.actions {
                match action {
                    AliasAction::Remove { index, alias } if index == "*" => {
                        aliases.remove(alias);
                    }
                    AliasAction::Remove { index, alias } => {
                        if let Some(members) = aliases.get_mut(alias) {
                            members.retain(|member| member != index);
                        }
                    }
                    AliasAction::Add { index, alias } => {
                        let open = state.indices.get(index).is_some_and(|i| i.open);
                        let position = match snapshots.iter().position(|s: &CutoverSnapshot| &s.alias == alias) {
                            Some(position) => position,
                            None => {
                                snapshots.push(CutoverSnapshot {
                                    alias: alias.clone(),
                                    members: Vec::new(),
                                });
                                snapshots.len() - 1
                            }
                        };
                        snapshots[position].members.push((index.clone(), open));
                        let members = aliases.entry(alias.clone()).or_default();
                        if !members.contains(index) {
                            members.push(index.clone());
                        }
                    }
                }
            }
            aliases.retain(|_, members| !members.is_empty());
            state.aliases = aliases;
            state.snapshots.extend(snapshots);
            Ok(())
        })();
        Self::finish(result, late)
    }

    async fn reindex(&self, request: &ReindexRequest) -> Result<(), EngineError> {
        let late = self.begin(Call::Reindex(request.clone())).await?;
        let result = {
            let mut state = self.state.lock().unwrap();
            if !state.indices.contains_key(&request.source) {
                Err(not_found("reindex", &request.source))
            } else {
                match state.indices.get_mut(&request.dest) {
                    Some(dest) => {
                        dest.docs_from.push(request.source.clone());
                        Ok(())
                    }
                    None => Err(not_found("reindex", &request.dest)),
                }
            }
        };
        Self::finish(result, late)
    }
}
