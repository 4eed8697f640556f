//! Index convergence.
//!
//! Each declared index is brought to its desired state in declaration order.
//! Closing is deferred to [`IndexConverger::close_declared`], which the
//! reconciler runs only after the alias cutover.

pub mod diff;

use std::sync::Arc;

use index_keeper_repository::{EngineClient, ReindexRequest};
use index_keeper_shared::{IndexBody, IndexSpec, ReindexPolicy, ReindexTrigger, ValidatedState};
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::context::RunContext;
use crate::errors::{ConvergenceError, IndexOperation};
use crate::report::IndexOutcome;

/// Applies the minimal set of operations to reach each index's desired state.
pub struct IndexConverger {
    client: Arc<dyn EngineClient>,
}

impl IndexConverger {
    pub fn new(client: Arc<dyn EngineClient>) -> Self {
        Self { client }
    }

    /// Converge every declared index, stopping at the first failure.
    pub async fn converge_all(
        &self,
        state: &ValidatedState,
        ctx: &RunContext,
    ) -> Result<Vec<IndexOutcome>, ConvergenceError> {
        let mut outcomes = Vec::with_capacity(state.indices().len());
        for spec in state.indices() {
            let outcome = self
                .converge_index(spec, state.body(&spec.name), ctx)
                .await
                .inspect_err(|e| {
                    error!(index = %spec.name, operation = %e.failed_operation(), error = %e, "Convergence failed");
                })?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Converge one index.
    ///
    /// An absent index is created with its document and, when a reindex
    /// source is declared, filled from it whatever the trigger. An existing
    /// index is opened unless declared closed, has its mapping and settings
    /// diffed and pushed, and is reindexed only for `on: always`.
    ///
    /// An existing index declared `close` is never reopened. If it was closed
    /// by an earlier run, the alias cutover adds it while it is still closed.
    /// Only indices created or opened by this run are guaranteed open at
    /// cutover and closed after it.
    #[instrument(skip_all, fields(index = %spec.name))]
    pub async fn converge_index(
        &self,
        spec: &IndexSpec,
        body: Option<&IndexBody>,
        ctx: &RunContext,
    ) -> Result<IndexOutcome, ConvergenceError> {
        let name = spec.name.as_str();
        let mut outcome = IndexOutcome::new(name);

        let exists = ctx
            .guard(self.client.index_exists(name))
            .await
            .map_err(|e| ConvergenceError::operation(name, IndexOperation::Exists, e))?;

        if !exists {
            let document = body.map(IndexBody::to_value);
            ctx.guard(self.client.create_index(name, document.as_ref()))
                .await
                .map_err(|e| ConvergenceError::operation(name, IndexOperation::Create, e))?;
            info!(index = name, "Index created");
            outcome.created = true;

            if let Some(policy) = spec.active_reindex() {
                self.reindex(name, policy, ctx).await?;
                outcome.reindexed = true;
            }
            return Ok(outcome);
        }

        if !spec.is_closed() {
            ctx.guard(self.client.open_index(name))
                .await
                .map_err(|e| ConvergenceError::operation(name, IndexOperation::Open, e))?;
            debug!(index = name, "Index opened");
            outcome.opened = true;
        }

        if let Some(body) = body {
            if let Some(mapping) = body.mappings() {
                outcome.mapping_updated = self.sync_mapping(name, mapping, ctx).await?;
            }
            if let Some(settings) = body.settings() {
                outcome.settings_updated = self.sync_settings(name, settings, ctx).await?;
            }
        }

        match spec.active_reindex() {
            Some(policy) if policy.trigger == ReindexTrigger::Always => {
                self.reindex(name, policy, ctx).await?;
                outcome.reindexed = true;
            }
            Some(_) => debug!(index = name, "Reindex skipped, index already present"),
            None => {}
        }

        Ok(outcome)
    }

    /// Close every index declared `close`, in declaration order.
    pub async fn close_declared(
        &self,
        state: &ValidatedState,
        ctx: &RunContext,
    ) -> Result<Vec<String>, ConvergenceError> {
        let mut closed = Vec::new();
        for spec in state.indices().iter().filter(|spec| spec.is_closed()) {
            ctx.guard(self.client.close_index(&spec.name))
                .await
                .map_err(|e| {
                    error!(index = %spec.name, error = %e, "Failed to close index");
                    ConvergenceError::operation(&spec.name, IndexOperation::Close, e)
                })?;
            info!(index = %spec.name, "Index closed");
            closed.push(spec.name.clone());
        }
        Ok(closed)
    }

    async fn sync_mapping(
        &self,
        name: &str,
        desired: &Value,
        ctx: &RunContext,
    ) -> Result<bool, ConvergenceError> {
        let live = ctx
            .guard(self.client.get_mapping(name))
            .await
            .map_err(|e| ConvergenceError::operation(name, IndexOperation::GetMapping, e))?;

        if diff::mapping_matches(&live, desired) {
            debug!(index = name, "Mapping up to date");
            return Ok(false);
        }

        ctx.guard(self.client.put_mapping(name, desired))
            .await
            .map_err(|e| ConvergenceError::operation(name, IndexOperation::PutMapping, e))?;
        info!(index = name, "Mapping updated");
        Ok(true)
    }

    async fn sync_settings(
        &self,
        name: &str,
        desired: &Value,
        ctx: &RunContext,
    ) -> Result<bool, ConvergenceError> {
        let live = ctx
            .guard(self.client.get_settings(name))
            .await
            .map_err(|e| ConvergenceError::operation(name, IndexOperation::GetSettings, e))?;

        let Some(delta) = diff::settings_delta(&live, desired) else {
            debug!(index = name, "Settings up to date");
            return Ok(false);
        };

        ctx.guard(self.client.put_settings(name, &delta))
            .await
            .map_err(|e| ConvergenceError::operation(name, IndexOperation::PutSettings, e))?;
        info!(index = name, keys = delta.as_object().map_or(0, |m| m.len()), "Settings updated");
        Ok(true)
    }

    async fn reindex(
        &self,
        dest: &str,
        policy: &ReindexPolicy,
        ctx: &RunContext,
    ) -> Result<(), ConvergenceError> {
        let source_exists = ctx
            .guard(self.client.index_exists(&policy.source))
            .await
            .map_err(|e| ConvergenceError::operation(dest, IndexOperation::Reindex, e))?;
        if !source_exists {
            return Err(ConvergenceError::MissingReindexSource {
                index: dest.to_string(),
                source_index: policy.source.clone(),
            });
        }

        let request = ReindexRequest {
            source: policy.source.clone(),
            dest: dest.to_string(),
            slices: policy.slices,
            wait_for_completion: policy.wait_for_completion,
        };
        ctx.guard(self.client.reindex(&request))
            .await
            .map_err(|e| ConvergenceError::operation(dest, IndexOperation::Reindex, e))?;

        info!(
            index = dest,
            source = %policy.source,
            slices = policy.slices,
            wait_for_completion = policy.wait_for_completion,
            "Reindex started"
        );
        Ok(())
    }
}
