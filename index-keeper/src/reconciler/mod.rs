//! The reconciliation pipeline.
//!
//! Stages run strictly in sequence: pre-check, index convergence, alias
//! cutover, close enforcement, post-check. The first failure aborts the run
//! and nothing already applied is undone; re-running resumes from there.

use std::path::Path;
use std::sync::Arc;

use index_keeper_repository::EngineClient;
use index_keeper_shared::{validate, AliasSpec, DesiredState, ValidatedState};
use tracing::{info, instrument};

use crate::config::ReconcilerConfig;
use crate::context::RunContext;
use crate::converge::IndexConverger;
use crate::cutover::AliasCutover;
use crate::errors::ReconcileError;
use crate::postcheck::PostChecker;
use crate::precheck::PreChecker;
use crate::report::{CutoverReport, IndexOutcome, PostCheckReport, PreCheckReport, RunReport};

/// Drives a desired state onto the cluster.
pub struct Reconciler {
    pre_checker: PreChecker,
    converger: IndexConverger,
    cutover: AliasCutover,
    post_checker: PostChecker,
}

impl Reconciler {
    pub fn new(client: Arc<dyn EngineClient>) -> Self {
        Self::with_config(client, ReconcilerConfig::default())
    }

    pub fn with_config(client: Arc<dyn EngineClient>, config: ReconcilerConfig) -> Self {
        Self {
            pre_checker: PreChecker::new(Arc::clone(&client), config.probe_prefix),
            converger: IndexConverger::new(Arc::clone(&client)),
            cutover: AliasCutover::new(Arc::clone(&client)),
            post_checker: PostChecker::new(client),
        }
    }

    /// Validate a desired state, then run every stage against it.
    ///
    /// Mapping paths are resolved against `base_dir`.
    pub async fn sync_state(
        &self,
        state: DesiredState,
        base_dir: &Path,
        ctx: &RunContext,
    ) -> Result<RunReport, ReconcileError> {
        let state = validate(state, base_dir)?;
        self.sync(&state, ctx).await
    }

    /// Run every stage against an already validated state.
    #[instrument(skip_all, fields(indices = state.indices().len(), aliases = state.aliases().len()))]
    pub async fn sync(
        &self,
        state: &ValidatedState,
        ctx: &RunContext,
    ) -> Result<RunReport, ReconcileError> {
        info!("Starting reconciliation");

        let pre_check = self.pre_check(state, ctx).await?;
        info!(
            probed = pre_check.probed.len(),
            skipped = pre_check.skipped.len(),
            aliases = pre_check.aliases_checked,
            "Pre-check complete"
        );

        let indices = self.converge(state, ctx).await?;
        let cutover = self.sync_aliases(state.aliases(), ctx).await?;
        let closed = self.close_declared(state, ctx).await?;
        let post_check = self.post_check(state, ctx).await?;

        let report = RunReport {
            pre_check,
            indices,
            cutover,
            closed,
            post_check,
        };
        info!(summary = %report.summary(), "Reconciliation complete");
        Ok(report)
    }

    pub async fn pre_check(
        &self,
        state: &ValidatedState,
        ctx: &RunContext,
    ) -> Result<PreCheckReport, ReconcileError> {
        Ok(self.pre_checker.run(state, ctx).await?)
    }

    /// Converge every declared index. Indices declared `close` stay open.
    pub async fn converge(
        &self,
        state: &ValidatedState,
        ctx: &RunContext,
    ) -> Result<Vec<IndexOutcome>, ReconcileError> {
        Ok(self.converger.converge_all(state, ctx).await?)
    }

    pub async fn sync_aliases(
        &self,
        aliases: &[AliasSpec],
        ctx: &RunContext,
    ) -> Result<CutoverReport, ReconcileError> {
        Ok(self.cutover.sync_aliases(aliases, ctx).await?)
    }

    /// Close indices declared `close`. Must run after the cutover.
    pub async fn close_declared(
        &self,
        state: &ValidatedState,
        ctx: &RunContext,
    ) -> Result<Vec<String>, ReconcileError> {
        Ok(self.converger.close_declared(state, ctx).await?)
    }

    pub async fn post_check(
        &self,
        state: &ValidatedState,
        ctx: &RunContext,
    ) -> Result<PostCheckReport, ReconcileError> {
        Ok(self.post_checker.run(state, ctx).await?)
    }
}
