//! Dry-run pre-check.
//!
//! Before anything the operator will reference is touched, every index that
//! does not exist yet is created once under a throwaway probe name and
//! deleted again. That proves the cluster accepts its mapping and settings.
//! Aliases are checked for members that will not exist after the run.

use std::collections::HashSet;
use std::sync::Arc;

use index_keeper_repository::EngineClient;
use index_keeper_shared::{IndexBody, ValidatedState};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::context::RunContext;
use crate::errors::PreCheckError;
use crate::report::PreCheckReport;

/// Runs the pre-check stage.
pub struct PreChecker {
    client: Arc<dyn EngineClient>,
    probe_prefix: String,
}

impl PreChecker {
    pub fn new(client: Arc<dyn EngineClient>, probe_prefix: impl Into<String>) -> Self {
        Self {
            client,
            probe_prefix: probe_prefix.into(),
        }
    }

    /// A fresh, collision-resistant probe index name.
    pub fn probe_name(&self) -> String {
        format!("{}-{}", self.probe_prefix, Uuid::new_v4())
    }

    /// Pre-check every declared index, then every declared alias.
    #[instrument(skip_all, fields(indices = state.indices().len(), aliases = state.aliases().len()))]
    pub async fn run(
        &self,
        state: &ValidatedState,
        ctx: &RunContext,
    ) -> Result<PreCheckReport, PreCheckError> {
        let mut report = PreCheckReport::default();
        // Declared indices either exist already or passed a probe, so alias
        // members among them need no lookup.
        let mut known: HashSet<&str> = HashSet::with_capacity(state.indices().len());

        for index in state.indices() {
            let exists = ctx
                .guard(self.client.index_exists(&index.name))
                .await
                .map_err(|source| {
                    error!(index = %index.name, error = %source, "Pre-check failed");
                    PreCheckError::IndexLookup {
                        index: index.name.clone(),
                        source,
                    }
                })?;
            known.insert(index.name.as_str());

            if exists {
                info!(index = %index.name, "Pre-check skipped, index already present");
                report.skipped.push(index.name.clone());
                continue;
            }

            let body = state.body(&index.name).map(IndexBody::to_value);
            self.probe(&index.name, body.as_ref(), ctx).await?;

            info!(index = %index.name, "Pre-check passed");
            report.probed.push(index.name.clone());
        }

        for alias in state.aliases() {
            for member in &alias.members {
                if known.contains(member.as_str()) {
                    continue;
                }
                let exists = ctx
                    .guard(self.client.index_exists(member))
                    .await
                    .map_err(|source| {
                        error!(alias = %alias.name, index = %member, error = %source, "Pre-check failed");
                        PreCheckError::AliasMemberLookup {
                            alias: alias.name.clone(),
                            index: member.clone(),
                            source,
                        }
                    })?;
                if !exists {
                    error!(alias = %alias.name, index = %member, "Pre-check failed, alias member not found");
                    return Err(PreCheckError::MissingAliasMember {
                        alias: alias.name.clone(),
                        index: member.clone(),
                    });
                }
                known.insert(member.as_str());
            }

            info!(alias = %alias.name, "Pre-check passed");
            report.aliases_checked += 1;
        }

        Ok(report)
    }

    /// Create and delete a probe index with the given creation document.
    async fn probe(
        &self,
        index: &str,
        body: Option<&Value>,
        ctx: &RunContext,
    ) -> Result<(), PreCheckError> {
        let probe = self.probe_name();
        debug!(index, probe = %probe, "Creating probe index");

        if let Err(source) = ctx.guard(self.client.create_index(&probe, body)).await {
            error!(index, probe = %probe, error = %source, "Pre-check failed, probe rejected");
            self.discard_failed_probe(&probe, ctx).await;
            return Err(PreCheckError::ProbeCreate {
                index: index.to_string(),
                probe,
                source,
            });
        }

        if let Err(source) = ctx.guard(self.client.delete_index(&probe)).await {
            error!(index, probe = %probe, error = %source, "Pre-check failed, probe not deleted");
            return Err(PreCheckError::ProbeDelete {
                index: index.to_string(),
                probe,
                source,
            });
        }

        debug!(index, probe = %probe, "Probe index deleted");
        Ok(())
    }

    /// Delete a probe whose creation reported failure but may have happened
    /// anyway (e.g. a timeout after the engine applied it). Skipped once the
    /// run is interrupted.
    async fn discard_failed_probe(&self, probe: &str, ctx: &RunContext) {
        if ctx.check().is_err() {
            return;
        }
        match ctx.guard(self.client.index_exists(probe)).await {
            Ok(false) => {}
            Ok(true) => {
                if let Err(e) = ctx.guard(self.client.delete_index(probe)).await {
                    warn!(probe, error = %e, "Failed to delete leftover probe index");
                }
            }
            Err(e) => warn!(probe, error = %e, "Failed to look up probe index"),
        }
    }
}
