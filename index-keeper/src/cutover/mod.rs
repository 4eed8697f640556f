//! Atomic alias cutover.

use std::sync::Arc;

use index_keeper_repository::{AliasActions, EngineClient};
use index_keeper_shared::AliasSpec;
use tracing::{error, info, instrument};

use crate::context::RunContext;
use crate::errors::CutoverError;
use crate::report::CutoverReport;

/// The single batch that repoints `alias` to exactly its declared members.
///
/// The batch always starts by removing the alias from every index, even when
/// it currently points nowhere, followed by one add per member in order.
pub fn cutover_actions(alias: &AliasSpec) -> AliasActions {
    alias
        .members
        .iter()
        .fold(AliasActions::new().remove_all(&alias.name), |batch, member| {
            batch.add(member, &alias.name)
        })
}

/// Repoints declared aliases one at a time.
pub struct AliasCutover {
    client: Arc<dyn EngineClient>,
}

impl AliasCutover {
    pub fn new(client: Arc<dyn EngineClient>) -> Self {
        Self { client }
    }

    #[instrument(skip_all, fields(aliases = aliases.len()))]
    pub async fn sync_aliases(
        &self,
        aliases: &[AliasSpec],
        ctx: &RunContext,
    ) -> Result<CutoverReport, CutoverError> {
        let mut report = CutoverReport::default();
        for alias in aliases {
            let batch = cutover_actions(alias);
            ctx.guard(self.client.update_aliases(&batch))
                .await
                .map_err(|source| {
                    error!(alias = %alias.name, error = %source, "Alias cutover failed");
                    CutoverError {
                        alias: alias.name.clone(),
                        source,
                    }
                })?;
            info!(alias = %alias.name, indices = ?alias.members, "Alias synced");
            report.aliases.push(alias.name.clone());
        }
        Ok(report)
    }
}
