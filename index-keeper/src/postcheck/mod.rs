//! Name-only verification that every declared entity exists after a run.

use std::sync::Arc;

use index_keeper_repository::{EngineClient, EngineError};
use index_keeper_shared::ValidatedState;
use tracing::{error, instrument};

use crate::context::RunContext;
use crate::errors::{EntityKind, PostCheckError};
use crate::report::PostCheckReport;

pub struct PostChecker {
    client: Arc<dyn EngineClient>,
}

impl PostChecker {
    pub fn new(client: Arc<dyn EngineClient>) -> Self {
        Self { client }
    }

    /// Confirm every declared index, then every declared alias, exists.
    #[instrument(skip_all)]
    pub async fn run(
        &self,
        state: &ValidatedState,
        ctx: &RunContext,
    ) -> Result<PostCheckReport, PostCheckError> {
        for index in state.indices() {
            let exists = ctx.guard(self.client.index_exists(&index.name)).await;
            Self::require(EntityKind::Index, &index.name, exists)?;
        }
        for alias in state.aliases() {
            let exists = ctx.guard(self.client.alias_exists(&alias.name)).await;
            Self::require(EntityKind::Alias, &alias.name, exists)?;
        }

        Ok(PostCheckReport {
            indices: state.indices().len(),
            aliases: state.aliases().len(),
        })
    }

    fn require(
        kind: EntityKind,
        name: &str,
        exists: Result<bool, EngineError>,
    ) -> Result<(), PostCheckError> {
        match exists {
            Ok(true) => Ok(()),
            Ok(false) => {
                error!(%kind, name, "Post-check failed, not found");
                Err(PostCheckError::Missing {
                    kind,
                    name: name.to_string(),
                })
            }
            Err(source) => {
                error!(%kind, name, error = %source, "Post-check failed");
                Err(PostCheckError::Lookup {
                    kind,
                    name: name.to_string(),
                    source,
                })
            }
        }
    }
}
