//! Dependency initialization and wiring for the reconciler.

use std::sync::Arc;

use index_keeper_repository::{ConnectionConfig, EngineClient, OpenSearchClient};
use tracing::info;

use super::ReconcilerConfig;
use crate::reconciler::Reconciler;
use crate::KeeperError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured reconciler ready to run.
    pub reconciler: Reconciler,
}

impl Dependencies {
    /// Build the engine client and the reconciler on top of it.
    ///
    /// No request is sent to the cluster here.
    pub fn new(connection: ConnectionConfig, config: ReconcilerConfig) -> Result<Self, KeeperError> {
        info!(
            urls = ?connection.urls,
            max_retries = connection.retry.max_retries,
            probe_prefix = %config.probe_prefix,
            "Initializing dependencies"
        );

        let client: Arc<dyn EngineClient> = Arc::new(OpenSearchClient::new(connection)?);
        let reconciler = Reconciler::with_config(client, config);

        Ok(Self { reconciler })
    }
}
