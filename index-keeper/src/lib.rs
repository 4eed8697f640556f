//! # Index Keeper
//!
//! Reconciles the live indices and aliases of a search cluster against a
//! declarative desired state. Repeated runs converge to the same result, and
//! a failed run leaves already-applied changes in place so the next run can
//! resume from where it stopped.
//!
//! ## Architecture
//!
//! A run is a strictly sequential pipeline:
//!
//! 1. **Validate**: static checks on the desired state, no cluster contact
//! 2. **Pre-check**: dry-run new mappings on throwaway probe indices and
//!    confirm every alias member will exist
//! 3. **Converge**: create or update each index, reindex where requested,
//!    open anything not declared closed
//! 4. **Cutover**: repoint each alias atomically
//! 5. **Close**: close indices declared closed, only after cutover
//! 6. **Post-check**: every declared index and alias exists by name
//!
//! ## Modules
//!
//! - [`cli`]: Command-line interface
//! - [`config`]: Configuration and dependency initialization
//! - [`context`]: Cancellation and deadline for a run
//! - [`precheck`], [`converge`], [`cutover`], [`postcheck`]: The stages
//! - [`reconciler`]: Runs the stages in order
//! - [`report`]: What each stage did
//! - [`errors`]: Error types for each stage

pub mod cli;
pub mod config;
pub mod context;
pub mod converge;
pub mod cutover;
pub mod errors;
pub mod postcheck;
pub mod precheck;
pub mod reconciler;
pub mod report;

pub use config::{Dependencies, ReconcilerConfig};
pub use context::RunContext;
pub use errors::ReconcileError;
pub use reconciler::Reconciler;
pub use report::RunReport;

use index_keeper_repository::EngineError;
use index_keeper_shared::ConfigError;
use thiserror::Error;

/// Errors that end an `index-keeper` invocation.
#[derive(Error, Debug)]
pub enum KeeperError {
    /// Invalid invocation or environment.
    #[error("Usage error: {0}")]
    UsageError(String),

    /// The desired state could not be read, parsed or validated.
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    /// The engine client could not be constructed.
    #[error("Engine error: {0}")]
    EngineError(#[from] EngineError),

    /// A reconciliation stage failed.
    #[error(transparent)]
    ReconcileError(#[from] ReconcileError),
}

impl KeeperError {
    /// Create a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::UsageError(msg.into())
    }
}
