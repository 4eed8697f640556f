//! Error types for the reconciliation stages.
//!
//! Every stage fails fast with an error naming the entity it was working on
//! and, when the engine refused a call, the engine's status and body via the
//! wrapped `EngineError`. Nothing is retried or rolled back at this level.

mod convergence_error;
mod cutover_error;
mod postcheck_error;
mod precheck_error;

pub use convergence_error::{ConvergenceError, IndexOperation};
pub use cutover_error::CutoverError;
pub use postcheck_error::{EntityKind, PostCheckError};
pub use precheck_error::PreCheckError;

use index_keeper_repository::EngineError;
use index_keeper_shared::ValidationError;
use thiserror::Error;

/// A failed reconciliation run, by stage.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("pre-check: {0}")]
    PreCheck(#[from] PreCheckError),

    #[error("converge: {0}")]
    Convergence(#[from] ConvergenceError),

    #[error("cutover: {0}")]
    Cutover(#[from] CutoverError),

    #[error("post-check: {0}")]
    PostCheck(#[from] PostCheckError),
}

impl ReconcileError {
    /// The engine failure behind this error, if an engine call failed.
    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            Self::Validation(_) => None,
            Self::PreCheck(e) => e.engine_error(),
            Self::Convergence(e) => e.engine_error(),
            Self::Cutover(e) => Some(&e.source),
            Self::PostCheck(e) => e.engine_error(),
        }
    }

    /// Whether the run stopped because it was cancelled or ran out of time.
    pub fn is_interrupted(&self) -> bool {
        self.engine_error().is_some_and(EngineError::is_interrupted)
    }
}
