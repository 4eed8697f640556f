//! Cutover error types.

use index_keeper_repository::EngineError;
use thiserror::Error;

/// An alias batch the engine refused. The alias keeps its prior members.
#[derive(Error, Debug)]
#[error("failed to sync alias {alias}: {source}")]
pub struct CutoverError {
    pub alias: String,
    #[source]
    pub source: EngineError,
}
