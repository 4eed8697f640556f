//! Error types for engine client operations.

mod engine_error;

pub use engine_error::EngineError;
