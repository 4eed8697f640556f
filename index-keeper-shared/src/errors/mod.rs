//! Error types for configuration parsing and validation.

mod config_error;
mod validation_error;

pub use config_error::{ConfigError, MappingError};
pub use validation_error::ValidationError;
