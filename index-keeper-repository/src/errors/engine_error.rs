//! Engine error types.
//!
//! A single error type covers transport failures, non-success responses
//! (with the engine's status code and raw body) and run-level interruption.

use thiserror::Error;

/// Errors from engine client operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The client could not be configured to reach the cluster.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not produce a response.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The engine answered with a non-success status.
    #[error("{operation} failed with status {status}: {body}")]
    RequestFailed {
        operation: String,
        status: u16,
        body: String,
    },

    /// The engine's response could not be interpreted.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A request body could not be serialized.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The run was cancelled while the call was in flight.
    #[error("Operation cancelled")]
    Cancelled,

    /// The run's deadline passed while the call was in flight.
    #[error("Deadline exceeded")]
    DeadlineExceeded,
}

impl EngineError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    /// Create a request failure from a status code and response body.
    pub fn request_failed(operation: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::RequestFailed {
            operation: operation.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// The engine's status code, when the failure came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The engine's raw response body, when the failure came from a response.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::RequestFailed { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Whether the failure is worth retrying at the transport level.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::TransportError(_) => true,
            Self::RequestFailed { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Whether the failure was caused by cancellation or the run deadline.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}
