//! Error types for the measurement engine.
//!
//! None of these are fatal to the host. Each is recovered locally by the
//! caller: an aborted gesture, a rejected creation, or zero-valued stats.

use thiserror::Error;

/// Errors raised by the annotation core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnnotationError {
    /// A pointer event arrived without the coordinates the operation needs.
    #[error("Invalid input event: {0}")]
    InvalidInputEvent(&'static str),
    /// The session already holds a measurement of every creatable kind.
    #[error("Session is full: both the axis and the head are already placed")]
    SessionFull,
    /// The pixel sampler could not service a statistics request.
    #[error("Sampling failed: {0}")]
    SamplingFailure(String),
    /// No measurement with the given identity exists in the session.
    #[error("Measurement not found: {0}")]
    NotFound(uuid::Uuid),
    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for annotation operations.
pub type AnnotationResult<T> = Result<T, AnnotationError>;

impl From<serde_json::Error> for AnnotationError {
    fn from(err: serde_json::Error) -> Self {
        AnnotationError::Config(err.to_string())
    }
}
