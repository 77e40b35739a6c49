//! Error types for decoding trace events.

use thiserror::Error;

/// Result type alias for trace operations.
pub type TraceResult<T> = Result<T, TraceError>;

/// Errors raised while turning a stream frame into a [`crate::TraceEvent`].
#[derive(Debug, Error)]
pub enum TraceError {
    /// Frame was not valid JSON, or its payload did not fit the event type.
    #[error("malformed event: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Frame carried a `type` this viewer does not know.
    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    /// A required field was absent from the payload.
    #[error("missing field: {0}")]
    MissingField(&'static str),
}
