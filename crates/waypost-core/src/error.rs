//! Error types module
//!
//! Validation failures raised when a persisted queue payload does not match the
//! expected item shape, or when an item cannot be persisted faithfully. They are never repaired automatically; callers decide
//! whether to reset storage.

/// Persisted queue payload failed schema validation.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Queue payload is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("Queue payload must be a JSON array, found {found}")]
    NotAnArray { found: &'static str },

    #[error("Queue item at index {index} is malformed: {source}")]
    InvalidItem {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Queue item captured at {timestamp} has a non-finite {field}")]
    NonFiniteField {
        timestamp: i64,
        field: &'static str,
    },
}
