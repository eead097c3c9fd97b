use waypost_core::ValidationError;
use waypost_storage::StorageError;

/// Errors surfaced by queue store operations and batch runs.
///
/// Delivery failures are not errors at this level: they are recorded in the
/// [`BatchResult`](crate::BatchResult) and the item stays queued.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Queue storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Persisted queue failed validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to serialize queue: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;
