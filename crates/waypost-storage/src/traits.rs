//! Storage abstraction trait
//!
//! This module defines the key-value Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value storage abstraction
///
/// Holds small string values under flat keys. The offline queue keeps its
/// device id and its JSON-encoded pending items here, so every backend must
/// return exactly what was last written for a key.
///
/// **Key format:** keys are non-empty and may contain ASCII letters, digits,
/// `-`, `_` and `.`; they must not contain `..` or path separators.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, `None` if nothing was written yet.
    async fn get_string(&self, key: &str) -> StorageResult<Option<String>>;

    /// Overwrite the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
