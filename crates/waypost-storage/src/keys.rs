//! Shared key validation for storage backends.
//!
//! Keys are flat: `[A-Za-z0-9._-]+`, never `.`/`..` and never containing `..`.

use crate::traits::{StorageError, StorageResult};

/// Validate a storage key. All backends must accept and reject the same keys.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }

    if key.contains("..") || key == "." {
        return Err(StorageError::InvalidKey(format!(
            "Storage key {:?} contains a path traversal sequence",
            key
        )));
    }

    if let Some(c) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(StorageError::InvalidKey(format!(
            "Storage key {:?} contains invalid character {:?}",
            key, c
        )));
    }

    Ok(())
}
