//! Waypost Storage Library
//!
//! This crate provides the key-value storage abstraction used by the offline
//! queue, with a local filesystem backend and an in-memory backend.
//!
//! # Storage key format
//!
//! Keys are flat names such as `offline-queue` and `gps-device-id`. They may
//! only contain ASCII letters, digits, `-`, `_` and `.`, and must not contain
//! `..`. Key validation is centralized in the `keys` module so all backends
//! stay consistent.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-memory")]
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-memory")]
pub use memory::MemoryStorage;
pub use traits::{Storage, StorageError, StorageResult};
pub use waypost_core::StorageBackend;
