//! Waypost Core Library
//!
//! This crate provides the domain model, schema validation, storage keys and
//! configuration shared by all Waypost components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod strings;

// Re-export commonly used types
pub use config::Config;
pub use error::ValidationError;
pub use models::{parse_location_queue, DeliveryErrorPolicy, LocationQueue, LocationQueueItem};
pub use storage_types::StorageBackend;
