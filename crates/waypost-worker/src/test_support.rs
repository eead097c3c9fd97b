//! Shared fixtures for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use waypost_core::LocationQueueItem;
use waypost_storage::{Storage, StorageBackend, StorageError, StorageResult};

use crate::delivery::{DeliveryHandler, DeliveryOutcome};

/// A sample whose only distinguishing field is its timestamp.
pub fn item(timestamp: i64) -> LocationQueueItem {
    LocationQueueItem {
        timestamp,
        latitude: -23.5505,
        longitude: -46.6333,
        altitude: 760.0,
        accuracy: 5.0,
        altitude_accuracy: 3.0,
        heading: 180.0,
        speed: Some(1.5),
        gps_device_id: None,
    }
}

/// Storage whose every operation fails.
pub struct FailingStorage;

#[async_trait]
impl Storage for FailingStorage {
    async fn get_string(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::BackendError("disk unavailable".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::BackendError("disk unavailable".to_string()))
    }

    async fn delete(&self, _key: &str) -> StorageResult<()> {
        Err(StorageError::BackendError("disk unavailable".to_string()))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Scripted {
    Succeed,
    Fail,
    Error,
}

/// Handler answering per timestamp and recording the order of calls.
pub struct ScriptedHandler {
    default: Scripted,
    overrides: HashMap<i64, Scripted>,
    calls: Mutex<Vec<i64>>,
}

impl ScriptedHandler {
    pub fn all(default: Scripted) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, timestamp: i64, scripted: Scripted) -> Self {
        self.overrides.insert(timestamp, scripted);
        self
    }

    pub fn calls(&self) -> Vec<i64> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryHandler for ScriptedHandler {
    async fn deliver(&self, item: &LocationQueueItem) -> Result<DeliveryOutcome> {
        self.calls.lock().unwrap().push(item.timestamp);

        match self.overrides.get(&item.timestamp).copied().unwrap_or(self.default) {
            Scripted::Succeed => Ok(DeliveryOutcome::success()),
            Scripted::Fail => Ok(DeliveryOutcome::failure("server rejected sample")),
            Scripted::Error => Err(anyhow::anyhow!("connection reset")),
        }
    }
}
