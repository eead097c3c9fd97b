//! Delivery handler trait
//!
//! A batch run hands each queued sample to a [`DeliveryHandler`]. The handler
//! either reports an outcome (`Ok`) or fails outright (`Err`); the two are
//! treated differently by the runner, see
//! [`DeliveryErrorPolicy`](waypost_core::DeliveryErrorPolicy).

use std::future::Future;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use waypost_core::LocationQueueItem;

/// Reported result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Delivers one sample to the remote tracking service.
#[async_trait]
pub trait DeliveryHandler: Send + Sync {
    async fn deliver(&self, item: &LocationQueueItem) -> Result<DeliveryOutcome>;
}

/// Any async closure taking an owned sample is a handler.
#[async_trait]
impl<F, Fut> DeliveryHandler for F
where
    F: Fn(LocationQueueItem) -> Fut + Send + Sync,
    Fut: Future<Output = Result<DeliveryOutcome>> + Send + 'static,
{
    async fn deliver(&self, item: &LocationQueueItem) -> Result<DeliveryOutcome> {
        (self)(item.clone()).await
    }
}
