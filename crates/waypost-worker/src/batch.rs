//! Batch runner: drains a snapshot of the offline queue through a delivery
//! handler, one sample at a time, pausing for a fixed cooldown after every
//! attempt. Only failed samples stay queued.

use std::time::Duration;

use serde::Serialize;
use tokio::time::sleep;
use waypost_core::constants::DEFAULT_BATCH_COOLDOWN;
use waypost_core::{Config, DeliveryErrorPolicy, LocationQueue};

use crate::delivery::DeliveryHandler;
use crate::error::QueueResult;
use crate::queue::OfflineQueue;

#[derive(Clone, Debug)]
pub struct BatchTaskOptions {
    /// Pause after each delivery attempt, successful or not, including the last.
    pub cooldown: Duration,
    pub on_delivery_error: DeliveryErrorPolicy,
}

impl Default for BatchTaskOptions {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_BATCH_COOLDOWN,
            on_delivery_error: DeliveryErrorPolicy::default(),
        }
    }
}

impl BatchTaskOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cooldown: config.batch_cooldown,
            on_delivery_error: config.on_delivery_error,
        }
    }
}

/// Counts for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    /// Samples that left the queue: snapshot size minus `failures`.
    pub successes: usize,
    /// Samples left in the queue for the next run.
    pub failures: usize,
    /// How many of `successes` were handler errors dropped under
    /// [`DeliveryErrorPolicy::Drop`] rather than confirmed deliveries.
    pub dropped: usize,
}

impl OfflineQueue {
    /// Attempt delivery of every sample queued when the run starts.
    ///
    /// Samples are processed strictly in order. A reported failure keeps the
    /// sample queued; a handler error is logged and then handled per
    /// `options.on_delivery_error`. Samples added while the run is in progress
    /// are not delivered by this run but are kept after the failed ones.
    ///
    /// There is no timeout around the handler: a handler that never resolves
    /// stalls the run.
    ///
    /// # Errors
    ///
    /// Reading the snapshot or persisting the outcome can fail with a storage or
    /// validation error. Nothing is delivered when the snapshot cannot be read.
    #[tracing::instrument(
        skip(self, handler, options),
        fields(cooldown_ms = options.cooldown.as_millis() as u64, policy = %options.on_delivery_error)
    )]
    pub async fn run_batch_task(
        &self,
        handler: &dyn DeliveryHandler,
        options: &BatchTaskOptions,
    ) -> QueueResult<BatchResult> {
        let snapshot = self.get_queue().await?;

        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(
                items = %serde_json::to_string(&snapshot).unwrap_or_default(),
                "Offline queue snapshot"
            );
        }
        tracing::info!(item_count = snapshot.len(), "Starting offline queue sync");

        let mut result = BatchResult::default();
        let mut failed_items: LocationQueue = Vec::new();

        for item in &snapshot {
            match handler.deliver(item).await {
                Ok(outcome) if outcome.success => {
                    tracing::debug!(timestamp = item.timestamp, "Location sample delivered");
                }
                Ok(outcome) => {
                    tracing::warn!(
                        timestamp = item.timestamp,
                        error = outcome.error.as_deref().unwrap_or("unspecified"),
                        "Location sample delivery failed, keeping it queued"
                    );
                    failed_items.push(item.clone());
                }
                Err(e) => {
                    tracing::error!(
                        timestamp = item.timestamp,
                        error = %e,
                        policy = %options.on_delivery_error,
                        "Delivery handler errored"
                    );
                    match options.on_delivery_error {
                        DeliveryErrorPolicy::Drop => result.dropped += 1,
                        DeliveryErrorPolicy::Retain => failed_items.push(item.clone()),
                    }
                }
            }

            sleep(options.cooldown).await;
        }

        result.failures = failed_items.len();
        result.successes = snapshot.len().saturating_sub(result.failures);
        let carried = self.commit_batch(&snapshot, failed_items).await?;

        tracing::info!(
            successes = result.successes,
            failures = result.failures,
            dropped = result.dropped,
            added_during_run = carried,
            "Offline queue sync finished"
        );

        Ok(result)
    }
}
