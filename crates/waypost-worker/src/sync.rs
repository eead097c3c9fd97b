//! Periodic sync service: runs a batch over the offline queue at a fixed
//! interval until shut down.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use waypost_core::Config;

use crate::batch::BatchTaskOptions;
use crate::delivery::DeliveryHandler;
use crate::queue::OfflineQueue;

/// Configuration for the sync service
#[derive(Clone, Debug)]
pub struct SyncServiceConfig {
    pub interval: Duration,
    pub batch: BatchTaskOptions,
}

impl Default for SyncServiceConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            batch: BatchTaskOptions::default(),
        }
    }
}

impl SyncServiceConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.sync_interval,
            batch: BatchTaskOptions::from_config(config),
        }
    }
}

/// Background service that drains the offline queue
///
/// The first run starts immediately. A run in progress is never interrupted;
/// shutdown takes effect once it finishes. Runs do not overlap: ticks missed
/// during a long run are skipped.
pub struct SyncService {
    shutdown_tx: mpsc::Sender<()>,
    worker: JoinHandle<()>,
}

impl SyncService {
    pub fn new(
        queue: Arc<OfflineQueue>,
        handler: Arc<dyn DeliveryHandler>,
        config: SyncServiceConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let worker = tokio::spawn(async move {
            Self::worker_loop(queue, handler, config, shutdown_rx).await;
        });

        Self {
            shutdown_tx,
            worker,
        }
    }

    async fn worker_loop(
        queue: Arc<OfflineQueue>,
        handler: Arc<dyn DeliveryHandler>,
        config: SyncServiceConfig,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let mut ticker = interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            interval_secs = config.interval.as_secs(),
            cooldown_ms = config.batch.cooldown.as_millis() as u64,
            "Offline queue sync service started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match queue.run_batch_task(handler.as_ref(), &config.batch).await {
                        Ok(result) => {
                            tracing::debug!(
                                successes = result.successes,
                                failures = result.failures,
                                dropped = result.dropped,
                                "Sync run completed"
                            );
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Sync run failed, will retry next interval");
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Offline queue sync service shutting down");
                    break;
                }
            }
        }
    }

    /// Stop the service and wait for the current run, if any, to finish.
    pub async fn shutdown(self) {
        if let Err(e) = self.shutdown_tx.send(()).await {
            tracing::warn!(error = %e, "Failed to send shutdown signal to sync service");
        }

        if let Err(e) = self.worker.await {
            tracing::error!(error = %e, "Sync service task ended abnormally");
        }
    }
}
