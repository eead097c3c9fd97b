//! Durable offline queue: pending location samples and the device id, persisted
//! in a key-value [`Storage`].
//!
//! The queue is stored as one JSON array and every mutation is a
//! read-modify-write of the whole array. Within one [`OfflineQueue`] those
//! mutations are serialized by an async mutex, so an `add` racing a batch run's
//! final commit is never lost. Other processes writing the same storage are not
//! coordinated with; a store must have a single owning process.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use waypost_core::constants::{GPS_DEVICE_ID_KEY, OFFLINE_QUEUE_KEY};
use waypost_core::strings::is_blank;
use waypost_core::{parse_location_queue, LocationQueue, LocationQueueItem};
use waypost_storage::Storage;

use crate::error::QueueResult;

pub struct OfflineQueue {
    storage: Arc<dyn Storage>,
    write_lock: Mutex<()>,
}

impl OfflineQueue {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Persisted remote device id.
    ///
    /// Best effort: returns `None` when nothing was stored or when the read fails.
    pub async fn gps_device_id(&self) -> Option<String> {
        match self.storage.get_string(GPS_DEVICE_ID_KEY).await {
            Ok(device_id) => device_id,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read GPS device id, treating as unset");
                None
            }
        }
    }

    /// Overwrite the persisted device id. Empty or whitespace-only ids are ignored.
    pub async fn update_device_id(&self, new_device_id: &str) -> QueueResult<()> {
        if is_blank(new_device_id) {
            tracing::debug!("Ignoring blank GPS device id update");
            return Ok(());
        }

        self.storage.set(GPS_DEVICE_ID_KEY, new_device_id).await?;
        tracing::info!(device_id = %new_device_id, "GPS device id updated");
        Ok(())
    }

    /// Read and validate the pending items, oldest first.
    ///
    /// An absent or empty payload is an empty queue. A payload that fails
    /// validation is an error; it is never coerced or discarded here.
    pub async fn get_queue(&self) -> QueueResult<LocationQueue> {
        let raw = match self.storage.get_string(OFFLINE_QUEUE_KEY).await? {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(Vec::new()),
        };

        Ok(parse_location_queue(&raw)?)
    }

    /// Replace the persisted queue wholesale.
    pub async fn update_queue(&self, items: &[LocationQueueItem]) -> QueueResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write_queue(items).await
    }

    /// Append `item` to the end of the queue.
    ///
    /// A sample with a NaN or infinite reading is rejected with
    /// [`QueueError::Validation`](crate::QueueError::Validation) and nothing is written.
    pub async fn add(&self, item: LocationQueueItem) -> QueueResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut queue = self.get_queue().await?;
        tracing::debug!(timestamp = item.timestamp, queue_len = queue.len() + 1, "Queueing location sample");
        queue.push(item);
        self.write_queue(&queue).await
    }

    /// Remove every item sharing `item`'s timestamp.
    pub async fn remove(&self, item: &LocationQueueItem) -> QueueResult<()> {
        self.remove_by_timestamp(item.timestamp).await.map(|_| ())
    }

    /// Remove every item with `timestamp`, returning how many were removed.
    pub async fn remove_by_timestamp(&self, timestamp: i64) -> QueueResult<usize> {
        let _guard = self.write_lock.lock().await;

        let queue = self.get_queue().await?;
        let before = queue.len();
        let next: LocationQueue = queue
            .into_iter()
            .filter(|i| i.timestamp != timestamp)
            .collect();
        let removed = before - next.len();

        self.write_queue(&next).await?;
        Ok(removed)
    }

    /// Reset the queue to empty. This is also the way out of a payload that
    /// no longer validates.
    pub async fn clear(&self) -> QueueResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write_queue(&[]).await?;
        tracing::info!("Offline queue cleared");
        Ok(())
    }

    pub async fn len(&self) -> QueueResult<usize> {
        Ok(self.get_queue().await?.len())
    }

    pub async fn is_empty(&self) -> QueueResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Persist the outcome of a batch run.
    ///
    /// The new queue is `failed` followed by every currently persisted item that
    /// was not part of the run's `snapshot` (matched by timestamp), i.e. samples
    /// added while the run was in progress. Returns how many of those were kept.
    pub(crate) async fn commit_batch(
        &self,
        snapshot: &[LocationQueueItem],
        mut failed: LocationQueue,
    ) -> QueueResult<usize> {
        let _guard = self.write_lock.lock().await;

        let processed: HashSet<i64> = snapshot.iter().map(|i| i.timestamp).collect();
        let added_during_run: LocationQueue = self
            .get_queue()
            .await?
            .into_iter()
            .filter(|i| !processed.contains(&i.timestamp))
            .collect();
        let carried = added_during_run.len();

        failed.extend(added_during_run);
        self.write_queue(&failed).await?;
        Ok(carried)
    }

    async fn write_queue(&self, items: &[LocationQueueItem]) -> QueueResult<()> {
        for item in items {
            item.ensure_finite()?;
        }

        let raw = serde_json::to_string(items)?;
        self.storage.set(OFFLINE_QUEUE_KEY, &raw).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueueError;
    use crate::test_support::{item, FailingStorage};
    use waypost_core::ValidationError;
    use waypost_storage::MemoryStorage;

    fn memory_queue() -> (OfflineQueue, MemoryStorage) {
        let storage = MemoryStorage::new();
        (OfflineQueue::new(Arc::new(storage.clone())), storage)
    }

    #[tokio::test]
    async fn empty_storage_reads_as_empty_queue() {
        let (queue, _) = memory_queue();
        assert!(queue.get_queue().await.unwrap().is_empty());
        assert!(queue.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn empty_string_payload_reads_as_empty_queue() {
        let (queue, storage) = memory_queue();
        storage.set(OFFLINE_QUEUE_KEY, "").await.unwrap();
        assert!(queue.get_queue().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_then_get_preserves_order() {
        let (queue, _) = memory_queue();
        let items = vec![item(3), item(1), item(2)];

        queue.update_queue(&items).await.unwrap();
        assert_eq!(queue.get_queue().await.unwrap(), items);
    }

    #[tokio::test]
    async fn add_appends_last() {
        let (queue, _) = memory_queue();
        queue.add(item(1)).await.unwrap();
        queue.add(item(2)).await.unwrap();
        queue.add(item(3)).await.unwrap();

        let timestamps: Vec<i64> = queue
            .get_queue()
            .await
            .unwrap()
            .iter()
            .map(|i| i.timestamp)
            .collect();
        assert_eq!(timestamps, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn remove_matches_by_timestamp_only() {
        let (queue, _) = memory_queue();
        let a = item(10);
        let b = item(20);
        queue.add(a.clone()).await.unwrap();
        queue.add(b.clone()).await.unwrap();

        let mut same_time_other_position = item(10);
        same_time_other_position.latitude = 1.0;
        queue.remove(&same_time_other_position).await.unwrap();

        assert_eq!(queue.get_queue().await.unwrap(), vec![b]);
    }

    #[tokio::test]
    async fn remove_drops_every_duplicate_timestamp() {
        let (queue, _) = memory_queue();
        queue
            .update_queue(&[item(5), item(6), item(5)])
            .await
            .unwrap();

        assert_eq!(queue.remove_by_timestamp(5).await.unwrap(), 2);
        assert_eq!(queue.get_queue().await.unwrap(), vec![item(6)]);
    }

    #[tokio::test]
    async fn malformed_payload_fails_validation() {
        let (queue, storage) = memory_queue();
        storage
            .set(OFFLINE_QUEUE_KEY, r#"[{"timestamp":"yesterday"}]"#)
            .await
            .unwrap();

        let result = queue.get_queue().await;
        assert!(matches!(result, Err(QueueError::Validation(_))));

        // add must not silently replace a payload it cannot read
        let result = queue.add(item(1)).await;
        assert!(matches!(result, Err(QueueError::Validation(_))));
        assert_eq!(
            storage.get_string(OFFLINE_QUEUE_KEY).await.unwrap().as_deref(),
            Some(r#"[{"timestamp":"yesterday"}]"#)
        );
    }

    #[tokio::test]
    async fn non_finite_sample_is_rejected_and_queue_stays_readable() {
        let (queue, _) = memory_queue();
        queue.add(item(1)).await.unwrap();

        let mut broken = item(2);
        broken.altitude = f64::NAN;
        let result = queue.add(broken.clone()).await;
        assert!(matches!(
            result,
            Err(QueueError::Validation(ValidationError::NonFiniteField {
                timestamp: 2,
                field: "altitude"
            }))
        ));

        broken.altitude = 10.0;
        broken.speed = Some(f64::NEG_INFINITY);
        assert!(queue.update_queue(&[item(1), broken]).await.is_err());

        assert_eq!(queue.get_queue().await.unwrap(), vec![item(1)]);
        queue.add(item(3)).await.unwrap();
        assert_eq!(queue.get_queue().await.unwrap(), vec![item(1), item(3)]);
    }

    #[tokio::test]
    async fn clear_resets_invalid_payload() {
        let (queue, storage) = memory_queue();
        storage.set(OFFLINE_QUEUE_KEY, "not json").await.unwrap();

        queue.clear().await.unwrap();
        assert!(queue.get_queue().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn storage_errors_propagate() {
        let queue = OfflineQueue::new(Arc::new(FailingStorage));

        assert!(matches!(queue.get_queue().await, Err(QueueError::Storage(_))));
        assert!(matches!(queue.add(item(1)).await, Err(QueueError::Storage(_))));
        assert!(matches!(queue.remove(&item(1)).await, Err(QueueError::Storage(_))));
        assert!(matches!(
            queue.update_queue(&[item(1)]).await,
            Err(QueueError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn device_id_read_failure_is_none() {
        let queue = OfflineQueue::new(Arc::new(FailingStorage));
        assert_eq!(queue.gps_device_id().await, None);
    }

    #[tokio::test]
    async fn device_id_unset_then_set() {
        let (queue, _) = memory_queue();
        assert_eq!(queue.gps_device_id().await, None);

        queue.update_device_id("tracker-1").await.unwrap();
        assert_eq!(queue.gps_device_id().await.as_deref(), Some("tracker-1"));

        queue.update_device_id("tracker-2").await.unwrap();
        assert_eq!(queue.gps_device_id().await.as_deref(), Some("tracker-2"));
    }

    #[tokio::test]
    async fn blank_device_id_is_ignored() {
        let (queue, _) = memory_queue();
        queue.update_device_id("tracker-1").await.unwrap();

        queue.update_device_id("").await.unwrap();
        queue.update_device_id("   ").await.unwrap();

        assert_eq!(queue.gps_device_id().await.as_deref(), Some("tracker-1"));
    }

    #[tokio::test]
    async fn commit_keeps_failed_then_items_added_during_run() {
        let (queue, _) = memory_queue();
        let snapshot = vec![item(1), item(2)];
        queue.update_queue(&snapshot).await.unwrap();
        queue.add(item(3)).await.unwrap();

        let carried = queue.commit_batch(&snapshot, vec![item(2)]).await.unwrap();

        assert_eq!(carried, 1);
        assert_eq!(queue.get_queue().await.unwrap(), vec![item(2), item(3)]);
    }
}
