//! Offline location queue and delivery infrastructure for Waypost.
//!
//! - [`OfflineQueue`]: durable queue of pending samples plus the device id.
//! - [`OfflineQueue::run_batch_task`]: sequential delivery with cooldown that
//!   keeps only failed samples.
//! - [`HttpDelivery`]: JSON-over-HTTP [`DeliveryHandler`].
//! - [`SyncService`]: runs batches on a fixed interval.

pub mod batch;
pub mod delivery;
pub mod error;
pub mod http;
pub mod queue;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;

pub use batch::{BatchResult, BatchTaskOptions};
pub use delivery::{DeliveryHandler, DeliveryOutcome};
pub use error::{QueueError, QueueResult};
pub use http::HttpDelivery;
pub use queue::OfflineQueue;
pub use sync::{SyncService, SyncServiceConfig};
