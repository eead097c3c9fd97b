//! Storage keys and defaults shared by every Waypost component.

use std::time::Duration;

/// Key holding the active session's remote tracking device id.
pub const GPS_DEVICE_ID_KEY: &str = "gps-device-id";

/// Key holding the JSON-encoded array of pending samples.
pub const OFFLINE_QUEUE_KEY: &str = "offline-queue";

/// Pause after each delivery attempt within a batch run.
pub const DEFAULT_BATCH_COOLDOWN: Duration = Duration::from_secs(5);
