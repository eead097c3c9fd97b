use anyhow::bail;
use chrono::Utc;
use clap::Args;
use waypost_core::strings::is_null_or_blank;
use waypost_core::LocationQueueItem;

/// Position fields accepted by `waypost add`.
#[derive(Args, Debug, Clone)]
pub struct SampleArgs {
    /// Latitude in degrees
    #[arg(long = "lat", allow_hyphen_values = true)]
    pub latitude: f64,
    /// Longitude in degrees
    #[arg(long = "lon", allow_hyphen_values = true)]
    pub longitude: f64,
    /// Altitude in meters
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub altitude: f64,
    /// Position accuracy in meters
    #[arg(long, default_value_t = 0.0)]
    pub accuracy: f64,
    /// Altitude accuracy in meters
    #[arg(long, default_value_t = 0.0)]
    pub altitude_accuracy: f64,
    /// Heading in degrees clockwise from north
    #[arg(long, default_value_t = 0.0)]
    pub heading: f64,
    /// Speed in meters per second
    #[arg(long)]
    pub speed: Option<f64>,
    /// Capture time in milliseconds since epoch (defaults to now)
    #[arg(long)]
    pub timestamp: Option<i64>,
    /// Device the sample belongs to
    #[arg(long)]
    pub device_id: Option<String>,
}

impl SampleArgs {
    /// Build a queue item, stamping it with `now_ms` when no timestamp was given.
    pub fn into_item(self, now_ms: i64) -> anyhow::Result<LocationQueueItem> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            bail!("latitude must be between -90 and 90, got {}", self.latitude);
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            bail!("longitude must be between -180 and 180, got {}", self.longitude);
        }

        let readings = [
            ("altitude", Some(self.altitude)),
            ("accuracy", Some(self.accuracy)),
            ("altitude-accuracy", Some(self.altitude_accuracy)),
            ("heading", Some(self.heading)),
            ("speed", self.speed),
        ];
        for (name, value) in readings {
            if let Some(value) = value.filter(|v| !v.is_finite()) {
                bail!("{} must be a finite number, got {}", name, value);
            }
        }

        let gps_device_id = if is_null_or_blank(self.device_id.as_deref()) {
            None
        } else {
            self.device_id.map(|id| id.trim().to_string())
        };

        Ok(LocationQueueItem {
            timestamp: self.timestamp.unwrap_or(now_ms),
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
            accuracy: self.accuracy,
            altitude_accuracy: self.altitude_accuracy,
            heading: self.heading,
            speed: self.speed,
            gps_device_id,
        })
    }
}

/// Current time in milliseconds since epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
