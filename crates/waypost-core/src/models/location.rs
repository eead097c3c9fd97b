use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One pending location sample awaiting delivery to the remote tracking service.
///
/// Every key is required in the persisted form. `speed` and `gps_device_id`
/// accept `null` but a missing key is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationQueueItem {
    /// Capture time in milliseconds since epoch. Unique within a device's queue.
    pub timestamp: i64,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Altitude in meters above the WGS 84 ellipsoid. Platforms without a
    /// reading store a sentinel value.
    pub altitude: f64,
    /// Radius of uncertainty of the position, in meters.
    pub accuracy: f64,
    /// Accuracy of the altitude value, in meters.
    pub altitude_accuracy: f64,
    /// Direction of travel in degrees clockwise from due north.
    pub heading: f64,
    /// Instantaneous speed in meters per second.
    #[serde(deserialize_with = "Option::deserialize")]
    pub speed: Option<f64>,
    /// Remote tracking device this sample is attributed to.
    #[serde(deserialize_with = "Option::deserialize")]
    pub gps_device_id: Option<String>,
}

impl LocationQueueItem {
    /// Capture time as a UTC datetime, `None` if the timestamp is out of range.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Attribute the sample to `device_id` unless it already carries one.
    pub fn with_device_id(mut self, device_id: Option<&str>) -> Self {
        if self.gps_device_id.is_none() {
            self.gps_device_id = device_id.map(str::to_string);
        }
        self
    }

    /// Reject NaN and infinite readings. JSON has no encoding for them, so a
    /// persisted queue containing one would no longer parse.
    pub fn ensure_finite(&self) -> Result<(), ValidationError> {
        let fields = [
            ("latitude", Some(self.latitude)),
            ("longitude", Some(self.longitude)),
            ("altitude", Some(self.altitude)),
            ("accuracy", Some(self.accuracy)),
            ("altitudeAccuracy", Some(self.altitude_accuracy)),
            ("heading", Some(self.heading)),
            ("speed", self.speed),
        ];

        match fields
            .into_iter()
            .find(|(_, value)| value.is_some_and(|v| !v.is_finite()))
        {
            Some((field, _)) => Err(ValidationError::NonFiniteField {
                timestamp: self.timestamp,
                field,
            }),
            None => Ok(()),
        }
    }
}

/// Ordered sequence of pending samples, oldest first.
pub type LocationQueue = Vec<LocationQueueItem>;

/// Parse and validate a persisted queue payload.
///
/// Fails on invalid JSON, on a top-level value that is not an array, and on any
/// element that does not match the [`LocationQueueItem`] shape. Unknown keys on
/// an element are ignored.
pub fn parse_location_queue(raw: &str) -> Result<LocationQueue, ValidationError> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(ValidationError::Json)?;

    let elements = match value {
        serde_json::Value::Array(elements) => elements,
        other => {
            return Err(ValidationError::NotAnArray {
                found: json_kind(&other),
            })
        }
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            serde_json::from_value::<LocationQueueItem>(element)
                .map_err(|source| ValidationError::InvalidItem { index, source })
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
