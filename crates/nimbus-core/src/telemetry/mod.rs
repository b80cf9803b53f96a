//! Telemetry data model
//!
//! Readings arrive from the cloud as a batch of timestamped
//! (temperature, pressure, humidity) triples. Each batch is split into one
//! [`MetricBuffer`] per metric and published as a [`TelemetrySnapshot`].

mod buffer;
mod snapshot;

pub use buffer::MetricBuffer;
pub use snapshot::{SharedSnapshot, TelemetrySnapshot};

extern crate alloc;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

/// Maximum number of samples kept per metric
///
/// Two hours of history at the default one-minute cloud cadence.
pub const MAX_SAMPLES: usize = 120;

/// One reading as reported by the cloud data service
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorReading {
    /// Unix timestamp (seconds) of the measurement
    pub timestamp: u32,
    /// Temperature in degrees Celsius
    pub temperature: f32,
    /// Pressure in hectopascal
    pub pressure: f32,
    /// Relative humidity in percent
    pub humidity: f32,
}

impl SensorReading {
    pub const fn new(timestamp: u32, temperature: f32, pressure: f32, humidity: f32) -> Self {
        Self {
            timestamp,
            temperature,
            pressure,
            humidity,
        }
    }
}

/// Body of the cloud "latest readings" endpoint
///
/// ```json
/// {"readings":[{"timestamp":1700000000,"temperature":21.5,"pressure":1013.2,"humidity":40.1}]}
/// ```
///
/// The batch length is bounded only by the response buffer. Trimming to
/// [`MAX_SAMPLES`] happens when the batch becomes a [`TelemetrySnapshot`].
#[derive(Debug, Deserialize)]
struct LatestReadings {
    readings: Vec<SensorReading>,
}

/// Errors produced while decoding a cloud payload
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed readings payload: {0:?}")]
    Json(serde_json_core::de::Error),
}

/// Decode the JSON body of the "latest readings" endpoint
///
/// Readings keep the order of the payload (oldest first).
pub fn decode_latest_readings(body: &[u8]) -> Result<Vec<SensorReading>, DecodeError> {
    let (latest, _) =
        serde_json_core::from_slice::<LatestReadings>(body).map_err(DecodeError::Json)?;
    Ok(latest.readings)
}
