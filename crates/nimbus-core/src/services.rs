//! Service traits consumed by the coordinator
//!
//! The coordinator never touches hardware directly. Everything it needs from
//! the outside world is expressed here and injected through
//! [`Coordinator::new`](crate::coordinator::Coordinator::new), so the same
//! logic drives the ESP32-S3 firmware, the desktop simulator and the tests.

extern crate alloc;
use alloc::vec::Vec;

use thiserror_no_std::Error;

use crate::selector::Metric;
use crate::telemetry::{DecodeError, SensorReading};

/// Failure of a single fetch from the cloud data service
///
/// Every variant is transient from the coordinator's point of view: it is
/// logged and the next poll tick simply tries again.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(&'static str),
    #[error("Unexpected HTTP status {status}")]
    Status { status: u16 },
    #[error("Response larger than {max} bytes")]
    ResponseTooLarge { max: usize },
    #[error("Decode error: {0}")]
    Decode(DecodeError),
}

impl From<DecodeError> for FetchError {
    fn from(value: DecodeError) -> Self {
        Self::Decode(value)
    }
}

/// Remote source of the latest sensor readings
pub trait DataService {
    /// Fetch the latest batch of readings, oldest first
    ///
    /// Each call returns a full batch; there is no paging or streaming.
    fn fetch_readings(&mut self) -> impl Future<Output = Result<Vec<SensorReading>, FetchError>>;
}

/// Screen operations used by the coordinator
///
/// All operations are fire-and-forget: implementations log their own drawing
/// errors instead of returning them.
pub trait DisplayService {
    fn show_splash_screen(&mut self);

    fn show_data_screen(&mut self);

    /// Replace the status line text (the formatted wall clock)
    fn update_status(&mut self, text: &str);

    fn update_wifi_status(&mut self, connected: bool);

    fn update_sync_status(&mut self, syncing: bool);

    /// Draw `values` (oldest first) as the graph of `metric`
    ///
    /// `metric.index()` is the series index.
    fn update_graph(&mut self, metric: Metric, values: &[f32]);
}

/// Link state of the network adapter
pub trait NetworkStatus {
    /// Side-effect free; queried once per poll tick
    fn is_connected(&self) -> bool;
}

/// Source of wall-clock time for the status line
pub trait WallClock {
    /// Current unix time in seconds, `None` until the clock is known
    fn now(&self) -> Option<u32>;
}

impl<T: NetworkStatus + ?Sized> NetworkStatus for &T {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}

impl<T: WallClock + ?Sized> WallClock for &T {
    fn now(&self) -> Option<u32> {
        (**self).now()
    }
}
