use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::blocking_mutex::raw::RawMutex;

use super::{MetricBuffer, SensorReading};
use crate::selector::Metric;

/// The three metric buffers of one fetched reading batch
///
/// All three buffers always come from the same batch and have equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TelemetrySnapshot {
    temperature: MetricBuffer,
    pressure: MetricBuffer,
    humidity: MetricBuffer,
    /// Timestamp of the newest reading in the batch
    newest_timestamp: Option<u32>,
}

impl TelemetrySnapshot {
    /// Create an empty snapshot (no data fetched yet)
    pub const fn new() -> Self {
        Self {
            temperature: MetricBuffer::new(),
            pressure: MetricBuffer::new(),
            humidity: MetricBuffer::new(),
            newest_timestamp: None,
        }
    }

    /// Build a snapshot from a reading batch, oldest reading first
    pub fn from_readings(readings: &[SensorReading]) -> Self {
        let mut snapshot = Self::new();
        for metric in Metric::ALL {
            snapshot
                .buffer_mut(metric)
                .replace_all(readings.iter().map(|r| metric.value_of(r)));
        }
        snapshot.newest_timestamp = readings.last().map(|r| r.timestamp);
        snapshot
    }

    pub fn buffer(&self, metric: Metric) -> &MetricBuffer {
        match metric {
            Metric::Temperature => &self.temperature,
            Metric::Pressure => &self.pressure,
            Metric::Humidity => &self.humidity,
        }
    }

    fn buffer_mut(&mut self, metric: Metric) -> &mut MetricBuffer {
        match metric {
            Metric::Temperature => &mut self.temperature,
            Metric::Pressure => &mut self.pressure,
            Metric::Humidity => &mut self.humidity,
        }
    }

    /// Samples of one metric, oldest first
    pub fn series(&self, metric: Metric) -> &[f32] {
        self.buffer(metric).as_slice()
    }

    /// Number of readings held (identical for every metric)
    pub fn len(&self) -> usize {
        self.temperature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_empty()
    }

    pub fn newest_timestamp(&self) -> Option<u32> {
        self.newest_timestamp
    }
}

/// A [`TelemetrySnapshot`] shared between the poll loop and button handlers
///
/// Replacement swaps the whole snapshot inside one critical section, and
/// readers see the whole snapshot inside one critical section, so no reader
/// can observe buffers from two different batches. Callers build the new
/// snapshot before calling [`replace`](Self::replace) so the lock is only
/// held for the swap.
pub struct SharedSnapshot<M: RawMutex> {
    inner: BlockingMutex<M, RefCell<TelemetrySnapshot>>,
}

impl<M: RawMutex> SharedSnapshot<M> {
    pub const fn new() -> Self {
        Self {
            inner: BlockingMutex::new(RefCell::new(TelemetrySnapshot::new())),
        }
    }

    /// Atomically replace the current snapshot
    pub fn replace(&self, snapshot: TelemetrySnapshot) {
        self.inner.lock(|cell| {
            *cell.borrow_mut() = snapshot;
        });
    }

    /// Run `f` against a consistent view of the current snapshot
    ///
    /// Keep `f` short: it runs inside the critical section.
    pub fn read<R>(&self, f: impl FnOnce(&TelemetrySnapshot) -> R) -> R {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    /// Copy of the current snapshot
    pub fn get(&self) -> TelemetrySnapshot {
        self.read(TelemetrySnapshot::clone)
    }
}

impl<M: RawMutex> Default for SharedSnapshot<M> {
    fn default() -> Self {
        Self::new()
    }
}
