//! Graph selection state machine
//!
//! The selector decides which metric series is currently drawn on the data
//! screen. It is driven by the two hardware buttons and cycles through every
//! [`Metric`] in both directions without a terminal state.

use serde::{Deserialize, Serialize};

use crate::telemetry::SensorReading;

/// Number of metrics the device can graph
pub const METRIC_COUNT: usize = 3;

/// A graphable metric reported by the cloud service
///
/// The discriminant doubles as the series index handed to the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Air temperature in degrees Celsius
    #[default]
    Temperature = 0,
    /// Barometric pressure in hectopascal
    Pressure = 1,
    /// Relative humidity in percent
    Humidity = 2,
}

impl Metric {
    /// All metrics in display order
    pub const ALL: [Metric; METRIC_COUNT] = [Self::Temperature, Self::Pressure, Self::Humidity];

    /// Series index used by the display service
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look up a metric by series index
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Temperature),
            1 => Some(Self::Pressure),
            2 => Some(Self::Humidity),
            _ => None,
        }
    }

    /// Cyclic successor (Humidity wraps to Temperature)
    pub const fn next(self) -> Self {
        match self {
            Self::Temperature => Self::Pressure,
            Self::Pressure => Self::Humidity,
            Self::Humidity => Self::Temperature,
        }
    }

    /// Cyclic predecessor (Temperature wraps to Humidity)
    pub const fn prev(self) -> Self {
        match self {
            Self::Temperature => Self::Humidity,
            Self::Pressure => Self::Temperature,
            Self::Humidity => Self::Pressure,
        }
    }

    /// Get a label for display
    pub const fn label(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Pressure => "Pressure",
            Self::Humidity => "Humidity",
        }
    }

    /// Get the unit suffix for display (ASCII fonts only)
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "C",
            Self::Pressure => "hPa",
            Self::Humidity => "%",
        }
    }

    /// Extract this metric's value from a reading
    pub const fn value_of(self, reading: &SensorReading) -> f32 {
        match self {
            Self::Temperature => reading.temperature,
            Self::Pressure => reading.pressure,
            Self::Humidity => reading.humidity,
        }
    }
}

/// Which metric the data screen is currently graphing
///
/// Pure state: transitions never render. The coordinator redraws after
/// calling [`advance`](Self::advance) or [`retreat`](Self::retreat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphSelector {
    current: Metric,
}

impl GraphSelector {
    pub const fn new(initial: Metric) -> Self {
        Self { current: initial }
    }

    pub const fn current(&self) -> Metric {
        self.current
    }

    /// Move to the next metric and return it
    pub fn advance(&mut self) -> Metric {
        self.current = self.current.next();
        self.current
    }

    /// Move to the previous metric and return it
    pub fn retreat(&mut self) -> Metric {
        self.current = self.current.prev();
        self.current
    }
}
