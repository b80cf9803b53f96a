use serde::{Deserialize, Serialize};

use crate::selector::Metric;

/// Borrowed device configuration, usually baked in at build time
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct DeviceConfig<'a> {
    pub internet: InternetConfig<'a>,
    pub cloud: CloudConfig<'a>,
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct InternetConfig<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct CloudConfig<'a> {
    /// Full URL of the "latest readings" endpoint
    pub url: &'a str,
}

/// Tuning constants of the poll/render coordinator
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Seconds between two cloud polls
    pub poll_interval_secs: u32,
    /// Whole-hour offset from UTC for the status clock
    pub timezone_offset_hours: i8,
    /// Metric graphed before any button is pressed
    pub initial_metric: Metric,
    /// How long the splash screen stays up during initialization
    pub splash_duration_ms: u32,
}

impl CoordinatorConfig {
    pub const DEFAULT_POLL_INTERVAL_SECS: u32 = 60;
    pub const DEFAULT_TIMEZONE_OFFSET_HOURS: i8 = -8;
    pub const DEFAULT_SPLASH_DURATION_MS: u32 = 3_000;

    /// Poll interval in milliseconds, saturating
    pub const fn poll_interval_ms(&self) -> u32 {
        self.poll_interval_secs.saturating_mul(1_000)
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: Self::DEFAULT_POLL_INTERVAL_SECS,
            timezone_offset_hours: Self::DEFAULT_TIMEZONE_OFFSET_HOURS,
            initial_metric: Metric::Temperature,
            splash_duration_ms: Self::DEFAULT_SPLASH_DURATION_MS,
        }
    }
}
