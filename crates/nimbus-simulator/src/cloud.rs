//! Simulated cloud endpoint
//!
//! Produces a batch of synthetic readings ending at the current time, after
//! an artificial latency so the sync badge and button handling during a
//! fetch can be observed.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use log::info;
use nimbus_core::{DataService, FetchError, SensorReading};

use crate::config::MockCloudConfig;
use crate::platform::{Controls, sleep_until};

/// Synthetic weather station readings that drift over time
fn reading_at(timestamp: u32) -> SensorReading {
    let t = f64::from(timestamp);

    // Temperature: 18-26 C daily swing with a faster wobble
    let temperature = 22.0 + 4.0 * (t / 13_751.0).sin() + 0.6 * (t / 1_337.0).cos();

    // Pressure: slow weather fronts around 1013 hPa
    let pressure = 1013.0 + 6.0 * (t / 40_000.0).sin() + 0.8 * (t / 2_900.0).cos();

    // Humidity: 40-70 % roughly opposite to temperature
    let humidity = 55.0 - 12.0 * (t / 13_751.0).sin() + 3.0 * (t / 977.0).cos();

    SensorReading::new(
        timestamp,
        temperature as f32,
        pressure as f32,
        humidity as f32,
    )
}

/// Generate `count` readings spaced `spacing_secs` apart, ending at `end`
pub fn history(count: usize, spacing_secs: u32, end: u32) -> Vec<SensorReading> {
    let span = spacing_secs.saturating_mul(count.saturating_sub(1) as u32);
    let start = end.saturating_sub(span);
    (0..count as u32)
        .map(|i| reading_at(start + i * spacing_secs))
        .collect()
}

pub struct MockCloud<'a> {
    config: MockCloudConfig,
    controls: &'a Controls,
    fetches: usize,
}

impl<'a> MockCloud<'a> {
    pub fn new(config: MockCloudConfig, controls: &'a Controls) -> Self {
        Self {
            config,
            controls,
            fetches: 0,
        }
    }
}

impl DataService for MockCloud<'_> {
    async fn fetch_readings(&mut self) -> Result<Vec<SensorReading>, FetchError> {
        self.fetches += 1;
        info!("Simulated fetch #{} started", self.fetches);
        sleep_until(Instant::now() + Duration::from_millis(self.config.latency_ms)).await;

        if self.controls.failing.get() {
            return Err(FetchError::Transport("simulated outage"));
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as u32;
        Ok(history(
            self.config.samples,
            self.config.sample_spacing_secs,
            now,
        ))
    }
}
