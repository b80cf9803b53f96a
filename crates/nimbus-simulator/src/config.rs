use std::fs;

use anyhow::Context;
use log::info;
use nimbus_core::CoordinatorConfig;
use serde::Deserialize;

/// Environment variable naming an optional TOML config file
pub const CONFIG_ENV_VAR: &str = "NIMBUS_CONFIG";

/// Poll faster than the device so changes show up while watching
const SIMULATOR_POLL_INTERVAL_SECS: u32 = 10;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulatorConfig {
    pub coordinator: CoordinatorConfig,
    pub cloud: MockCloudConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            coordinator: CoordinatorConfig {
                poll_interval_secs: SIMULATOR_POLL_INTERVAL_SECS,
                ..CoordinatorConfig::default()
            },
            cloud: MockCloudConfig::default(),
        }
    }
}

/// Behavior of the simulated cloud endpoint
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct MockCloudConfig {
    /// Artificial response time of every fetch
    pub latency_ms: u64,
    /// Readings returned per fetch
    pub samples: usize,
    /// Seconds between two returned readings
    pub sample_spacing_secs: u32,
    pub start_online: bool,
}

impl Default for MockCloudConfig {
    fn default() -> Self {
        Self {
            latency_ms: 600,
            samples: 60,
            sample_spacing_secs: 60,
            start_online: true,
        }
    }
}

/// Load the config named by [`CONFIG_ENV_VAR`], or the defaults
pub fn load() -> anyhow::Result<SimulatorConfig> {
    let Ok(path) = std::env::var(CONFIG_ENV_VAR) else {
        info!("{} not set, using default configuration", CONFIG_ENV_VAR);
        return Ok(SimulatorConfig::default());
    };

    let text = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path))?;
    let config = toml::from_str(&text).with_context(|| format!("Failed to parse {}", path))?;
    info!("Loaded configuration from {}", path);
    Ok(config)
}
