use nimbus_core::config::{CloudConfig, InternetConfig};
use nimbus_core::{CoordinatorConfig, DeviceConfig};

/// Device configuration baked in by `build.rs` from `.env`
pub fn device_config() -> DeviceConfig<'static> {
    DeviceConfig {
        internet: InternetConfig {
            ssid: env!("NIMBUS_WIFI_SSID"),
            password: env!("NIMBUS_WIFI_PASSWORD"),
        },
        cloud: CloudConfig {
            url: env!("NIMBUS_CLOUD_URL"),
        },
        coordinator: CoordinatorConfig::default(),
    }
}
