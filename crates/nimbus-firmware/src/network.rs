//! Wi-Fi station management
//!
//! [`connection_task`] keeps the station associated, reconnecting after a
//! drop; [`net_task`] drives the embassy-net stack. The coordinator only sees
//! the link through [`WifiLink`].

use embassy_net::{Runner, Stack};
use embassy_time::{Duration, Timer};
use esp_radio::wifi::{
    ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent, WifiStaState,
};
use log::{error, info, warn};
use nimbus_core::NetworkStatus;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[embassy_executor::task]
pub async fn connection_task(
    mut controller: WifiController<'static>,
    ssid: &'static str,
    password: &'static str,
) {
    info!("Starting Wi-Fi connection task for SSID {}", ssid);

    loop {
        if matches!(esp_radio::wifi::sta_state(), WifiStaState::Connected) {
            // Wait until we're no longer connected
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            warn!("Wi-Fi disconnected");
            Timer::after(RECONNECT_DELAY).await;
        }

        if !matches!(controller.is_started(), Ok(true)) {
            let config = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(ssid.into())
                    .with_password(password.into()),
            );
            if let Err(e) = controller.set_config(&config) {
                error!("Invalid Wi-Fi configuration: {:?}", e);
                Timer::after(RECONNECT_DELAY).await;
                continue;
            }
            if let Err(e) = controller.start_async().await {
                error!("Failed to start Wi-Fi: {:?}", e);
                Timer::after(RECONNECT_DELAY).await;
                continue;
            }
            info!("Wi-Fi started");
        }

        match controller.connect_async().await {
            Ok(()) => info!("Wi-Fi connected"),
            Err(e) => {
                warn!("Failed to connect to Wi-Fi: {:?}", e);
                Timer::after(RECONNECT_DELAY).await;
            }
        }
    }
}

#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

/// Online once the link is up and DHCP has assigned an address
#[derive(Clone, Copy)]
pub struct WifiLink {
    stack: Stack<'static>,
}

impl WifiLink {
    pub fn new(stack: Stack<'static>) -> Self {
        Self { stack }
    }
}

impl NetworkStatus for WifiLink {
    fn is_connected(&self) -> bool {
        self.stack.is_link_up() && self.stack.is_config_up()
    }
}
