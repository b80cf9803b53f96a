use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Timer};
use esp_hal::gpio::Input;
use log::{debug, info};
use nimbus_core::{ButtonEvent, ButtonPublisher};

/// Settle time after an edge before the level is trusted
const DEBOUNCE: Duration = Duration::from_millis(50);

/// Publish `event` once per debounced press of an active-low button
#[embassy_executor::task(pool_size = 2)]
pub async fn button_watcher(
    mut button: Input<'static>,
    event: ButtonEvent,
    publisher: ButtonPublisher<'static, CriticalSectionRawMutex>,
) {
    info!("Watching {:?} button", event);

    loop {
        button.wait_for_falling_edge().await;
        Timer::after(DEBOUNCE).await;

        if button.is_low() {
            debug!("{:?} button pressed", event);
            // Drops the oldest click if the coordinator is behind
            publisher.publish_immediate(event);

            // One event per press, not per bounce
            button.wait_for_rising_edge().await;
            Timer::after(DEBOUNCE).await;
        }
    }
}
