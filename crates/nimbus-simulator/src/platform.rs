//! Host stand-ins for the device's timer, clock and Wi-Fi link

use std::cell::Cell;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use embassy_futures::yield_now;
use embedded_hal_async::delay::DelayNs;
use nimbus_core::{NetworkStatus, WallClock};

/// Runtime toggles driven from the keyboard
#[derive(Debug)]
pub struct Controls {
    pub online: Cell<bool>,
    pub failing: Cell<bool>,
}

impl Controls {
    pub fn new(online: bool) -> Self {
        Self {
            online: Cell::new(online),
            failing: Cell::new(false),
        }
    }

    /// Flip a toggle and return its new value
    pub fn toggle(flag: &Cell<bool>) -> bool {
        let value = !flag.get();
        flag.set(value);
        value
    }
}

/// Wait until `deadline` without blocking the frame loop
///
/// The coordinator future is polled once per frame, so each pending poll
/// just hands control back to the window.
pub async fn sleep_until(deadline: Instant) {
    while Instant::now() < deadline {
        yield_now().await;
    }
}

/// Non-blocking delay backed by [`Instant`]
pub struct FrameDelay;

impl DelayNs for FrameDelay {
    async fn delay_ns(&mut self, ns: u32) {
        sleep_until(Instant::now() + Duration::from_nanos(u64::from(ns))).await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        sleep_until(Instant::now() + Duration::from_millis(u64::from(ms))).await;
    }
}

pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> Option<u32> {
        let secs = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs();
        u32::try_from(secs).ok()
    }
}

/// Link state toggled with the `W` key
pub struct SimulatedLink<'a>(pub &'a Controls);

impl NetworkStatus for SimulatedLink<'_> {
    fn is_connected(&self) -> bool {
        self.0.online.get()
    }
}
