use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Instant;
use log::debug;
use nimbus_core::WallClock;

/// Wall clock anchored to the newest cloud reading
///
/// The board has neither a battery-backed RTC nor an SNTP client, so the
/// cloud timestamps are the only wall-clock source. The time stays unknown
/// until the first batch arrives and then runs off the embassy timer.
pub struct CloudClock {
    anchor: Mutex<CriticalSectionRawMutex, Cell<Option<(u32, Instant)>>>,
}

impl Default for CloudClock {
    fn default() -> Self {
        Self::new()
    }
}

impl CloudClock {
    pub const fn new() -> Self {
        Self {
            anchor: Mutex::new(Cell::new(None)),
        }
    }

    /// Re-anchor the clock unless `unix_secs` is behind the current time
    pub fn sync(&self, unix_secs: u32) {
        if self.now().is_some_and(|now| now > unix_secs) {
            return;
        }
        debug!("Clock synced to {}", unix_secs);
        self.anchor
            .lock(|anchor| anchor.set(Some((unix_secs, Instant::now()))));
    }
}

impl WallClock for CloudClock {
    fn now(&self) -> Option<u32> {
        let (secs, at) = self.anchor.lock(Cell::get)?;
        let elapsed = u32::try_from(at.elapsed().as_secs()).unwrap_or(u32::MAX);
        Some(secs.saturating_add(elapsed))
    }
}
