//! SPI panel and the framebuffer flusher
//!
//! The coordinator draws into a [`FrameBuffer`] behind a mutex; the
//! [`flush_task`] periodically pushes whatever changed to the ILI9342 panel.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Timer};
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use esp_hal::Blocking;
use esp_hal::gpio::Output;
use esp_hal::spi::master::Spi;
use log::error;
use mipidsi::NoResetPin;
use mipidsi::interface::SpiInterface;
use mipidsi::models::ILI9342CRgb565;
use nimbus_core::framebuffer::FrameBuffer;
use nimbus_core::ui::TelemetryScreen;

pub const PANEL_WIDTH: u16 = 320;
pub const PANEL_HEIGHT: u16 = 240;

/// Bytes batched per SPI transfer
pub const SPI_BUFFER_SIZE: usize = 512;

const FLUSH_INTERVAL: Duration = Duration::from_millis(40);

pub type PanelSpi = ExclusiveDevice<Spi<'static, Blocking>, Output<'static>, NoDelay>;
pub type Panel =
    mipidsi::Display<SpiInterface<'static, PanelSpi, Output<'static>>, ILI9342CRgb565, NoResetPin>;

pub type Screen = TelemetryScreen<FrameBuffer>;
pub type SharedScreen = Mutex<CriticalSectionRawMutex, Screen>;

#[embassy_executor::task]
pub async fn flush_task(screen: &'static SharedScreen, mut panel: Panel) {
    loop {
        {
            let mut screen = screen.lock().await;
            if let Err(e) = screen.target_mut().flush(&mut panel) {
                error!("Panel flush failed: {:?}", e);
            }
        }
        Timer::after(FLUSH_INTERVAL).await;
    }
}
