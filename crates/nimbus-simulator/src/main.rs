//! Desktop simulator for the nimbus cloud telemetry display.
//!
//! Runs the real nimbus-core coordinator against a simulated cloud endpoint
//! and renders the telemetry screen in an SDL2 window via
//! `embedded-graphics-simulator`.
//!
//! # Key bindings
//!
//! | Key   | Action                          |
//! |-------|---------------------------------|
//! | Left  | Previous metric (back button)   |
//! | Right | Next metric (forward button)    |
//! | W     | Toggle Wi-Fi link               |
//! | F     | Toggle simulated fetch failures |
//! | Q     | Quit                            |
//!
//! Set `NIMBUS_CONFIG` to a TOML file to override the defaults, see
//! `simulator.toml`.

mod cloud;
mod config;
mod platform;

use std::pin::pin;
use std::task::Poll;
use std::time::{Duration, Instant};

use embassy_futures::poll_once;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::pubsub::PubSubChannel;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{error, info};

use nimbus_core::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, TelemetryScreen};
use nimbus_core::{ButtonChannel, ButtonEvent, Coordinator};

use crate::cloud::MockCloud;
use crate::platform::{Controls, FrameDelay, SimulatedLink, SystemClock};

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 2;

/// Target frame duration (~30 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(33);

type Screen = TelemetryScreen<SimulatorDisplay<Rgb565>>;

fn keycode_to_button(keycode: Keycode) -> Option<ButtonEvent> {
    match keycode {
        Keycode::Left | Keycode::A => Some(ButtonEvent::Previous),
        Keycode::Right | Keycode::D => Some(ButtonEvent::Next),
        _ => None,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    info!("Starting nimbus simulator");
    info!(
        "Display: {}x{} (scale {}x)",
        DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX, WINDOW_SCALE
    );
    info!("Keys: Left/Right=Metric  W=Wi-Fi  F=Fail fetches  Q=Quit");

    let config = config::load()?;
    let controls = Controls::new(config.cloud.start_online);

    let display: Mutex<CriticalSectionRawMutex, Screen> =
        Mutex::new(TelemetryScreen::new(SimulatorDisplay::new(Size::new(
            DISPLAY_WIDTH_PX,
            DISPLAY_HEIGHT_PX,
        ))));
    let buttons: ButtonChannel<CriticalSectionRawMutex> = PubSubChannel::new();
    let publisher = buttons.immediate_publisher();

    let mut coordinator = Coordinator::new(
        &display,
        MockCloud::new(config.cloud, &controls),
        SimulatedLink(&controls),
        SystemClock,
        FrameDelay,
        config.coordinator,
    );

    let mut app = pin!(async {
        coordinator.initialize(&buttons).await?;
        coordinator.run().await
    });

    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("Nimbus Simulator", &output_settings);

    // The SDL window is lazily initialized on the first `update()` call.
    // It must be updated once before `events()` or it will panic.
    if let Ok(screen) = display.try_lock() {
        window.update(screen.target());
    }

    'running: loop {
        let frame_start = Instant::now();

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,

                SimulatorEvent::KeyDown { keycode, .. } => match keycode {
                    Keycode::Q | Keycode::Escape => break 'running,
                    Keycode::W => {
                        let online = Controls::toggle(&controls.online);
                        info!("Wi-Fi link {}", if online { "up" } else { "down" });
                    }
                    Keycode::F => {
                        let failing = Controls::toggle(&controls.failing);
                        info!("Simulated fetch failures {}", if failing { "on" } else { "off" });
                    }
                    other => {
                        if let Some(button) = keycode_to_button(other) {
                            publisher.publish_immediate(button);
                        }
                    }
                },

                _ => {}
            }
        }

        // Advance the coordinator until it waits on a timer, fetch or button
        match poll_once(app.as_mut()) {
            Poll::Ready(Err(e)) => {
                error!("Coordinator stopped: {}", e);
                break 'running;
            }
            Poll::Ready(Ok(never)) => match never {},
            Poll::Pending => {}
        }

        if let Ok(screen) = display.try_lock() {
            window.update(screen.target());
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    info!("Simulator exiting");
    Ok(())
}
