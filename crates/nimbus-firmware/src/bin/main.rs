#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_net::StackResources;
use embassy_sync::mutex::Mutex;
use embassy_time::{Delay, Duration, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use log::{error, info};
use static_cell::StaticCell;

// Display-LCD panel specific imports
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::spi::master::{Config, Spi};
use mipidsi::interface::SpiInterface;
use mipidsi::{Builder as MipidsiBuilder, models::ILI9342CRgb565};

use nimbus_core::framebuffer::FrameBuffer;
use nimbus_core::ui::TelemetryScreen;
use nimbus_core::{ButtonEvent, Coordinator};
use nimbus_firmware::clock::CloudClock;
use nimbus_firmware::cloud::{CloudTcpState, HttpCloud};
use nimbus_firmware::network::{self, WifiLink};
use nimbus_firmware::panel::{self, PANEL_HEIGHT, PANEL_WIDTH, SPI_BUFFER_SIZE, SharedScreen};
use nimbus_firmware::{BUTTONS, buttons, config};

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

/// Sockets for DHCP, DNS and the HTTP connection
const NET_SOCKETS: usize = 3;

static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<NET_SOCKETS>> = StaticCell::new();
static TCP_STATE: StaticCell<CloudTcpState> = StaticCell::new();
static SPI_BUFFER: StaticCell<[u8; SPI_BUFFER_SIZE]> = StaticCell::new();
static SCREEN: StaticCell<SharedScreen> = StaticCell::new();
static CLOCK: CloudClock = CloudClock::new();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // generator version: 1.2.0

    rtt_target::rtt_init_log!();

    let hal_config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(hal_config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);
    // The framebuffer and HTTP buffers live in PSRAM
    esp_alloc::psram_allocator!(peripherals.PSRAM, esp_hal::psram);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized");

    let device = config::device_config();

    // Wi-Fi and network stack
    let radio = RADIO.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));
    let (wifi_controller, interfaces) =
        esp_radio::wifi::new(radio, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi controller");

    let rng = Rng::new();
    let seed = (u64::from(rng.random()) << 32) | u64::from(rng.random());
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        NET_RESOURCES.init(StackResources::new()),
        seed,
    );

    spawner
        .spawn(network::connection_task(
            wifi_controller,
            device.internet.ssid,
            device.internet.password,
        ))
        .expect("Failed to spawn Wi-Fi connection task");
    spawner
        .spawn(network::net_task(runner))
        .expect("Failed to spawn network task");

    // Configure and initialize the display

    // 1. Configure SPI bus
    let spi_bus = Spi::new(peripherals.SPI2, Config::default())
        .expect("Failed to configure SPI bus")
        .with_sck(peripherals.GPIO36)
        .with_mosi(peripherals.GPIO37);

    // 2. Chip select and data/command pins
    let cs = Output::new(peripherals.GPIO3, Level::High, OutputConfig::default());
    let dc = Output::new(peripherals.GPIO35, Level::Low, OutputConfig::default());

    // 3. Wrap the SPI bus as a SPI device (required by embedded-hal traits)
    let spi_device =
        ExclusiveDevice::new_no_delay(spi_bus, cs).expect("Failed to create SPI device");

    // 4. Build and initialize the display driver
    let di = SpiInterface::new(spi_device, dc, SPI_BUFFER.init([0; SPI_BUFFER_SIZE]));
    let panel = MipidsiBuilder::new(ILI9342CRgb565, di)
        .display_size(PANEL_WIDTH, PANEL_HEIGHT)
        .init(&mut Delay)
        .expect("Failed to initialize display");

    info!("Display initialized");

    let screen: &'static SharedScreen =
        SCREEN.init(Mutex::new(TelemetryScreen::new(FrameBuffer::default())));
    spawner
        .spawn(panel::flush_task(screen, panel))
        .expect("Failed to spawn panel flush task");

    // Navigation buttons, active low
    let input_config = InputConfig::default().with_pull(Pull::Up);
    spawner
        .spawn(buttons::button_watcher(
            Input::new(peripherals.GPIO12, input_config),
            ButtonEvent::Previous,
            BUTTONS.publisher().expect("No publisher slot for the back button"),
        ))
        .expect("Failed to spawn back button watcher");
    spawner
        .spawn(buttons::button_watcher(
            Input::new(peripherals.GPIO13, input_config),
            ButtonEvent::Next,
            BUTTONS.publisher().expect("No publisher slot for the forward button"),
        ))
        .expect("Failed to spawn forward button watcher");

    // Poll/render coordinator runs on the main task
    let cloud = HttpCloud::new(
        stack,
        TCP_STATE.init(CloudTcpState::new()),
        device.cloud.url,
        &CLOCK,
    );
    let mut coordinator = Coordinator::new(
        screen,
        cloud,
        WifiLink::new(stack),
        &CLOCK,
        Delay,
        device.coordinator,
    );

    match coordinator.initialize(&BUTTONS).await {
        Ok(()) => match coordinator.run().await {
            Ok(never) => match never {},
            Err(e) => error!("Coordinator stopped: {}", e),
        },
        Err(e) => error!("Coordinator failed to initialize: {}", e),
    }

    loop {
        Timer::after(Duration::from_secs(1)).await;
    }
}
