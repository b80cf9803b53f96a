//! Poll/render coordinator
//!
//! The coordinator keeps the screen in sync with the cloud. Two loops run
//! side by side for the lifetime of the device:
//!
//! - the **poll loop** renders connectivity and the clock, fetches the latest
//!   readings when online, swaps in a new [`TelemetrySnapshot`] and redraws
//!   the selected graph, then sleeps for the poll interval;
//! - the **button loop** consumes [`ButtonEvent`]s, moves the
//!   [`GraphSelector`] and immediately redraws from the current snapshot.
//!
//! Both loops are polled by one `select`, so a slow fetch only suspends the
//! poll loop and button clicks are still handled while it is in flight.
//!
//! ## Locking
//!
//! - The snapshot lives in a [`SharedSnapshot`] and is swapped whole, so a
//!   render never sees buffers from two different fetches.
//! - The display lock is held only while drawing, never across a fetch or
//!   the poll delay.
//!
//! ## Usage
//!
//! ```rust,ignore
//! static BUTTONS: ButtonChannel<CriticalSectionRawMutex> = PubSubChannel::new();
//!
//! let mut coordinator = Coordinator::new(&display, cloud, wifi, clock, Delay, config);
//! coordinator.initialize(&BUTTONS).await?;
//! coordinator.run().await?;
//! ```

use core::cell::Cell;
use core::convert::Infallible;

use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::pubsub::WaitResult;
use embedded_hal_async::delay::DelayNs;
use log::{debug, error, info, warn};
use thiserror_no_std::Error;

use crate::buttons::{ButtonChannel, ButtonEvent, ButtonSubscriber};
use crate::config::CoordinatorConfig;
use crate::selector::{GraphSelector, Metric};
use crate::services::{DataService, DisplayService, NetworkStatus, WallClock};
use crate::status::format_status;
use crate::telemetry::{SharedSnapshot, TelemetrySnapshot};

/// Unrecoverable coordinator faults
///
/// Fetch failures never show up here; they are retried on the next tick.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("Button channel has no free subscriber slot")]
    ButtonSubscription,
    #[error("Coordinator must be initialized before it runs")]
    NotInitialized,
}

/// What a single poll tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No network link, fetch skipped
    Offline,
    /// Snapshot replaced with a new batch
    Refreshed { readings: usize },
    /// Fetch succeeded but returned nothing; snapshot kept
    NoNewData,
    /// Fetch failed; snapshot kept, retried next tick
    FetchFailed,
}

/// State shared by the poll loop and the button loop
struct Shared<'a, M: RawMutex, D> {
    display: &'a Mutex<M, D>,
    snapshot: SharedSnapshot<M>,
    selector: BlockingMutex<M, Cell<GraphSelector>>,
}

impl<'a, M, D> Shared<'a, M, D>
where
    M: RawMutex,
    D: DisplayService,
{
    fn selected(&self) -> Metric {
        self.selector.lock(|cell| cell.get().current())
    }

    /// Draw the selected metric from the current snapshot
    ///
    /// Selection and data are both read under the display lock, so the last
    /// render always shows the newest of each.
    async fn render_selected(&self) {
        let mut display = self.display.lock().await;
        let metric = self.selected();
        // Copied out so drawing happens outside the snapshot's critical section
        let series = self.snapshot.read(|snapshot| snapshot.buffer(metric).clone());
        display.update_graph(metric, series.as_slice());
    }

    async fn handle_button(&self, event: ButtonEvent) -> Metric {
        let metric = self.selector.lock(|cell| {
            let mut selector = cell.get();
            let metric = match event {
                ButtonEvent::Next => selector.advance(),
                ButtonEvent::Previous => selector.retreat(),
            };
            cell.set(selector);
            metric
        });

        info!("{:?} pressed, showing {} graph", event, metric.label());
        self.render_selected().await;
        metric
    }

    async fn button_loop(&self, subscriber: &mut ButtonSubscriber<'a, M>) -> Infallible {
        loop {
            match subscriber.next_message().await {
                WaitResult::Message(event) => {
                    self.handle_button(event).await;
                }
                WaitResult::Lagged(missed) => {
                    warn!("Missed {} button events while busy", missed);
                }
            }
        }
    }
}

/// Dependencies owned by the poll loop alone
struct Poller<S, N, C, T> {
    data: S,
    network: N,
    clock: C,
    delay: T,
}

impl<S, N, C, T> Poller<S, N, C, T>
where
    S: DataService,
    N: NetworkStatus,
    C: WallClock,
    T: DelayNs,
{
    async fn tick<M, D>(
        &mut self,
        shared: &Shared<'_, M, D>,
        config: &CoordinatorConfig,
    ) -> TickOutcome
    where
        M: RawMutex,
        D: DisplayService,
    {
        let connected = self.network.is_connected();
        let status = format_status(self.clock.now(), config.timezone_offset_hours);

        {
            let mut display = shared.display.lock().await;
            display.update_wifi_status(connected);
            display.update_status(&status);
            if connected {
                display.update_sync_status(true);
            }
        }

        let outcome = if connected {
            self.sync(shared).await
        } else {
            TickOutcome::Offline
        };

        shared.display.lock().await.update_sync_status(false);
        outcome
    }

    async fn sync<M, D>(&mut self, shared: &Shared<'_, M, D>) -> TickOutcome
    where
        M: RawMutex,
        D: DisplayService,
    {
        match self.data.fetch_readings().await {
            Ok(readings) if readings.is_empty() => {
                debug!("Cloud returned no readings, keeping current snapshot");
                TickOutcome::NoNewData
            }
            Ok(readings) => {
                let snapshot = TelemetrySnapshot::from_readings(&readings);
                shared.snapshot.replace(snapshot);
                shared.render_selected().await;
                TickOutcome::Refreshed {
                    readings: readings.len(),
                }
            }
            Err(e) => {
                warn!("Fetching readings failed, retrying next tick: {}", e);
                TickOutcome::FetchFailed
            }
        }
    }

    async fn poll_loop<M, D>(
        &mut self,
        shared: &Shared<'_, M, D>,
        config: &CoordinatorConfig,
    ) -> Infallible
    where
        M: RawMutex,
        D: DisplayService,
    {
        loop {
            let outcome = self.tick(shared, config).await;
            debug!("Poll tick finished: {:?}", outcome);
            self.delay.delay_ms(config.poll_interval_ms()).await;
        }
    }
}

/// Drives the telemetry screen from cloud data and button input
///
/// Generic over the raw mutex `M` guarding shared state, the display `D`,
/// the data service `S`, network status `N`, wall clock `C` and delay `T`.
pub struct Coordinator<'a, M, D, S, N, C, T>
where
    M: RawMutex,
{
    shared: Shared<'a, M, D>,
    poller: Poller<S, N, C, T>,
    config: CoordinatorConfig,
    buttons: Option<ButtonSubscriber<'a, M>>,
}

impl<'a, M, D, S, N, C, T> Coordinator<'a, M, D, S, N, C, T>
where
    M: RawMutex,
    D: DisplayService,
    S: DataService,
    N: NetworkStatus,
    C: WallClock,
    T: DelayNs,
{
    /// Create a coordinator with an empty snapshot
    ///
    /// The display is borrowed behind a mutex so other tasks (a framebuffer
    /// flusher, the simulator window) can read it between draws.
    pub fn new(
        display: &'a Mutex<M, D>,
        data: S,
        network: N,
        clock: C,
        delay: T,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            shared: Shared {
                display,
                snapshot: SharedSnapshot::new(),
                selector: BlockingMutex::new(Cell::new(GraphSelector::new(config.initial_metric))),
            },
            poller: Poller {
                data,
                network,
                clock,
                delay,
            },
            config,
            buttons: None,
        }
    }

    /// Subscribe to button events and bring up the screen
    ///
    /// Shows the splash screen for the configured duration, then switches to
    /// the data screen. Fails if the channel has no free subscriber slot.
    pub async fn initialize(
        &mut self,
        buttons: &'a ButtonChannel<M>,
    ) -> Result<(), CoordinatorError> {
        let subscriber = buttons.subscriber().map_err(|e| {
            error!("Failed to subscribe to button events: {:?}", e);
            CoordinatorError::ButtonSubscription
        })?;
        self.buttons = Some(subscriber);

        info!("Showing splash screen");
        self.shared.display.lock().await.show_splash_screen();
        self.poller
            .delay
            .delay_ms(self.config.splash_duration_ms)
            .await;
        self.shared.display.lock().await.show_data_screen();

        info!(
            "Coordinator ready: polling every {}s, showing {} graph",
            self.config.poll_interval_secs,
            self.shared.selected().label()
        );
        Ok(())
    }

    /// Run the poll loop and the button loop forever
    ///
    /// Only returns if the coordinator was never initialized.
    pub async fn run(&mut self) -> Result<Infallible, CoordinatorError> {
        let Self {
            shared,
            poller,
            config,
            buttons,
        } = self;
        let subscriber = buttons.as_mut().ok_or(CoordinatorError::NotInitialized)?;

        match select(poller.poll_loop(shared, config), shared.button_loop(subscriber)).await {
            Either::First(never) | Either::Second(never) => match never {},
        }
    }

    /// Run one poll tick without the trailing delay
    pub async fn tick(&mut self) -> TickOutcome {
        self.poller.tick(&self.shared, &self.config).await
    }

    /// Apply a button event and redraw the newly selected graph
    pub async fn handle_button(&self, event: ButtonEvent) -> Metric {
        self.shared.handle_button(event).await
    }

    /// Metric currently selected for graphing
    pub fn selected_metric(&self) -> Metric {
        self.shared.selected()
    }

    /// Copy of the current snapshot
    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.shared.snapshot.get()
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons::BUTTON_CHANNEL_CAPACITY;
    use crate::services::FetchError;
    use crate::telemetry::SensorReading;
    use core::cell::RefCell;
    use embassy_futures::{block_on, yield_now};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_sync::signal::Signal;
    use std::collections::VecDeque;
    use std::string::{String, ToString};
    use std::vec;
    use std::vec::Vec;

    type Raw = CriticalSectionRawMutex;

    #[derive(Debug, Clone, PartialEq)]
    enum DisplayCall {
        Splash,
        DataScreen,
        Status(String),
        Wifi(bool),
        Sync(bool),
        Graph(Metric, Vec<f32>),
    }

    #[derive(Default)]
    struct RecordingDisplay {
        calls: Vec<DisplayCall>,
    }

    impl DisplayService for RecordingDisplay {
        fn show_splash_screen(&mut self) {
            self.calls.push(DisplayCall::Splash);
        }

        fn show_data_screen(&mut self) {
            self.calls.push(DisplayCall::DataScreen);
        }

        fn update_status(&mut self, text: &str) {
            self.calls.push(DisplayCall::Status(text.to_string()));
        }

        fn update_wifi_status(&mut self, connected: bool) {
            self.calls.push(DisplayCall::Wifi(connected));
        }

        fn update_sync_status(&mut self, syncing: bool) {
            self.calls.push(DisplayCall::Sync(syncing));
        }

        fn update_graph(&mut self, metric: Metric, values: &[f32]) {
            self.calls.push(DisplayCall::Graph(metric, values.to_vec()));
        }
    }

    /// Observes fetches and can hold one of them open until released
    #[derive(Default)]
    struct FetchMonitor {
        calls: Cell<usize>,
        in_flight: Cell<bool>,
        gated_call: Cell<Option<usize>>,
        gate: Signal<Raw, ()>,
    }

    struct ScriptedData<'t> {
        responses: VecDeque<Result<Vec<SensorReading>, FetchError>>,
        monitor: &'t FetchMonitor,
    }

    impl DataService for ScriptedData<'_> {
        async fn fetch_readings(&mut self) -> Result<Vec<SensorReading>, FetchError> {
            let call = self.monitor.calls.get() + 1;
            self.monitor.calls.set(call);
            self.monitor.in_flight.set(true);
            if self.monitor.gated_call.get() == Some(call) {
                self.monitor.gate.wait().await;
            }
            self.monitor.in_flight.set(false);
            self.responses.pop_front().unwrap_or(Ok(Vec::new()))
        }
    }

    struct FixedNetwork<'t>(&'t Cell<bool>);

    impl NetworkStatus for FixedNetwork<'_> {
        fn is_connected(&self) -> bool {
            self.0.get()
        }
    }

    struct FixedClock(Option<u32>);

    impl WallClock for FixedClock {
        fn now(&self) -> Option<u32> {
            self.0
        }
    }

    /// Records requested delays and parks forever after `park_after` of them
    struct TestDelay<'t> {
        log: &'t RefCell<Vec<u32>>,
        park_after: usize,
    }

    impl DelayNs for TestDelay<'_> {
        async fn delay_ns(&mut self, _ns: u32) {
            yield_now().await;
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.log.borrow_mut().push(ms);
            if self.log.borrow().len() >= self.park_after {
                core::future::pending::<()>().await;
            }
            yield_now().await;
        }
    }

    type TestCoordinator<'t> =
        Coordinator<'t, Raw, RecordingDisplay, ScriptedData<'t>, FixedNetwork<'t>, FixedClock, TestDelay<'t>>;

    struct Fixture {
        display: Mutex<Raw, RecordingDisplay>,
        buttons: ButtonChannel<Raw>,
        monitor: FetchMonitor,
        connected: Cell<bool>,
        delays: RefCell<Vec<u32>>,
    }

    impl Fixture {
        fn new(connected: bool) -> Self {
            Self {
                display: Mutex::new(RecordingDisplay::default()),
                buttons: ButtonChannel::new(),
                monitor: FetchMonitor::default(),
                connected: Cell::new(connected),
                delays: RefCell::new(Vec::new()),
            }
        }

        fn coordinator(
            &self,
            responses: Vec<Result<Vec<SensorReading>, FetchError>>,
            park_after: usize,
        ) -> TestCoordinator<'_> {
            Coordinator::new(
                &self.display,
                ScriptedData {
                    responses: responses.into(),
                    monitor: &self.monitor,
                },
                FixedNetwork(&self.connected),
                FixedClock(Some(1_700_000_000)),
                TestDelay {
                    log: &self.delays,
                    park_after,
                },
                CoordinatorConfig::default(),
            )
        }

        fn calls(&self) -> Vec<DisplayCall> {
            self.display.try_lock().unwrap().calls.clone()
        }

        fn clear_calls(&self) {
            self.display.try_lock().unwrap().calls.clear();
        }

        fn graphs(&self) -> Vec<(Metric, Vec<f32>)> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    DisplayCall::Graph(metric, values) => Some((metric, values)),
                    _ => None,
                })
                .collect()
        }
    }

    fn batch_a() -> Vec<SensorReading> {
        vec![
            SensorReading::new(1_700_000_000, 10.0, 100.0, 40.0),
            SensorReading::new(1_700_000_060, 12.0, 101.0, 42.0),
        ]
    }

    fn batch_b() -> Vec<SensorReading> {
        vec![SensorReading::new(1_700_000_120, 15.0, 990.0, 55.0)]
    }

    #[test]
    fn test_tick_refreshes_snapshot_and_renders_selected_graph() {
        let fixture = Fixture::new(true);
        let mut coordinator = fixture.coordinator(vec![Ok(batch_a())], usize::MAX);

        let outcome = block_on(coordinator.tick());

        assert_eq!(outcome, TickOutcome::Refreshed { readings: 2 });
        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.series(Metric::Temperature), &[10.0, 12.0]);
        assert_eq!(snapshot.series(Metric::Pressure), &[100.0, 101.0]);
        assert_eq!(snapshot.series(Metric::Humidity), &[40.0, 42.0]);

        assert_eq!(
            fixture.calls(),
            vec![
                DisplayCall::Wifi(true),
                DisplayCall::Status("14/11/23 02:13 PM".to_string()),
                DisplayCall::Sync(true),
                DisplayCall::Graph(Metric::Temperature, vec![10.0, 12.0]),
                DisplayCall::Sync(false),
            ]
        );
        assert_eq!(fixture.graphs()[0].0.index(), 0);
    }

    #[test]
    fn test_empty_fetch_keeps_snapshot() {
        let fixture = Fixture::new(true);
        let mut coordinator =
            fixture.coordinator(vec![Ok(batch_a()), Ok(Vec::new())], usize::MAX);
        block_on(coordinator.tick());
        let before = coordinator.snapshot();
        fixture.clear_calls();

        let outcome = block_on(coordinator.tick());

        assert_eq!(outcome, TickOutcome::NoNewData);
        assert_eq!(coordinator.snapshot(), before);
        assert!(fixture.graphs().is_empty());
        assert_eq!(fixture.calls().last(), Some(&DisplayCall::Sync(false)));
    }

    #[test]
    fn test_failed_fetch_keeps_snapshot_and_clears_sync() {
        let fixture = Fixture::new(true);
        let mut coordinator = fixture.coordinator(
            vec![
                Ok(batch_a()),
                Err(FetchError::Transport("timeout")),
                Ok(batch_b()),
            ],
            usize::MAX,
        );
        block_on(coordinator.tick());
        let before = coordinator.snapshot();
        fixture.clear_calls();

        assert_eq!(block_on(coordinator.tick()), TickOutcome::FetchFailed);
        assert_eq!(coordinator.snapshot(), before);
        assert!(fixture.graphs().is_empty());
        assert_eq!(fixture.calls().last(), Some(&DisplayCall::Sync(false)));
        fixture.clear_calls();

        // The following tick runs every step again
        assert_eq!(
            block_on(coordinator.tick()),
            TickOutcome::Refreshed { readings: 1 }
        );
        assert_eq!(
            fixture.calls(),
            vec![
                DisplayCall::Wifi(true),
                DisplayCall::Status("14/11/23 02:13 PM".to_string()),
                DisplayCall::Sync(true),
                DisplayCall::Graph(Metric::Temperature, vec![15.0]),
                DisplayCall::Sync(false),
            ]
        );
    }

    #[test]
    fn test_initialize_shows_splash_then_data_screen() {
        let fixture = Fixture::new(true);
        let mut coordinator = fixture.coordinator(Vec::new(), usize::MAX);

        block_on(coordinator.initialize(&fixture.buttons)).unwrap();

        assert_eq!(
            fixture.calls(),
            vec![DisplayCall::Splash, DisplayCall::DataScreen]
        );
        assert_eq!(*fixture.delays.borrow(), vec![3_000]);
        assert_eq!(fixture.monitor.calls.get(), 0);
    }

    #[test]
    fn test_initialize_fails_without_subscriber_slot() {
        let fixture = Fixture::new(true);
        let _taken = fixture.buttons.subscriber().unwrap();
        let mut coordinator = fixture.coordinator(Vec::new(), usize::MAX);

        let result = block_on(coordinator.initialize(&fixture.buttons));

        assert_eq!(result, Err(CoordinatorError::ButtonSubscription));
        assert!(fixture.calls().is_empty());
    }

    #[test]
    fn test_run_requires_initialize() {
        let fixture = Fixture::new(true);
        let mut coordinator = fixture.coordinator(Vec::new(), usize::MAX);

        let result = block_on(coordinator.run());

        assert_eq!(result.err(), Some(CoordinatorError::NotInitialized));
        assert_eq!(fixture.monitor.calls.get(), 0);
    }

    #[test]
    fn test_button_handlers_cycle_and_render_current_snapshot() {
        let fixture = Fixture::new(true);
        let mut coordinator = fixture.coordinator(vec![Ok(batch_a())], usize::MAX);
        block_on(coordinator.tick());
        fixture.clear_calls();

        let shown: Vec<Metric> = (0..3)
            .map(|_| block_on(coordinator.handle_button(ButtonEvent::Next)))
            .collect();
        assert_eq!(
            shown,
            vec![Metric::Pressure, Metric::Humidity, Metric::Temperature]
        );

        assert_eq!(
            block_on(coordinator.handle_button(ButtonEvent::Previous)),
            Metric::Humidity
        );
        assert_eq!(coordinator.selected_metric(), Metric::Humidity);

        assert_eq!(
            fixture.graphs(),
            vec![
                (Metric::Pressure, vec![100.0, 101.0]),
                (Metric::Humidity, vec![40.0, 42.0]),
                (Metric::Temperature, vec![10.0, 12.0]),
                (Metric::Humidity, vec![40.0, 42.0]),
            ]
        );
        // Buttons never trigger a fetch
        assert_eq!(fixture.monitor.calls.get(), 1);
    }

    #[test]
    fn test_offline_run_never_syncs_or_fetches() {
        let fixture = Fixture::new(false);
        // Splash delay plus three poll delays
        let mut coordinator = fixture.coordinator(vec![Ok(batch_a())], 4);
        block_on(coordinator.initialize(&fixture.buttons)).unwrap();

        let result = block_on(select(coordinator.run(), async {
            while fixture.delays.borrow().len() < 4 {
                yield_now().await;
            }
        }));
        assert!(matches!(result, Either::Second(())));

        let calls = fixture.calls();
        assert!(!calls.contains(&DisplayCall::Sync(true)));
        assert_eq!(
            calls.iter().filter(|c| **c == DisplayCall::Wifi(false)).count(),
            3
        );
        assert!(fixture.graphs().is_empty());
        assert_eq!(fixture.monitor.calls.get(), 0);
        assert!(coordinator.snapshot().is_empty());
        assert_eq!(fixture.delays.borrow()[1..], [60_000, 60_000, 60_000]);
    }

    #[test]
    fn test_run_survives_fetch_failure() {
        let fixture = Fixture::new(true);
        let mut coordinator = fixture.coordinator(
            vec![Err(FetchError::Status { status: 503 }), Ok(batch_a())],
            3,
        );
        block_on(coordinator.initialize(&fixture.buttons)).unwrap();

        let result = block_on(select(coordinator.run(), async {
            while fixture.delays.borrow().len() < 3 {
                yield_now().await;
            }
        }));
        assert!(matches!(result, Either::Second(())));

        assert_eq!(fixture.monitor.calls.get(), 2);
        assert_eq!(
            fixture.graphs(),
            vec![(Metric::Temperature, vec![10.0, 12.0])]
        );
        assert_eq!(
            coordinator.snapshot().series(Metric::Humidity),
            &[40.0, 42.0]
        );
    }

    #[test]
    fn test_button_renders_old_snapshot_while_fetch_in_flight() {
        let fixture = Fixture::new(true);
        let mut coordinator =
            fixture.coordinator(vec![Ok(batch_a()), Ok(batch_b())], usize::MAX);
        block_on(coordinator.initialize(&fixture.buttons)).unwrap();
        block_on(coordinator.tick());
        fixture.clear_calls();

        // The next fetch (the first one inside run) stays open until released
        fixture.monitor.gated_call.set(Some(2));
        let publisher = fixture.buttons.publisher().unwrap();

        let result = block_on(select(coordinator.run(), async {
            while !fixture.monitor.in_flight.get() {
                yield_now().await;
            }

            publisher.publish_immediate(ButtonEvent::Next);
            while fixture.graphs().is_empty() {
                yield_now().await;
            }

            // Rendered from the pre-fetch snapshot while the fetch is still open
            assert!(fixture.monitor.in_flight.get());
            assert_eq!(
                fixture.graphs(),
                vec![(Metric::Pressure, vec![100.0, 101.0])]
            );

            fixture.monitor.gate.signal(());
            while fixture.graphs().len() < 2 {
                yield_now().await;
            }
        }));
        assert!(matches!(result, Either::Second(())));

        assert_eq!(
            fixture.graphs(),
            vec![
                (Metric::Pressure, vec![100.0, 101.0]),
                (Metric::Pressure, vec![990.0]),
            ]
        );
        assert_eq!(coordinator.selected_metric(), Metric::Pressure);
        assert_eq!(coordinator.snapshot().series(Metric::Temperature), &[15.0]);
    }

    #[test]
    fn test_button_loop_recovers_after_overflow() {
        let fixture = Fixture::new(true);
        let mut coordinator = fixture.coordinator(vec![Ok(batch_a())], usize::MAX);
        block_on(coordinator.initialize(&fixture.buttons)).unwrap();
        block_on(coordinator.tick());
        fixture.connected.set(false);
        fixture.clear_calls();

        // Two more presses than the channel holds: the oldest two are lost
        let publisher = fixture.buttons.immediate_publisher();
        for event in [ButtonEvent::Previous, ButtonEvent::Previous]
            .into_iter()
            .chain([ButtonEvent::Next; BUTTON_CHANNEL_CAPACITY])
        {
            publisher.publish_immediate(event);
        }

        let result = block_on(select(coordinator.run(), async {
            while fixture.graphs().len() < BUTTON_CHANNEL_CAPACITY {
                yield_now().await;
            }

            publisher.publish_immediate(ButtonEvent::Previous);
            while fixture.graphs().len() < BUTTON_CHANNEL_CAPACITY + 1 {
                yield_now().await;
            }
        }));
        assert!(matches!(result, Either::Second(())));

        let shown: Vec<Metric> = fixture.graphs().into_iter().map(|(m, _)| m).collect();
        assert_eq!(
            shown,
            vec![
                Metric::Pressure,
                Metric::Humidity,
                Metric::Temperature,
                Metric::Pressure,
                Metric::Temperature,
            ]
        );
        assert_eq!(coordinator.selected_metric(), Metric::Temperature);
        assert_eq!(fixture.graphs()[4].1, vec![10.0, 12.0]);
    }
}
