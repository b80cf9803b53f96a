//! Hardware-independent core library for nimbus
//!
//! This crate contains all platform-agnostic logic for the nimbus cloud
//! telemetry display: the bounded metric buffers and their snapshot, the
//! button-driven graph selector, the service traits the coordinator talks to,
//! the coordinator itself and an embedded-graphics renderer for the screen.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets (ESP32-S3) and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod buttons;
pub mod config;
pub mod coordinator;
pub mod framebuffer;
pub mod selector;
pub mod services;
pub mod status;
pub mod telemetry;
pub mod ui;

pub use buttons::{ButtonChannel, ButtonEvent, ButtonPublisher, ButtonSubscriber};
pub use config::{CoordinatorConfig, DeviceConfig};
pub use coordinator::{Coordinator, CoordinatorError, TickOutcome};
pub use selector::{GraphSelector, Metric};
pub use services::{DataService, DisplayService, FetchError, NetworkStatus, WallClock};
pub use telemetry::{MetricBuffer, SensorReading, SharedSnapshot, TelemetrySnapshot};
