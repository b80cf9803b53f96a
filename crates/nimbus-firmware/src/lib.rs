//! ESP32-S3 firmware-specific modules for nimbus
//!
//! Everything here touches esp-hal peripherals or the embassy-net stack and
//! cannot compile on desktop targets: the Wi-Fi connection tasks, the HTTP
//! cloud client, the GPIO button watchers and the SPI panel flusher.

#![no_std]

extern crate alloc;

pub mod buttons;
pub mod clock;
pub mod cloud;
pub mod config;
pub mod network;
pub mod panel;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pubsub::PubSubChannel;
use nimbus_core::ButtonChannel;

/// Button events from the GPIO watchers to the coordinator
pub static BUTTONS: ButtonChannel<CriticalSectionRawMutex> = PubSubChannel::new();
