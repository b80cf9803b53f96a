//! Button event plumbing
//!
//! Each physical button is watched by its own task which publishes a
//! [`ButtonEvent`] into a [`ButtonChannel`]. The coordinator holds the single
//! subscriber and handles events strictly in order, so every
//! click-select-render sequence completes before the next one starts.

use embassy_sync::pubsub::{PubSubChannel, Publisher, Subscriber};

/// Channel capacity for button events
/// A few clicks of headroom while a render is in progress
pub const BUTTON_CHANNEL_CAPACITY: usize = 4;

/// Number of subscribers (just the coordinator)
pub const BUTTON_SUBSCRIBERS: usize = 1;

/// Number of publishers (one per physical button)
pub const BUTTON_PUBLISHERS: usize = 2;

/// A debounced click on one of the two navigation buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// Right/forward button: show the next metric
    Next,
    /// Left/back button: show the previous metric
    Previous,
}

pub type ButtonChannel<M> = PubSubChannel<
    M,
    ButtonEvent,
    BUTTON_CHANNEL_CAPACITY,
    BUTTON_SUBSCRIBERS,
    BUTTON_PUBLISHERS,
>;

pub type ButtonPublisher<'a, M> = Publisher<
    'a,
    M,
    ButtonEvent,
    BUTTON_CHANNEL_CAPACITY,
    BUTTON_SUBSCRIBERS,
    BUTTON_PUBLISHERS,
>;

pub type ButtonSubscriber<'a, M> = Subscriber<
    'a,
    M,
    ButtonEvent,
    BUTTON_CHANNEL_CAPACITY,
    BUTTON_SUBSCRIBERS,
    BUTTON_PUBLISHERS,
>;
