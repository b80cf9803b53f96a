//! Screen rendering
//!
//! [`TelemetryScreen`] implements [`DisplayService`](crate::DisplayService)
//! on any `Rgb565` draw target. The layout is fixed for the 320x240 panel:
//!
//! ```text
//! +--------------------------------------------+
//! | 14/11/23 02:13 PM            SYNC  (o) WiFi |  header
//! | Temperature                        21.4 C   |  title
//! |  max +                                      |
//! |      |      /\__/\                          |  graph
//! |  min +_____/      \___                      |
//! | < Prev           o * o              Next >  |  footer
//! +--------------------------------------------+
//! ```

mod graph;
mod screen;

pub use graph::{DataBounds, Viewport, draw_series};
pub use screen::TelemetryScreen;

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

pub const DISPLAY_WIDTH_PX: u32 = 320;
pub const DISPLAY_HEIGHT_PX: u32 = 240;

pub const HEADER_HEIGHT_PX: u32 = 24;
pub const TITLE_HEIGHT_PX: u32 = 28;
pub const FOOTER_HEIGHT_PX: u32 = 28;
pub const GRAPH_HEIGHT_PX: u32 =
    DISPLAY_HEIGHT_PX - HEADER_HEIGHT_PX - TITLE_HEIGHT_PX - FOOTER_HEIGHT_PX;

/// Left gutter of the graph reserved for min/max labels
pub const GRAPH_LABEL_GUTTER_PX: u32 = 44;
pub const EDGE_PADDING_PX: i32 = 8;

pub const SMALL_FONT: &MonoFont<'static> = &FONT_6X10;
pub const LARGE_FONT: &MonoFont<'static> = &FONT_10X20;

// RGB565 takes 5/6/5 bits, so 8-bit channels are shifted down

pub const COLOR_BACKGROUND: Rgb565 = Rgb565::new(18 >> 3, 23 >> 2, 24 >> 3);
pub const COLOR_SURFACE: Rgb565 = Rgb565::new(26 >> 3, 32 >> 2, 33 >> 3);
pub const COLOR_STROKE: Rgb565 = Rgb565::new(43 >> 3, 55 >> 2, 57 >> 3);
pub const COLOR_TEXT: Rgb565 = Rgb565::new(31, 63, 31);
pub const COLOR_TEXT_MUTED: Rgb565 = Rgb565::new(16, 32, 16);
pub const COLOR_ONLINE: Rgb565 = Rgb565::new(95 >> 3, 185 >> 2, 141 >> 3);
pub const COLOR_OFFLINE: Rgb565 = Rgb565::new(190 >> 3, 95 >> 2, 95 >> 3);
pub const COLOR_SYNC: Rgb565 = Rgb565::new(200 >> 3, 145 >> 2, 85 >> 3);

pub const COLOR_TEMPERATURE: Rgb565 = Rgb565::new(230 >> 3, 120 >> 2, 90 >> 3);
pub const COLOR_PRESSURE: Rgb565 = Rgb565::new(110 >> 3, 160 >> 2, 230 >> 3);
pub const COLOR_HUMIDITY: Rgb565 = Rgb565::new(95 >> 3, 200 >> 2, 200 >> 3);

pub const fn header_area() -> Rectangle {
    Rectangle::new(Point::zero(), Size::new(DISPLAY_WIDTH_PX, HEADER_HEIGHT_PX))
}

pub const fn title_area() -> Rectangle {
    Rectangle::new(
        Point::new(0, HEADER_HEIGHT_PX as i32),
        Size::new(DISPLAY_WIDTH_PX, TITLE_HEIGHT_PX),
    )
}

pub const fn graph_area() -> Rectangle {
    Rectangle::new(
        Point::new(0, (HEADER_HEIGHT_PX + TITLE_HEIGHT_PX) as i32),
        Size::new(DISPLAY_WIDTH_PX, GRAPH_HEIGHT_PX),
    )
}

pub const fn footer_area() -> Rectangle {
    Rectangle::new(
        Point::new(0, (DISPLAY_HEIGHT_PX - FOOTER_HEIGHT_PX) as i32),
        Size::new(DISPLAY_WIDTH_PX, FOOTER_HEIGHT_PX),
    )
}
