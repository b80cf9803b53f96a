use core::fmt::{Debug, Write};

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use heapless::String;
use log::error;

use super::graph::{DEFAULT_MARGIN_FACTOR, DataBounds, Viewport, draw_series};
use super::{
    COLOR_BACKGROUND, COLOR_HUMIDITY, COLOR_OFFLINE, COLOR_ONLINE, COLOR_PRESSURE, COLOR_STROKE,
    COLOR_SURFACE, COLOR_SYNC, COLOR_TEMPERATURE, COLOR_TEXT, COLOR_TEXT_MUTED, EDGE_PADDING_PX,
    GRAPH_LABEL_GUTTER_PX, LARGE_FONT, SMALL_FONT, footer_area, graph_area, header_area,
    title_area,
};
use crate::selector::Metric;
use crate::services::DisplayService;
use crate::status::{StatusText, UNKNOWN_TIME_TEXT};
use crate::telemetry::MetricBuffer;

const LABEL_CAPACITY: usize = 24;
const WIFI_BADGE_CENTER_X: i32 = 272;
const SYNC_BADGE_RIGHT_X: i32 = 256;
const BADGE_DOT_DIAMETER_PX: u32 = 8;
const PAGE_DOT_DIAMETER_PX: u32 = 8;
const PAGE_DOT_SPACING_PX: i32 = 16;

type Label = String<LABEL_CAPACITY>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Blank,
    Splash,
    Data,
}

/// The telemetry display drawn onto an `Rgb565` target
///
/// Keeps the last value of every on-screen element so each update can
/// redraw just its own region. Updates received while the splash screen
/// is up are remembered and drawn once the data screen is shown.
pub struct TelemetryScreen<T> {
    target: T,
    page: Page,
    status: StatusText,
    connected: bool,
    syncing: bool,
    metric: Metric,
    latest: Option<f32>,
    bounds: Option<DataBounds>,
    series: MetricBuffer,
}

impl<T> TelemetryScreen<T>
where
    T: DrawTarget<Color = Rgb565>,
    T::Error: Debug,
{
    pub fn new(target: T) -> Self {
        let mut status = StatusText::new();
        let _ = status.push_str(UNKNOWN_TIME_TEXT);

        Self {
            target,
            page: Page::Blank,
            status,
            connected: false,
            syncing: false,
            metric: Metric::default(),
            latest: None,
            bounds: None,
            series: MetricBuffer::new(),
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_inner(self) -> T {
        self.target
    }

    /// Metric shown by the last graph update
    pub fn metric(&self) -> Metric {
        self.metric
    }

    fn on_data_page(&self) -> bool {
        self.page == Page::Data
    }

    fn report(result: Result<(), T::Error>, what: &str) {
        if let Err(e) = result {
            error!("Failed to draw {}: {:?}", what, e);
        }
    }

    fn draw_splash(&mut self) -> Result<(), T::Error> {
        self.target.clear(COLOR_BACKGROUND)?;

        let center = self.target.bounding_box().center();
        let centered = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build();

        Text::with_text_style(
            "Nimbus",
            center - Point::new(0, 12),
            MonoTextStyle::new(LARGE_FONT, COLOR_TEXT),
            centered,
        )
        .draw(&mut self.target)?;
        Text::with_text_style(
            "cloud telemetry",
            center + Point::new(0, 14),
            MonoTextStyle::new(SMALL_FONT, COLOR_TEXT_MUTED),
            centered,
        )
        .draw(&mut self.target)?;
        Ok(())
    }

    fn draw_header(&mut self) -> Result<(), T::Error> {
        let area = header_area();
        self.target.fill_solid(&area, COLOR_SURFACE)?;

        let middle = area.center().y;
        Text::with_baseline(
            &self.status,
            Point::new(EDGE_PADDING_PX, middle),
            MonoTextStyle::new(SMALL_FONT, COLOR_TEXT),
            Baseline::Middle,
        )
        .draw(&mut self.target)?;

        if self.syncing {
            Text::with_text_style(
                "SYNC",
                Point::new(SYNC_BADGE_RIGHT_X, middle),
                MonoTextStyle::new(SMALL_FONT, COLOR_SYNC),
                TextStyleBuilder::new()
                    .alignment(Alignment::Right)
                    .baseline(Baseline::Middle)
                    .build(),
            )
            .draw(&mut self.target)?;
        }

        let wifi_color = if self.connected {
            COLOR_ONLINE
        } else {
            COLOR_OFFLINE
        };
        Circle::with_center(Point::new(WIFI_BADGE_CENTER_X, middle), BADGE_DOT_DIAMETER_PX)
            .into_styled(PrimitiveStyle::with_fill(wifi_color))
            .draw(&mut self.target)?;
        Text::with_baseline(
            "WiFi",
            Point::new(WIFI_BADGE_CENTER_X + 8, middle),
            MonoTextStyle::new(SMALL_FONT, wifi_color),
            Baseline::Middle,
        )
        .draw(&mut self.target)?;

        Ok(())
    }

    fn draw_title(&mut self) -> Result<(), T::Error> {
        let area = title_area();
        self.target.fill_solid(&area, COLOR_BACKGROUND)?;

        let middle = area.center().y;
        Text::with_baseline(
            self.metric.label(),
            Point::new(EDGE_PADDING_PX, middle),
            MonoTextStyle::new(LARGE_FONT, metric_color(self.metric)),
            Baseline::Middle,
        )
        .draw(&mut self.target)?;

        let mut value = Label::new();
        match self.latest {
            Some(latest) => {
                let _ = write!(value, "{:.1} {}", latest, self.metric.unit());
            }
            None => {
                let _ = write!(value, "-- {}", self.metric.unit());
            }
        }
        Text::with_text_style(
            &value,
            Point::new(area.size.width as i32 - EDGE_PADDING_PX, middle),
            MonoTextStyle::new(LARGE_FONT, COLOR_TEXT),
            TextStyleBuilder::new()
                .alignment(Alignment::Right)
                .baseline(Baseline::Middle)
                .build(),
        )
        .draw(&mut self.target)?;
        Ok(())
    }

    fn draw_graph(&mut self, values: &[f32]) -> Result<(), T::Error> {
        let area = graph_area();
        self.target.fill_solid(&area, COLOR_BACKGROUND)?;

        let Some(bounds) = self.bounds else {
            Text::with_text_style(
                "No data",
                area.center(),
                MonoTextStyle::new(SMALL_FONT, COLOR_TEXT_MUTED),
                TextStyleBuilder::new()
                    .alignment(Alignment::Center)
                    .baseline(Baseline::Middle)
                    .build(),
            )
            .draw(&mut self.target)?;
            return Ok(());
        };

        let plot = plot_area(area);
        let axis_style = PrimitiveStyle::with_stroke(COLOR_STROKE, 1);
        plot.into_styled(axis_style).draw(&mut self.target)?;

        let label_style = MonoTextStyle::new(SMALL_FONT, COLOR_TEXT_MUTED);
        let right_aligned = TextStyleBuilder::new()
            .alignment(Alignment::Right)
            .baseline(Baseline::Middle)
            .build();
        let label_x = plot.top_left.x - 4;
        for (value, y) in [
            (bounds.max, plot.top_left.y),
            (bounds.min, plot.top_left.y + plot.size.height as i32 - 1),
        ] {
            let mut text = Label::new();
            let _ = write!(text, "{:.1}", value);
            Text::with_text_style(&text, Point::new(label_x, y), label_style, right_aligned)
                .draw(&mut self.target)?;
        }

        let viewport = Viewport::new(bounds, plot.offset(-2));
        draw_series(&mut self.target, &viewport, values, metric_color(self.metric))
    }

    fn draw_footer(&mut self) -> Result<(), T::Error> {
        let area = footer_area();
        self.target.fill_solid(&area, COLOR_SURFACE)?;

        let middle = area.center().y;
        let hint_style = MonoTextStyle::new(SMALL_FONT, COLOR_TEXT_MUTED);
        Text::with_baseline(
            "< Prev",
            Point::new(EDGE_PADDING_PX, middle),
            hint_style,
            Baseline::Middle,
        )
        .draw(&mut self.target)?;
        Text::with_text_style(
            "Next >",
            Point::new(area.size.width as i32 - EDGE_PADDING_PX, middle),
            hint_style,
            TextStyleBuilder::new()
                .alignment(Alignment::Right)
                .baseline(Baseline::Middle)
                .build(),
        )
        .draw(&mut self.target)?;

        let first_x = area.center().x - PAGE_DOT_SPACING_PX * (Metric::ALL.len() as i32 - 1) / 2;
        for metric in Metric::ALL {
            let center = Point::new(first_x + PAGE_DOT_SPACING_PX * metric.index() as i32, middle);
            let dot = Circle::with_center(center, PAGE_DOT_DIAMETER_PX);
            if metric == self.metric {
                dot.into_styled(PrimitiveStyle::with_fill(metric_color(metric)))
                    .draw(&mut self.target)?;
            } else {
                dot.into_styled(PrimitiveStyle::with_stroke(COLOR_STROKE, 1))
                    .draw(&mut self.target)?;
            }
        }
        Ok(())
    }

    fn draw_data_page(&mut self, values: &[f32]) -> Result<(), T::Error> {
        self.target.clear(COLOR_BACKGROUND)?;
        self.draw_header()?;
        self.draw_title()?;
        self.draw_graph(values)?;
        self.draw_footer()
    }
}

impl<T> DisplayService for TelemetryScreen<T>
where
    T: DrawTarget<Color = Rgb565>,
    T::Error: Debug,
{
    fn show_splash_screen(&mut self) {
        self.page = Page::Splash;
        let result = self.draw_splash();
        Self::report(result, "splash screen");
    }

    fn show_data_screen(&mut self) {
        self.page = Page::Data;
        let series = self.series.clone();
        let result = self.draw_data_page(series.as_slice());
        Self::report(result, "data screen");
    }

    fn update_status(&mut self, text: &str) {
        self.status.clear();
        for c in text.chars() {
            if self.status.push(c).is_err() {
                break;
            }
        }
        if self.on_data_page() {
            let result = self.draw_header();
            Self::report(result, "status line");
        }
    }

    fn update_wifi_status(&mut self, connected: bool) {
        if self.connected == connected && self.on_data_page() {
            return;
        }
        self.connected = connected;
        if self.on_data_page() {
            let result = self.draw_header();
            Self::report(result, "wifi status");
        }
    }

    fn update_sync_status(&mut self, syncing: bool) {
        if self.syncing == syncing && self.on_data_page() {
            return;
        }
        self.syncing = syncing;
        if self.on_data_page() {
            let result = self.draw_header();
            Self::report(result, "sync status");
        }
    }

    fn update_graph(&mut self, metric: Metric, values: &[f32]) {
        let metric_changed = self.metric != metric;
        self.metric = metric;
        self.latest = values.iter().rev().copied().find(|v| v.is_finite());
        self.bounds = DataBounds::from_values(values, DEFAULT_MARGIN_FACTOR);
        self.series.replace_all(values.iter().copied());

        if !self.on_data_page() {
            return;
        }

        let mut result = self.draw_title().and_then(|()| self.draw_graph(values));
        if metric_changed {
            result = result.and_then(|()| self.draw_footer());
        }
        Self::report(result, "graph");
    }
}

/// Line color of a metric's graph
pub const fn metric_color(metric: Metric) -> Rgb565 {
    match metric {
        Metric::Temperature => COLOR_TEMPERATURE,
        Metric::Pressure => COLOR_PRESSURE,
        Metric::Humidity => COLOR_HUMIDITY,
    }
}

fn plot_area(graph: Rectangle) -> Rectangle {
    let top_left = graph.top_left + Point::new(GRAPH_LABEL_GUTTER_PX as i32, EDGE_PADDING_PX);
    let size = Size::new(
        graph.size.width - GRAPH_LABEL_GUTTER_PX - EDGE_PADDING_PX as u32,
        graph.size.height - 2 * EDGE_PADDING_PX as u32,
    );
    Rectangle::new(top_left, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::FrameBuffer;

    fn screen() -> TelemetryScreen<FrameBuffer> {
        TelemetryScreen::new(FrameBuffer::default())
    }

    fn count_color(fb: &FrameBuffer, area: Rectangle, color: Rgb565) -> usize {
        area.points()
            .filter(|p| fb.pixel(*p) == Some(color))
            .count()
    }

    #[test]
    fn test_graph_draws_series_in_metric_color() {
        let mut screen = screen();
        screen.show_data_screen();

        screen.update_graph(Metric::Pressure, &[1000.0, 1002.5, 1001.0]);

        assert_eq!(screen.metric(), Metric::Pressure);
        let fb = screen.target();
        assert!(count_color(fb, plot_area(graph_area()), COLOR_PRESSURE) > 0);
        assert_eq!(count_color(fb, plot_area(graph_area()), COLOR_TEMPERATURE), 0);
    }

    #[test]
    fn test_empty_series_clears_graph() {
        let mut screen = screen();
        screen.show_data_screen();
        screen.update_graph(Metric::Temperature, &[20.0, 21.0]);

        screen.update_graph(Metric::Temperature, &[]);

        let fb = screen.target();
        assert_eq!(count_color(fb, graph_area(), COLOR_TEMPERATURE), 0);
        assert!(count_color(fb, graph_area(), COLOR_TEXT_MUTED) > 0);
    }

    #[test]
    fn test_status_update_redraws_header_only() {
        let mut screen = screen();
        screen.show_data_screen();
        let mut sink = FrameBuffer::default();
        screen.target_mut().flush(&mut sink).unwrap();

        screen.update_status("14/11/23 02:13 PM");

        let dirty = screen.target().dirty_area().unwrap();
        assert!(header_area().contains(dirty.top_left));
        assert!(header_area().contains(dirty.bottom_right().unwrap()));
    }

    #[test]
    fn test_unchanged_badges_do_not_redraw() {
        let mut screen = screen();
        screen.show_data_screen();
        screen.update_wifi_status(true);
        let mut sink = FrameBuffer::default();
        screen.target_mut().flush(&mut sink).unwrap();

        screen.update_wifi_status(true);
        screen.update_sync_status(false);

        assert_eq!(screen.target().dirty_area(), None);
    }

    #[test]
    fn test_updates_during_splash_are_deferred() {
        let mut screen = screen();
        screen.show_splash_screen();
        let mut sink = FrameBuffer::default();
        screen.target_mut().flush(&mut sink).unwrap();

        screen.update_wifi_status(true);
        screen.update_status("01/01/24 12:00 AM");
        assert_eq!(screen.target().dirty_area(), None);

        screen.show_data_screen();
        let header = header_area();
        assert!(count_color(screen.target(), header, COLOR_ONLINE) > 0);
        assert_eq!(count_color(screen.target(), header, COLOR_OFFLINE), 0);
    }

    #[test]
    fn test_graph_received_during_splash_is_drawn_with_data_screen() {
        let mut screen = screen();
        screen.show_splash_screen();
        let mut sink = FrameBuffer::default();
        screen.target_mut().flush(&mut sink).unwrap();

        screen.update_graph(Metric::Humidity, &[41.0, 44.5, 43.0]);
        assert_eq!(screen.target().dirty_area(), None);

        screen.show_data_screen();
        let fb = screen.target();
        assert!(count_color(fb, plot_area(graph_area()), COLOR_HUMIDITY) > 0);
        assert!(count_color(fb, title_area(), COLOR_HUMIDITY) > 0);
    }
}
