//! Line graph of one metric series
//!
//! Values are spread evenly across the plot width (oldest on the left) and
//! scaled vertically to the finite min/max of the series.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle, Rectangle};

/// Smallest vertical span, so a flat series still gets a usable scale
pub const MIN_DATA_RANGE: f32 = 1.0;

/// Fraction of the span added above and below the data
pub const DEFAULT_MARGIN_FACTOR: f32 = 0.1;

const SERIES_LINE_WIDTH_PX: u32 = 2;
const SINGLE_POINT_DIAMETER_PX: u32 = 5;

/// Vertical data range of the plot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataBounds {
    pub min: f32,
    pub max: f32,
}

impl DataBounds {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Bounds of the finite values in `values` plus a margin
    ///
    /// Returns `None` if there is no finite value.
    pub fn from_values(values: &[f32], margin_factor: f32) -> Option<Self> {
        let (min, max) = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f32, f32)>, v| match acc {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            })?;

        let span = max - min;
        let padded = span.max(MIN_DATA_RANGE);
        let extra = (padded - span) / 2.0 + padded * margin_factor;

        Some(Self {
            min: min - extra,
            max: max + extra,
        })
    }

    pub fn range(&self) -> f32 {
        self.max - self.min
    }
}

/// Maps sample index and value to a pixel inside the plot area
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    bounds: DataBounds,
    area: Rectangle,
}

impl Viewport {
    pub const fn new(bounds: DataBounds, area: Rectangle) -> Self {
        Self { bounds, area }
    }

    pub fn bounds(&self) -> &DataBounds {
        &self.bounds
    }

    pub fn area(&self) -> Rectangle {
        self.area
    }

    /// Screen position of sample `index` out of `count`
    ///
    /// Returns `None` for non-finite values. Values outside the bounds are
    /// clamped to the plot edge.
    pub fn point_at(&self, index: usize, count: usize, value: f32) -> Option<Point> {
        if !value.is_finite() || count == 0 || self.area.is_zero_sized() {
            return None;
        }

        let width = self.area.size.width.saturating_sub(1) as f32;
        let height = self.area.size.height.saturating_sub(1) as f32;

        let x_norm = if count == 1 {
            0.5
        } else {
            index as f32 / (count - 1) as f32
        };
        let y_norm = ((value - self.bounds.min) / self.bounds.range()).clamp(0.0, 1.0);
        if !y_norm.is_finite() {
            return None;
        }

        // Screen y grows downward
        let x = self.area.top_left.x + (x_norm * width + 0.5) as i32;
        let y = self.area.top_left.y + ((1.0 - y_norm) * height + 0.5) as i32;
        Some(Point::new(x, y))
    }
}

/// Draw `values` as a polyline inside `viewport`
///
/// Non-finite values break the line. A series with a single finite value is
/// drawn as a dot.
pub fn draw_series<D>(
    display: &mut D,
    viewport: &Viewport,
    values: &[f32],
    color: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let count = values.len();
    let line_style = PrimitiveStyle::with_stroke(color, SERIES_LINE_WIDTH_PX);

    let mut previous: Option<Point> = None;
    let mut drawn_segments = 0usize;
    let mut last_point = None;

    for (index, value) in values.iter().enumerate() {
        let Some(point) = viewport.point_at(index, count, *value) else {
            previous = None;
            continue;
        };

        if let Some(prev) = previous {
            Line::new(prev, point).into_styled(line_style).draw(display)?;
            drawn_segments += 1;
        }
        previous = Some(point);
        last_point = Some(point);
    }

    if drawn_segments == 0
        && let Some(point) = last_point
    {
        Circle::with_center(point, SINGLE_POINT_DIAMETER_PX)
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(display)?;
    }

    Ok(())
}
