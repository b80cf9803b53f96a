//! In-RAM framebuffer with dirty-region tracking
//!
//! The screen renderer draws into this buffer rather than straight to the
//! SPI panel. Afterwards only the bounding box of pixels that actually
//! changed is pushed to the panel in one `fill_contiguous` call.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;

use crate::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX};

/// Inclusive corners of the changed area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DirtyRegion {
    top_left: Point,
    bottom_right: Point,
}

impl DirtyRegion {
    const fn at(point: Point) -> Self {
        Self {
            top_left: point,
            bottom_right: point,
        }
    }

    fn include(&mut self, point: Point) {
        self.top_left = self.top_left.component_min(point);
        self.bottom_right = self.bottom_right.component_max(point);
    }

    fn to_rectangle(self) -> Rectangle {
        Rectangle::with_corners(self.top_left, self.bottom_right)
    }
}

/// Heap-allocated `Rgb565` draw target
///
/// A 320x240 buffer takes 150 KiB, which lands in PSRAM on the device.
pub struct FrameBuffer {
    size: Size,
    pixels: Vec<Rgb565>,
    dirty: Option<DirtyRegion>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX))
    }
}

impl FrameBuffer {
    /// Allocate a black buffer of the given size
    pub fn new(size: Size) -> Self {
        Self {
            size,
            pixels: vec![Rgb565::BLACK; size.width as usize * size.height as usize],
            dirty: None,
        }
    }

    fn index(&self, point: Point) -> Option<usize> {
        let inside = point.x >= 0
            && point.y >= 0
            && (point.x as u32) < self.size.width
            && (point.y as u32) < self.size.height;
        inside.then(|| point.y as usize * self.size.width as usize + point.x as usize)
    }

    #[inline]
    fn set_pixel(&mut self, point: Point, color: Rgb565) {
        let Some(index) = self.index(point) else {
            return;
        };
        if self.pixels[index] == color {
            return;
        }

        self.pixels[index] = color;
        match &mut self.dirty {
            Some(region) => region.include(point),
            None => self.dirty = Some(DirtyRegion::at(point)),
        }
    }

    /// Color at `point`, `None` outside the buffer
    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        self.index(point).map(|index| self.pixels[index])
    }

    /// Bounding box of pixels changed since the last flush
    pub fn dirty_area(&self) -> Option<Rectangle> {
        self.dirty.map(DirtyRegion::to_rectangle)
    }

    /// Push the changed region to `display` and reset tracking
    ///
    /// No-op when nothing changed since the last flush.
    pub fn flush<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(region) = self.dirty.take() else {
            return Ok(());
        };
        let area = region.to_rectangle();

        debug!(
            "Flushing {}x{} region at ({}, {})",
            area.size.width, area.size.height, area.top_left.x, area.top_left.y
        );

        let stride = self.size.width as usize;
        let pixels = &self.pixels;
        let colors = area
            .points()
            .map(move |p| pixels[p.y as usize * stride + p.x as usize]);

        display.fill_contiguous(&area, colors)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point, color);
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // Points outside the buffer still consume a color
        for (point, color) in area.points().zip(colors) {
            self.set_pixel(point, color);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let visible = area.intersection(&self.bounding_box());
        for point in visible.points() {
            self.set_pixel(point, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_solid(&self.bounding_box(), color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    #[test]
    fn test_new_buffer_is_clean() {
        let fb = FrameBuffer::default();

        assert_eq!(fb.size(), Size::new(320, 240));
        assert_eq!(fb.dirty_area(), None);
        assert_eq!(fb.pixel(Point::new(0, 0)), Some(Rgb565::BLACK));
        assert_eq!(fb.pixel(Point::new(320, 0)), None);
    }

    #[test]
    fn test_dirty_area_covers_changed_pixels_only() {
        let mut fb = FrameBuffer::default();

        // Same color as the buffer: nothing changes
        fb.fill_solid(&Rectangle::new(Point::zero(), Size::new(10, 10)), Rgb565::BLACK)
            .unwrap();
        assert_eq!(fb.dirty_area(), None);

        Pixel(Point::new(5, 7), Rgb565::RED).draw(&mut fb).unwrap();
        Pixel(Point::new(12, 3), Rgb565::RED).draw(&mut fb).unwrap();

        assert_eq!(
            fb.dirty_area(),
            Some(Rectangle::with_corners(Point::new(5, 3), Point::new(12, 7)))
        );
    }

    #[test]
    fn test_fill_solid_is_clipped() {
        let mut fb = FrameBuffer::new(Size::new(8, 8));

        fb.fill_solid(&Rectangle::new(Point::new(-4, 6), Size::new(20, 20)), Rgb565::GREEN)
            .unwrap();

        assert_eq!(fb.pixel(Point::new(0, 6)), Some(Rgb565::GREEN));
        assert_eq!(fb.pixel(Point::new(7, 7)), Some(Rgb565::GREEN));
        assert_eq!(fb.pixel(Point::new(7, 5)), Some(Rgb565::BLACK));
        assert_eq!(
            fb.dirty_area(),
            Some(Rectangle::with_corners(Point::new(0, 6), Point::new(7, 7)))
        );
    }

    #[test]
    fn test_flush_sends_dirty_region_and_resets() {
        let mut fb = FrameBuffer::new(Size::new(8, 8));
        fb.fill_solid(&Rectangle::new(Point::new(2, 2), Size::new(2, 1)), Rgb565::BLUE)
            .unwrap();

        let mut display = MockDisplay::<Rgb565>::new();
        fb.flush(&mut display).unwrap();

        assert_eq!(display.get_pixel(Point::new(2, 2)), Some(Rgb565::BLUE));
        assert_eq!(display.get_pixel(Point::new(3, 2)), Some(Rgb565::BLUE));
        assert_eq!(display.get_pixel(Point::new(4, 2)), None);
        assert_eq!(fb.dirty_area(), None);

        // Second flush has nothing to send
        let mut untouched = MockDisplay::<Rgb565>::new();
        fb.flush(&mut untouched).unwrap();
        assert_eq!(untouched.affected_area(), Rectangle::zero());
    }
}
