//! The drawing seam between the compositor and whatever owns real pixels.

use crate::geom::{Color, Point, Rect, Viewport};
use crate::raster::{RasterImage, RasterSlot};

/// Line style; an empty `dash` draws a solid line. Dash lengths are in
/// pixels and alternate on/off like `CanvasRenderingContext2D.setLineDash`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    pub dash: &'static [f64],
}

impl Stroke {
    pub const fn solid(color: Color, width: f64) -> Self {
        Self { color, width, dash: &[] }
    }

    pub const fn dashed(color: Color, width: f64, dash: &'static [f64]) -> Self {
        Self { color, width, dash }
    }
}

/// The subset of the Canvas 2D API the compositor draws with. All
/// coordinates are logical pixels of the current viewport.
pub trait Surface {
    /// Match the backing store to a new logical size.
    fn resize(&mut self, viewport: Viewport);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Blit a cached raster scaled into `dest`. `slot` and the image
    /// generation identify the upload so implementations may cache it.
    fn draw_raster(&mut self, slot: RasterSlot, image: &RasterImage, dest: Rect);

    /// Stroke an open polyline.
    fn stroke_path(&mut self, points: &[Point], stroke: &Stroke);

    fn stroke_rect(&mut self, rect: Rect, stroke: &Stroke);

    /// Fill `text` horizontally centred on `at.x` with its baseline at `at.y`.
    fn fill_text(&mut self, text: &str, at: Point, size: f64, color: Color);
}
