//! Software RGBA surface. Mirrors a canvas closely enough for headless
//! rendering and for asserting on pixels in tests.

use crate::geom::{Color, Point, Rect, Viewport};
use crate::raster::{RasterImage, RasterSlot};
use crate::surface::{Stroke, Surface};

/// Distance between stroke samples, in pixels.
const STROKE_STEP: f64 = 0.5;

/// RGBA8 pixel grid with source-over blending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSurface {
    viewport: Viewport,
    pixels: Vec<u8>,
}

impl PixelSurface {
    pub fn new(viewport: Viewport) -> Self {
        let len = viewport.width as usize * viewport.height as usize * 4;
        Self { viewport, pixels: vec![0; len] }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Raw RGBA buffer, row-major, ready for `ImageData`.
    pub fn as_rgba(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x as usize, y as usize);
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.viewport.width as usize + x) * 4
    }

    /// Clip `[x0, x1) × [y0, y1)` to the grid.
    fn clip(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Option<(usize, usize, usize, usize)> {
        let (w, h) = (f64::from(self.viewport.width), f64::from(self.viewport.height));
        let (x0, y0) = (x0.max(0.0), y0.max(0.0));
        let (x1, y1) = (x1.min(w), y1.min(h));
        (x1 > x0 && y1 > y0).then(|| (x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }

    fn blend(&mut self, i: usize, rgb: [u8; 3], alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let a = alpha.min(1.0);
        let dst = &mut self.pixels[i..i + 4];
        for c in 0..3 {
            let mixed = f32::from(rgb[c]) * a + f32::from(dst[c]) * (1.0 - a);
            dst[c] = mixed.round() as u8;
        }
        let da = f32::from(dst[3]) / 255.0;
        dst[3] = ((a + da * (1.0 - a)) * 255.0).round() as u8;
    }

    /// Pixels covered by a square pen of half-width `half` centred on `p`.
    fn stamp(&self, p: Point, half: f64, covered: &mut Vec<usize>) {
        let (x0, y0) = ((p.x - half).floor(), (p.y - half).floor());
        let x1 = (p.x + half).ceil().max(x0 + 1.0);
        let y1 = (p.y + half).ceil().max(y0 + 1.0);
        if let Some((x0, y0, x1, y1)) = self.clip(x0, y0, x1, y1) {
            for y in y0..y1 {
                for x in x0..x1 {
                    covered.push(self.offset(x, y));
                }
            }
        }
    }
}

/// Position inside a dash pattern, carried across path segments.
struct DashCursor<'a> {
    pattern: &'a [f64],
    index: usize,
    remaining: f64,
}

impl<'a> DashCursor<'a> {
    fn new(pattern: &'a [f64]) -> Self {
        let remaining = pattern.first().copied().unwrap_or(f64::INFINITY);
        Self { pattern, index: 0, remaining }
    }

    fn is_on(&self) -> bool {
        self.pattern.is_empty() || self.index % 2 == 0
    }

    fn advance(&mut self, mut distance: f64) {
        if self.pattern.is_empty() || self.pattern.iter().all(|&d| d <= 0.0) {
            return;
        }
        while distance > 0.0 {
            if distance < self.remaining {
                self.remaining -= distance;
                return;
            }
            distance -= self.remaining;
            // odd-length patterns repeat twice per cycle, as on a canvas
            let cycle = if self.pattern.len() % 2 == 1 { self.pattern.len() * 2 } else { self.pattern.len() };
            self.index = (self.index + 1) % cycle;
            self.remaining = self.pattern[self.index % self.pattern.len()];
        }
    }
}

impl Surface for PixelSurface {
    fn resize(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            *self = PixelSurface::new(viewport);
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some((x0, y0, x1, y1)) =
            self.clip(rect.x.round(), rect.y.round(), (rect.x + rect.w).round(), (rect.y + rect.h).round())
        else {
            return;
        };
        let rgb = [color.r, color.g, color.b];
        for y in y0..y1 {
            for x in x0..x1 {
                let i = self.offset(x, y);
                self.blend(i, rgb, color.a);
            }
        }
    }

    fn draw_raster(&mut self, _slot: RasterSlot, image: &RasterImage, dest: Rect) {
        if image.width == 0 || image.height == 0 || dest.w <= 0.0 || dest.h <= 0.0 {
            return;
        }
        let Some((x0, y0, x1, y1)) =
            self.clip(dest.x.round(), dest.y.round(), (dest.x + dest.w).round(), (dest.y + dest.h).round())
        else {
            return;
        };
        let (sx_scale, sy_scale) = (f64::from(image.width) / dest.w, f64::from(image.height) / dest.h);
        for y in y0..y1 {
            let sy = (((y as f64 + 0.5 - dest.y) * sy_scale) as u32).min(image.height - 1);
            for x in x0..x1 {
                let sx = (((x as f64 + 0.5 - dest.x) * sx_scale) as u32).min(image.width - 1);
                let [r, g, b, a] = image.pixel(sx, sy);
                if a == 0 {
                    continue;
                }
                let i = self.offset(x, y);
                self.blend(i, [r, g, b], f32::from(a) / 255.0);
            }
        }
    }

    fn stroke_path(&mut self, points: &[Point], stroke: &Stroke) {
        if points.len() < 2 || stroke.width <= 0.0 {
            return;
        }
        let half = (stroke.width / 2.0).max(0.5);
        let mut dash = DashCursor::new(stroke.dash);
        let mut covered = Vec::new();

        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let length = (b.x - a.x).hypot(b.y - a.y);
            let steps = (length / STROKE_STEP).ceil().max(1.0) as usize;
            let step = length / steps as f64;
            for k in 0..steps {
                let t = k as f64 / steps as f64;
                if dash.is_on() {
                    let p = Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
                    self.stamp(p, half, &mut covered);
                }
                dash.advance(step);
            }
        }
        if dash.is_on() {
            if let Some(&last) = points.last() {
                self.stamp(last, half, &mut covered);
            }
        }

        covered.sort_unstable();
        covered.dedup();
        let rgb = [stroke.color.r, stroke.color.g, stroke.color.b];
        for i in covered {
            self.blend(i, rgb, stroke.color.a);
        }
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: &Stroke) {
        let (x1, y1) = (rect.x + rect.w, rect.y + rect.h);
        let outline = [
            Point::new(rect.x, rect.y),
            Point::new(x1, rect.y),
            Point::new(x1, y1),
            Point::new(rect.x, y1),
            Point::new(rect.x, rect.y),
        ];
        self.stroke_path(&outline, stroke);
    }

    fn fill_text(&mut self, text: &str, at: Point, size: f64, color: Color) {
        let scale = (size / 5.0).round().max(1.0);
        let advance = 4.0 * scale;
        let count = text.chars().count() as f64;
        let width = (count * advance - scale).max(0.0);
        let left = at.x - width / 2.0;
        let top = at.y - 5.0 * scale;

        for (n, ch) in text.chars().enumerate() {
            let Some(rows) = glyph(ch) else {
                continue;
            };
            let gx = left + n as f64 * advance;
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..3 {
                    if bits & (0b100 >> col) != 0 {
                        let cell = Rect::new(gx + col as f64 * scale, top + row as f64 * scale, scale, scale);
                        self.fill_rect(cell, color);
                    }
                }
            }
        }
    }
}

/// 3×5 bitmap glyphs, one row per byte, leftmost column in bit 2.
fn glyph(ch: char) -> Option<[u8; 5]> {
    let rows = match ch.to_ascii_uppercase() {
        '0' => [7, 5, 5, 5, 7],
        '1' => [2, 6, 2, 2, 7],
        '2' => [7, 1, 7, 4, 7],
        '3' => [7, 1, 7, 1, 7],
        '4' => [5, 5, 7, 1, 1],
        '5' => [7, 4, 7, 1, 7],
        '6' => [7, 4, 7, 5, 7],
        '7' => [7, 1, 1, 2, 2],
        '8' => [7, 5, 7, 5, 7],
        '9' => [7, 5, 7, 1, 7],
        '-' => [0, 0, 7, 0, 0],
        'A' => [2, 5, 7, 5, 5],
        'B' => [6, 5, 6, 5, 6],
        'C' => [3, 4, 4, 4, 3],
        'D' => [6, 5, 5, 5, 6],
        'E' => [7, 4, 6, 4, 7],
        'F' => [7, 4, 6, 4, 4],
        'G' => [3, 4, 5, 5, 3],
        'H' => [5, 5, 7, 5, 5],
        'I' => [7, 2, 2, 2, 7],
        'J' => [1, 1, 1, 5, 2],
        'K' => [5, 5, 6, 5, 5],
        'L' => [4, 4, 4, 4, 7],
        'M' => [5, 7, 7, 5, 5],
        'N' => [6, 5, 5, 5, 5],
        'O' => [2, 5, 5, 5, 2],
        'P' => [6, 5, 6, 4, 4],
        'Q' => [2, 5, 5, 6, 3],
        'R' => [6, 5, 6, 5, 5],
        'S' => [3, 4, 2, 1, 6],
        'T' => [7, 2, 2, 2, 2],
        'U' => [5, 5, 5, 5, 7],
        'V' => [5, 5, 5, 5, 2],
        'W' => [5, 5, 7, 7, 5],
        'X' => [5, 5, 2, 5, 5],
        'Y' => [5, 5, 2, 2, 2],
        'Z' => [7, 1, 2, 4, 7],
        _ => return None,
    };
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);

    #[test]
    fn fill_rect_clips_to_grid() {
        let mut s = PixelSurface::new(Viewport::new(4, 4));
        s.fill_rect(Rect::new(-2.0, -2.0, 4.0, 4.0), RED);
        assert_eq!(s.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(s.pixel(1, 1), [255, 0, 0, 255]);
        assert_eq!(s.pixel(2, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn half_alpha_blends_over_black() {
        let mut s = PixelSurface::new(Viewport::new(1, 1));
        s.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::rgb(0, 0, 0));
        s.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::rgba(200, 100, 0, 0.5));
        assert_eq!(s.pixel(0, 0), [100, 50, 0, 255]);
    }

    #[test]
    fn dashed_stroke_leaves_gaps() {
        let mut s = PixelSurface::new(Viewport::new(40, 3));
        let line = [Point::new(0.0, 1.5), Point::new(40.0, 1.5)];
        s.stroke_path(&line, &Stroke::dashed(RED, 1.0, &[4.0, 4.0]));
        let lit = (0..40).filter(|&x| s.pixel(x, 1)[3] > 0).count();
        assert!(lit > 12 && lit < 32, "lit {lit}");
        assert_eq!(s.pixel(1, 1)[0], 255);
        assert_eq!(s.pixel(6, 1)[3], 0);
    }

    #[test]
    fn overlapping_stroke_samples_blend_once() {
        let mut s = PixelSurface::new(Viewport::new(10, 3));
        let line = [Point::new(0.0, 1.5), Point::new(10.0, 1.5)];
        s.stroke_path(&line, &Stroke::solid(Color::rgba(255, 255, 255, 0.5), 1.0));
        assert_eq!(s.pixel(5, 1), [128, 128, 128, 128]);
    }

    #[test]
    fn raster_blit_scales_nearest() {
        let image = RasterImage { width: 2, height: 1, pixels: vec![255, 0, 0, 255, 0, 0, 255, 255], generation: 1 };
        let mut s = PixelSurface::new(Viewport::new(4, 2));
        s.draw_raster(RasterSlot::Satellite, &image, Rect::new(0.0, 0.0, 4.0, 2.0));
        assert_eq!(s.pixel(1, 1), [255, 0, 0, 255]);
        assert_eq!(s.pixel(2, 0), [0, 0, 255, 255]);
    }

    #[test]
    fn text_draws_known_glyphs_only() {
        let mut s = PixelSurface::new(Viewport::new(30, 12));
        s.fill_text("T-1", Point::new(15.0, 10.0), 5.0, RED);
        assert!(s.as_rgba().chunks(4).any(|px| px[3] > 0));
        let mut blank = PixelSurface::new(Viewport::new(30, 12));
        blank.fill_text("~~", Point::new(15.0, 10.0), 5.0, RED);
        assert!(blank.as_rgba().iter().all(|&b| b == 0));
    }
}
