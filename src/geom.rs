//! Small value types shared by the generators, the compositor and surfaces.

use std::fmt;

/// A position. Feature generators emit normalized `[0, 1]²` points; the
/// compositor scales them to canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Map a normalized point onto a viewport in pixels.
    pub fn to_viewport(self, viewport: Viewport) -> Point {
        Point::new(self.x * f64::from(viewport.width), self.y * f64::from(viewport.height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of half-extents `(hw, hh)` around `center`.
    pub fn centered(center: Point, hw: f64, hh: f64) -> Self {
        Self::new(center.x - hw, center.y - hh, hw * 2.0, hh * 2.0)
    }

    /// Grow on every side by `by` pixels.
    pub fn inflate(self, by: f64) -> Self {
        Self::new(self.x - by, self.y - by, self.w + by * 2.0, self.h + by * 2.0)
    }
}

/// Logical canvas size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether both sides reach `min`. Layout can report tiny sizes before it
    /// settles; those are never rasterized.
    pub fn is_usable(self, min: u32) -> bool {
        self.width >= min && self.height >= min
    }

    pub fn bounds(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Straight (non-premultiplied) colour with fractional alpha, the way the
/// canvas style strings express it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS colour string, e.g. `rgba(224, 192, 96, 0.8)`.
    pub fn to_css(self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}
