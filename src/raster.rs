//! Classified raster layers synthesized from noise fields, and the per-size
//! cache that holds them.

use crate::geom::Viewport;
use crate::noise::{Blend, NoiseField};
use crate::rng::Seed;

/// Pixel coordinates are mapped onto this many noise units across the canvas.
pub const NOISE_SPAN: f64 = 8.0;

/// The raster-backed layers, in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RasterSlot {
    Satellite,
    HostRock,
    IronOxide,
    Carbonate,
}

impl RasterSlot {
    pub const ALL: [RasterSlot; 4] =
        [RasterSlot::Satellite, RasterSlot::HostRock, RasterSlot::IronOxide, RasterSlot::Carbonate];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// RGBA8 buffer covering a whole viewport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    /// Bumped on every cache rebuild so surfaces can tell stale uploads apart.
    pub generation: u64,
}

impl RasterImage {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }
}

/// A class picked by the zone blend; colour shaded by the optional tone blend.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    /// Exclusive upper bound of the zone value. The last zone catches the rest.
    pub upper: f64,
    pub base: [u8; 3],
    pub gain: [f64; 3],
    pub alpha: u8,
}

impl Zone {
    pub const fn flat(upper: f64, rgb: [u8; 3], alpha: u8) -> Self {
        Self { upper, base: rgb, gain: [0.0; 3], alpha }
    }

    pub const fn shaded(upper: f64, base: [u8; 3], gain: [f64; 3]) -> Self {
        Self { upper, base, gain, alpha: 255 }
    }
}

/// One discrete intensity level; applies when the value exceeds `threshold`.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub threshold: f64,
    pub rgba: [u8; 4],
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampStop {
    pub at: f64,
    pub rgb: [u8; 3],
}

/// Secondary noise that scales ramp alpha between `floor` and 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Intensity {
    pub blend: Blend,
    pub floor: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classifier {
    Zoned { zone: Blend, tone: Option<Blend>, zones: Vec<Zone> },
    Banded { value: Blend, bands: Vec<Band> },
    Ramp { value: Blend, stops: Vec<RampStop>, intensity: Option<Intensity>, alpha: u8 },
}

impl Classifier {
    /// Discrete classifier; bands are kept sorted by descending threshold.
    pub fn banded(value: Blend, mut bands: Vec<Band>) -> Self {
        bands.sort_by(|a, b| b.threshold.total_cmp(&a.threshold));
        Classifier::Banded { value, bands }
    }

    /// Lowest threshold below which nothing is drawn, if the classifier has one.
    pub fn cutoff(&self) -> Option<f64> {
        match self {
            Classifier::Zoned { .. } => None,
            Classifier::Banded { bands, .. } => bands.last().map(|b| b.threshold),
            Classifier::Ramp { stops, .. } => stops.first().map(|s| s.at),
        }
    }

    /// Colour of the noise-space point `(nx, ny)`.
    pub fn classify(&self, field: &NoiseField, nx: f64, ny: f64) -> [u8; 4] {
        match self {
            Classifier::Zoned { zone, tone, zones } => {
                let z = zone.sample(field, nx, ny);
                let Some(picked) = zones.iter().find(|c| z < c.upper).or(zones.last()) else {
                    return [0; 4];
                };
                let t = tone.as_ref().map_or(0.0, |b| b.sample(field, nx, ny));
                let ch = |i: usize| (f64::from(picked.base[i]) + t * picked.gain[i]).floor().clamp(0.0, 255.0) as u8;
                [ch(0), ch(1), ch(2), picked.alpha]
            }
            Classifier::Banded { value, bands } => {
                let v = value.sample(field, nx, ny);
                bands.iter().find(|b| v > b.threshold).map_or([0; 4], |b| b.rgba)
            }
            Classifier::Ramp { value, stops, intensity, alpha } => {
                let v = value.sample(field, nx, ny);
                let Some(rgb) = ramp(stops, v) else {
                    return [0; 4];
                };
                let scale = intensity.as_ref().map_or(1.0, |i| {
                    i.floor + (1.0 - i.floor) * i.blend.sample(field, nx, ny).clamp(0.0, 1.0)
                });
                let a = (f64::from(*alpha) * scale).round().clamp(1.0, 255.0) as u8;
                [rgb[0], rgb[1], rgb[2], a]
            }
        }
    }
}

fn ramp(stops: &[RampStop], v: f64) -> Option<[u8; 3]> {
    let first = stops.first()?;
    if v <= first.at {
        return None;
    }
    for pair in stops.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if v <= hi.at {
            let t = (v - lo.at) / (hi.at - lo.at);
            let mix = |i: usize| {
                (f64::from(lo.rgb[i]) + (f64::from(hi.rgb[i]) - f64::from(lo.rgb[i])) * t).round() as u8
            };
            return Some([mix(0), mix(1), mix(2)]);
        }
    }
    stops.last().map(|s| s.rgb)
}

/// Everything needed to synthesize one raster layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterRecipe {
    pub seed: Seed,
    pub classifier: Classifier,
}

/// Recipes for the four raster slots.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterPalette {
    pub satellite: RasterRecipe,
    pub host_rock: RasterRecipe,
    pub iron_oxide: RasterRecipe,
    pub carbonate: RasterRecipe,
}

impl RasterPalette {
    pub fn recipe(&self, slot: RasterSlot) -> &RasterRecipe {
        match slot {
            RasterSlot::Satellite => &self.satellite,
            RasterSlot::HostRock => &self.host_rock,
            RasterSlot::IronOxide => &self.iron_oxide,
            RasterSlot::Carbonate => &self.carbonate,
        }
    }
}

/// Noise-space coordinate of a pixel.
pub fn noise_coord(x: u32, y: u32, viewport: Viewport) -> (f64, f64) {
    (
        f64::from(x) / f64::from(viewport.width) * NOISE_SPAN,
        f64::from(y) / f64::from(viewport.height) * NOISE_SPAN,
    )
}

/// Classify every pixel of `viewport`. The classifier runs once per
/// `stride`×`stride` block and the block is filled with its result.
pub fn synthesize(recipe: &RasterRecipe, viewport: Viewport, stride: u32, generation: u64) -> RasterImage {
    let field = NoiseField::shared(recipe.seed);
    let (w, h) = (viewport.width as usize, viewport.height as usize);
    let stride = stride.max(1) as usize;
    let mut pixels = vec![0u8; w * h * 4];

    for by in (0..h).step_by(stride) {
        for bx in (0..w).step_by(stride) {
            let (nx, ny) = noise_coord(bx as u32, by as u32, viewport);
            let rgba = recipe.classifier.classify(&field, nx, ny);
            if rgba[3] == 0 {
                continue;
            }
            for y in by..(by + stride).min(h) {
                let row = y * w;
                for x in bx..(bx + stride).min(w) {
                    let i = (row + x) * 4;
                    pixels[i..i + 4].copy_from_slice(&rgba);
                }
            }
        }
    }

    RasterImage { width: viewport.width, height: viewport.height, pixels, generation }
}

/// One image per raster slot, all built for the same viewport.
#[derive(Debug, Default)]
pub struct RasterCache {
    images: Vec<RasterImage>,
    built_for: Option<Viewport>,
    pending: bool,
    generation: u64,
}

impl RasterCache {
    pub fn new() -> Self {
        Self { pending: true, ..Self::default() }
    }

    /// Mark every image stale; the next [`RasterCache::ensure`] rebuilds all.
    pub fn invalidate(&mut self) {
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn built_for(&self) -> Option<Viewport> {
        self.built_for
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Rebuild all slots if invalidated or built for another size. Returns
    /// whether a rebuild happened.
    pub fn ensure(&mut self, palette: &RasterPalette, viewport: Viewport, stride: u32) -> bool {
        if !self.pending && self.built_for == Some(viewport) {
            return false;
        }
        self.generation += 1;
        let generation = self.generation;
        self.images = RasterSlot::ALL
            .iter()
            .map(|&slot| synthesize(palette.recipe(slot), viewport, stride, generation))
            .collect();
        self.built_for = Some(viewport);
        self.pending = false;
        log::debug!("rebuilt {} raster layers at {viewport} (generation {generation})", self.images.len());
        true
    }

    /// Image for `slot`, only if it matches `viewport`.
    pub fn get(&self, slot: RasterSlot, viewport: Viewport) -> Option<&RasterImage> {
        if self.pending || self.built_for != Some(viewport) {
            return None;
        }
        self.images.get(slot.index())
    }
}
