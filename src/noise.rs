//! Tileable value noise built from a [`Mulberry32`] stream.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;

use crate::rng::{Mulberry32, Seed};

/// Lattice size; the field repeats every `GRID_SIZE` units on both axes.
pub const GRID_SIZE: usize = 64;

static FIELDS: LazyLock<Mutex<HashMap<Seed, Arc<NoiseField>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Continuous 2D value noise over a toroidal lattice of PRNG draws.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseField {
    seed: Seed,
    grid: Vec<f64>,
}

impl NoiseField {
    /// Build a fresh field. Prefer [`NoiseField::shared`] outside of tests.
    pub fn new(seed: Seed) -> Self {
        let mut rng = Mulberry32::new(seed);
        let grid = (0..GRID_SIZE * GRID_SIZE).map(|_| rng.next_f64()).collect();
        Self { seed, grid }
    }

    /// Process-wide instance for `seed`. Fields are built on first use and
    /// kept for the lifetime of the process.
    pub fn shared(seed: Seed) -> Arc<Self> {
        let mut fields = FIELDS.lock();
        fields
            .entry(seed)
            .or_insert_with(|| {
                log::debug!("building noise field for seed {}", seed.0);
                Arc::new(Self::new(seed))
            })
            .clone()
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    fn lattice(&self, ix: i64, iy: i64) -> f64 {
        let n = GRID_SIZE as i64;
        let x = ix.rem_euclid(n) as usize;
        let y = iy.rem_euclid(n) as usize;
        self.grid[y * GRID_SIZE + x]
    }

    /// Smoothstep-eased bilinear sample in `[0, 1)`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        let (fx, fy) = (x - x0, y - y0);
        // reduce before the cast so huge coordinates stay inside i64
        let n = GRID_SIZE as f64;
        let (ix, iy) = (x0.rem_euclid(n) as i64, y0.rem_euclid(n) as i64);

        let top = eased_lerp(self.lattice(ix, iy), self.lattice(ix + 1, iy), fx);
        let bottom = eased_lerp(self.lattice(ix, iy + 1), self.lattice(ix + 1, iy + 1), fx);
        eased_lerp(top, bottom, fy)
    }
}

fn eased_lerp(a: f64, b: f64, t: f64) -> f64 {
    let t = t * t * (3.0 - 2.0 * t);
    a + (b - a) * t
}

/// One weighted read of a noise field at a scaled, shifted coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Octave {
    pub frequency: f64,
    pub offset: (f64, f64),
    pub weight: f64,
}

impl Octave {
    pub const fn new(frequency: f64, weight: f64) -> Self {
        Self { frequency, offset: (0.0, 0.0), weight }
    }

    pub const fn shifted(self, dx: f64, dy: f64) -> Self {
        Self { offset: (dx, dy), ..self }
    }
}

/// Weighted sum of octaves, all read from the same field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Blend {
    pub octaves: Vec<Octave>,
}

impl Blend {
    pub fn new(octaves: impl Into<Vec<Octave>>) -> Self {
        Self { octaves: octaves.into() }
    }

    pub fn sample(&self, field: &NoiseField, x: f64, y: f64) -> f64 {
        self.octaves
            .iter()
            .map(|o| {
                o.weight * field.sample(x * o.frequency + o.offset.0, y * o.frequency + o.offset.1)
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_points_are_grid_values() {
        let field = NoiseField::new(Seed(9));
        let mut rng = Mulberry32::new(Seed(9));
        let first = rng.next_f64();
        let second = rng.next_f64();
        assert_eq!(field.sample(0.0, 0.0), first);
        assert_eq!(field.sample(1.0, 0.0), second);
    }

    #[test]
    fn halfway_is_the_midpoint() {
        let field = NoiseField::new(Seed(3));
        let a = field.sample(5.0, 7.0);
        let b = field.sample(6.0, 7.0);
        let mid = field.sample(5.5, 7.0);
        assert!((mid - (a + b) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn blend_weights_sum_octaves() {
        let field = NoiseField::new(Seed(5));
        let blend = Blend::new([Octave::new(2.0, 0.5), Octave::new(4.0, 0.5).shifted(3.0, 1.0)]);
        let expected = 0.5 * field.sample(2.0, 2.0) + 0.5 * field.sample(7.0, 5.0);
        assert!((blend.sample(&field, 1.0, 1.0) - expected).abs() < 1e-12);
    }
}
