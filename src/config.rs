//! Compiled-in demo configuration: seeds, palettes, geometry and timing.

use std::time::Duration;

use crate::geom::Color;
use crate::noise::{Blend, Octave};
use crate::raster::{Band, Classifier, Intensity, RampStop, RasterPalette, RasterRecipe, Zone};
use crate::rng::Seed;
use crate::structural::StructuralConfig;
use crate::targets::{default_targets, TargetPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Delay between auto-demo steps.
    pub step_interval: Duration,
    /// Pause after the last layer before the auto demo resets.
    pub dwell: Duration,
    /// Frame period of [`crate::ManualScheduler`]; browsers pace frames themselves.
    pub frame_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            step_interval: Duration::from_millis(1500),
            dwell: Duration::from_millis(3000),
            frame_interval: Duration::from_millis(16),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub palette: RasterPalette,
    pub structural: StructuralConfig,
    pub targets: Vec<TargetPoint>,
    pub timing: Timing,
    pub background: Color,
    pub grid_spacing: f64,
    /// Rasters are classified once per `raster_stride`² pixel block.
    pub raster_stride: u32,
    /// Smallest width/height worth rasterizing.
    pub min_viewport: u32,
    /// Radians of pulse phase per animation frame.
    pub pulse_rate: f64,
    /// Pixels the target glow grows at full pulse.
    pub glow_expand: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            palette: discrete_palette(),
            structural: StructuralConfig::default(),
            targets: default_targets(),
            timing: Timing::default(),
            background: Color::rgb(0x06, 0x0a, 0x10),
            grid_spacing: 40.0,
            raster_stride: 4,
            min_viewport: 10,
            pulse_rate: 0.04,
            glow_expand: 6.0,
        }
    }
}

impl DemoConfig {
    /// Same scene with smooth ramps instead of discrete alteration classes.
    pub fn continuous() -> Self {
        Self { palette: continuous_palette(), ..Self::default() }
    }
}

fn satellite() -> RasterRecipe {
    RasterRecipe {
        seed: Seed(42),
        classifier: Classifier::Zoned {
            zone: Blend::new([Octave::new(1.2, 0.6).shifted(3.0, 7.0), Octave::new(3.0, 0.4).shifted(5.0, 2.0)]),
            tone: Some(Blend::new([Octave::new(2.0, 0.5), Octave::new(4.0, 0.3), Octave::new(8.0, 0.2)])),
            zones: vec![
                // exposed bedrock
                Zone::shaded(0.38, [95, 88, 78], [40.0, 35.0, 30.0]),
                // alluvium and sand cover
                Zone::shaded(0.65, [140, 118, 75], [50.0, 40.0, 30.0]),
                // laterite
                Zone::shaded(f64::INFINITY, [120, 85, 55], [45.0, 30.0, 25.0]),
            ],
        },
    }
}

fn host_rock() -> RasterRecipe {
    RasterRecipe {
        seed: Seed(137),
        classifier: Classifier::Zoned {
            zone: Blend::new([Octave::new(1.5, 0.7), Octave::new(3.0, 0.3)]),
            tone: None,
            zones: vec![
                Zone::flat(0.35, [105, 95, 75], 180),
                Zone::flat(0.65, [135, 110, 85], 180),
                Zone::flat(f64::INFINITY, [90, 82, 95], 180),
            ],
        },
    }
}

fn iron_oxide_blend() -> Blend {
    Blend::new([Octave::new(3.0, 0.6), Octave::new(6.0, 0.4)])
}

fn carbonate_blend() -> Blend {
    Blend::new([Octave::new(3.5, 0.6), Octave::new(7.0, 0.4)])
}

/// Three-level alteration classes.
pub fn discrete_palette() -> RasterPalette {
    RasterPalette {
        satellite: satellite(),
        host_rock: host_rock(),
        iron_oxide: RasterRecipe {
            seed: Seed(271),
            classifier: Classifier::banded(
                iron_oxide_blend(),
                vec![
                    Band { threshold: 0.72, rgba: [180, 30, 25, 200], label: "High" },
                    Band { threshold: 0.58, rgba: [200, 80, 55, 170], label: "Medium" },
                    Band { threshold: 0.46, rgba: [210, 140, 120, 130], label: "Low" },
                ],
            ),
        },
        carbonate: RasterRecipe {
            seed: Seed(389),
            classifier: Classifier::banded(
                carbonate_blend(),
                vec![
                    Band { threshold: 0.74, rgba: [20, 140, 115, 200], label: "Strong" },
                    Band { threshold: 0.60, rgba: [70, 170, 145, 160], label: "Moderate" },
                    Band { threshold: 0.48, rgba: [140, 200, 185, 120], label: "Weak" },
                ],
            ),
        },
    }
}

/// Smooth alteration ramps, alpha modulated by a second intensity read.
pub fn continuous_palette() -> RasterPalette {
    let intensity = || Intensity { blend: Blend::new([Octave::new(5.0, 1.0).shifted(11.0, 3.0)]), floor: 0.4 };
    RasterPalette {
        satellite: satellite(),
        host_rock: host_rock(),
        iron_oxide: RasterRecipe {
            seed: Seed(271),
            classifier: Classifier::Ramp {
                value: iron_oxide_blend(),
                stops: vec![
                    RampStop { at: 0.46, rgb: [210, 140, 120] },
                    RampStop { at: 0.60, rgb: [200, 80, 55] },
                    RampStop { at: 0.80, rgb: [180, 30, 25] },
                ],
                intensity: Some(intensity()),
                alpha: 200,
            },
        },
        carbonate: RasterRecipe {
            seed: Seed(389),
            classifier: Classifier::Ramp {
                value: carbonate_blend(),
                stops: vec![
                    RampStop { at: 0.48, rgb: [140, 200, 185] },
                    RampStop { at: 0.62, rgb: [70, 170, 145] },
                    RampStop { at: 0.82, rgb: [20, 140, 115] },
                ],
                intensity: Some(intensity()),
                alpha: 200,
            },
        },
    }
}
