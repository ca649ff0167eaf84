//! Procedural fault, shear-zone and fold-axis traces in normalized map space.

use std::f64::consts::PI;

use crate::geom::Point;
use crate::rng::{Mulberry32, Seed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Fault,
    Shear,
    Fold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weight {
    Major,
    Secondary,
    Minor,
}

/// A polyline in `[0, 1]²`-ish space (jitter may nudge points slightly past
/// the edge, which simply clips at draw time).
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralFeature {
    pub points: Vec<Point>,
    pub kind: FeatureKind,
    pub weight: Weight,
}

/// A straight-ish trace: `segments` steps of `length / segments` along
/// `bearing` (radians, screen orientation with y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultTrace {
    pub start: Point,
    pub bearing: f64,
    pub length: f64,
    pub segments: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldArc {
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep: f64,
    pub steps: u32,
    pub weight: Weight,
}

/// Half-open range `[min, min + span)` drawn uniformly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spread {
    pub min: f64,
    pub span: f64,
}

impl Spread {
    pub const fn new(min: f64, span: f64) -> Self {
        Self { min, span }
    }

    fn draw(self, rng: &mut Mulberry32) -> f64 {
        self.min + rng.next_f64() * self.span
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BranchConfig {
    /// Probability that a major fault grows a splay.
    pub chance: f64,
    /// Fraction of the parent's points before the splay may start.
    pub start: Spread,
    pub angle: f64,
    pub angle_jitter: f64,
    pub length: Spread,
    pub segments: u32,
    pub jitter: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShearConfig {
    pub count: u32,
    pub bearing: f64,
    pub scatter: f64,
    pub origin: Spread,
    pub length: Spread,
    pub segments: u32,
    pub jitter: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructuralConfig {
    pub seed: Seed,
    pub majors: Vec<FaultTrace>,
    pub major_jitter: f64,
    pub branch: BranchConfig,
    pub conjugates: Vec<FaultTrace>,
    pub conjugate_jitter: f64,
    pub shear: ShearConfig,
    pub folds: Vec<FoldArc>,
    /// Relative per-point radius wobble of fold arcs.
    pub fold_jitter: f64,
}

/// Dominant NE–SW trend.
const NE_SW: f64 = PI * 0.25;

impl Default for StructuralConfig {
    fn default() -> Self {
        let major = |x, y, bend: f64, length, segments| FaultTrace {
            start: Point::new(x, y),
            bearing: -(NE_SW + bend),
            length,
            segments,
        };
        let conjugate = |x, y, bearing, length, segments| FaultTrace {
            start: Point::new(x, y),
            bearing,
            length,
            segments,
        };
        let fold = |x, y, radius, start: f64, sweep: f64, steps, weight| FoldArc {
            center: Point::new(x, y),
            radius,
            start_angle: PI * start,
            sweep: PI * sweep,
            steps,
            weight,
        };
        Self {
            seed: Seed(777),
            majors: vec![
                major(0.05, 0.85, -0.08, 0.85, 12),
                major(0.10, 0.70, 0.05, 0.75, 10),
                major(0.20, 0.95, -0.12, 0.70, 10),
                major(0.35, 0.90, 0.10, 0.60, 9),
            ],
            major_jitter: 0.018,
            branch: BranchConfig {
                chance: 0.7,
                start: Spread::new(0.3, 0.4),
                angle: 0.3,
                angle_jitter: 0.15,
                length: Spread::new(0.12, 0.18),
                segments: 5,
                jitter: 0.012,
            },
            conjugates: vec![
                conjugate(0.15, 0.10, NE_SW, 0.55, 8),
                conjugate(0.50, 0.05, NE_SW - 0.1, 0.50, 7),
            ],
            conjugate_jitter: 0.015,
            shear: ShearConfig {
                count: 10,
                bearing: -NE_SW,
                scatter: 0.2,
                origin: Spread::new(0.1, 0.7),
                length: Spread::new(0.08, 0.12),
                segments: 4,
                jitter: 0.008,
            },
            folds: vec![
                fold(0.45, 0.55, 0.18, 0.6, 0.5, 16, Weight::Major),
                fold(0.70, 0.35, 0.14, 0.8, 0.4, 12, Weight::Minor),
                fold(0.25, 0.30, 0.10, 0.3, 0.55, 12, Weight::Minor),
            ],
            fold_jitter: 0.08,
        }
    }
}

struct Tracer {
    rng: Mulberry32,
}

impl Tracer {
    fn fault_line(&mut self, start: Point, bearing: f64, length: f64, segments: u32, jitter: f64) -> Vec<Point> {
        let segments = segments.max(1);
        let (dx, dy) = (bearing.cos(), bearing.sin());
        let step = length / f64::from(segments);
        let mut p = start;
        let mut points = Vec::with_capacity(segments as usize + 1);
        points.push(p);
        for _ in 0..segments {
            p.x += dx * step + self.rng.centered() * jitter;
            p.y += dy * step + self.rng.centered() * jitter;
            points.push(p);
        }
        points
    }

    fn fold_arc(&mut self, arc: &FoldArc, jitter: f64) -> Vec<Point> {
        let steps = arc.steps.max(1);
        (0..=steps)
            .map(|i| {
                let angle = arc.start_angle + arc.sweep * f64::from(i) / f64::from(steps);
                let x = arc.center.x + angle.cos() * arc.radius * (1.0 + self.rng.centered() * jitter);
                let y = arc.center.y + angle.sin() * arc.radius * (1.0 + self.rng.centered() * jitter);
                Point::new(x, y)
            })
            .collect()
    }
}

/// Generate the full feature population. Same config, same features.
pub fn generate(config: &StructuralConfig) -> Vec<StructuralFeature> {
    let mut tracer = Tracer { rng: Mulberry32::new(config.seed) };
    let mut features = Vec::new();
    let feature = |points, kind, weight| StructuralFeature { points, kind, weight };

    for trace in &config.majors {
        let points =
            tracer.fault_line(trace.start, trace.bearing, trace.length, trace.segments, config.major_jitter);

        let branch = &config.branch;
        let splay = if tracer.rng.next_f64() > 1.0 - branch.chance {
            let at = ((points.len() as f64) * branch.start.draw(&mut tracer.rng)) as usize;
            let origin = points[at.clamp(1, points.len().saturating_sub(2).max(1))];
            let side = if tracer.rng.next_f64() > 0.5 { branch.angle } else { -branch.angle };
            let bearing = trace.bearing + side + tracer.rng.centered() * branch.angle_jitter;
            let length = branch.length.draw(&mut tracer.rng);
            Some(tracer.fault_line(origin, bearing, length, branch.segments, branch.jitter))
        } else {
            None
        };

        features.push(feature(points, FeatureKind::Fault, Weight::Major));
        if let Some(points) = splay {
            features.push(feature(points, FeatureKind::Fault, Weight::Minor));
        }
    }

    for trace in &config.conjugates {
        let points =
            tracer.fault_line(trace.start, trace.bearing, trace.length, trace.segments, config.conjugate_jitter);
        features.push(feature(points, FeatureKind::Fault, Weight::Secondary));
    }

    let shear = &config.shear;
    for _ in 0..shear.count {
        let bearing = shear.bearing - tracer.rng.centered() * shear.scatter;
        let start = Point::new(shear.origin.draw(&mut tracer.rng), shear.origin.draw(&mut tracer.rng));
        let length = shear.length.draw(&mut tracer.rng);
        let points = tracer.fault_line(start, bearing, length, shear.segments, shear.jitter);
        features.push(feature(points, FeatureKind::Shear, Weight::Minor));
    }

    for arc in &config.folds {
        let points = tracer.fold_arc(arc, config.fold_jitter);
        features.push(feature(points, FeatureKind::Fold, arc.weight));
    }

    log::debug!("generated {} structural features from seed {}", features.len(), config.seed.0);
    features
}
