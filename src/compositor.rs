//! Draws the enabled layers, in order, onto a [`Surface`].

use crate::animation::AnimationClock;
use crate::config::DemoConfig;
use crate::geom::{Color, Point, Rect, Viewport};
use crate::layers::{Backing, LayerSet, VectorLayer};
use crate::raster::RasterCache;
use crate::structural::{FeatureKind, StructuralFeature, Weight};
use crate::surface::{Stroke, Surface};
use crate::targets::{Priority, TargetPoint};

const GOLD: Color = Color::rgb(224, 192, 96);
const FOLD: Color = Color::rgb(220, 180, 100);
const GRID: Stroke = Stroke::solid(Color::rgba(200, 160, 80, 0.04), 0.5);

const SHEAR_DASH: &[f64] = &[4.0, 4.0];
const FOLD_DASH: &[f64] = &[8.0, 4.0, 2.0, 4.0];

/// Line style for a structural feature.
pub fn feature_stroke(kind: FeatureKind, weight: Weight) -> Stroke {
    match (kind, weight) {
        (FeatureKind::Fault, Weight::Major) => Stroke::solid(GOLD.with_alpha(0.8), 2.5),
        (FeatureKind::Fault, Weight::Secondary) => Stroke::solid(Color::rgba(200, 170, 90, 0.55), 1.8),
        (FeatureKind::Fault, Weight::Minor) => Stroke::solid(GOLD.with_alpha(0.45), 1.2),
        (FeatureKind::Shear, _) => Stroke::dashed(GOLD.with_alpha(0.3), 1.0, SHEAR_DASH),
        (FeatureKind::Fold, Weight::Major) => Stroke::dashed(FOLD.with_alpha(0.6), 2.0, FOLD_DASH),
        (FeatureKind::Fold, _) => Stroke::dashed(FOLD.with_alpha(0.4), 1.4, FOLD_DASH),
    }
}

struct MarkerStyle {
    glow: Color,
    glow_alpha: f32,
    glow_gain: f32,
    frame: Stroke,
    bracket: Stroke,
    crosshair: Stroke,
    label: Color,
    badge: Color,
}

const HIGH_MARKER: MarkerStyle = MarkerStyle {
    glow: Color::rgb(200, 160, 50),
    glow_alpha: 0.15,
    glow_gain: 0.2,
    frame: Stroke::solid(Color::rgba(255, 200, 50, 0.9), 2.0),
    bracket: Stroke::solid(Color::rgb(0xff, 0xc8, 0x32), 2.5),
    crosshair: Stroke::solid(Color::rgba(255, 200, 50, 0.5), 0.5),
    label: Color::rgb(0xff, 0xc8, 0x32),
    badge: Color::rgba(255, 200, 50, 0.6),
};

const MEDIUM_MARKER: MarkerStyle = MarkerStyle {
    glow: Color::rgb(200, 160, 50),
    glow_alpha: 0.1,
    glow_gain: 0.12,
    frame: Stroke::solid(Color::rgba(200, 160, 80, 0.7), 1.5),
    bracket: Stroke::solid(Color::rgb(0xc8, 0xa0, 0x50), 2.0),
    crosshair: Stroke::solid(Color::rgba(200, 160, 80, 0.35), 0.5),
    label: Color::rgb(0xc8, 0xa0, 0x50),
    badge: Color::rgba(200, 160, 80, 0.5),
};

const BRACKET_LEN: f64 = 8.0;
const CROSSHAIR_LEN: f64 = 5.0;
const LABEL_SIZE: f64 = 10.0;
const BADGE_SIZE: f64 = 8.0;

/// Everything a frame is drawn from. Rendering reads it and nothing else.
pub struct Scene<'a> {
    pub viewport: Viewport,
    pub layers: &'a LayerSet,
    pub rasters: &'a RasterCache,
    pub features: &'a [StructuralFeature],
    pub targets: &'a [TargetPoint],
    pub clock: AnimationClock,
    pub config: &'a DemoConfig,
}

/// Background, enabled layers in draw order, then the grid.
pub fn render(surface: &mut impl Surface, scene: &Scene<'_>) {
    let viewport = scene.viewport;
    if viewport.width == 0 || viewport.height == 0 {
        return;
    }
    surface.fill_rect(viewport.bounds(), scene.config.background);

    for layer in scene.layers.enabled() {
        match layer.backing() {
            Backing::Raster(slot) => match scene.rasters.get(slot, viewport) {
                Some(image) => surface.draw_raster(slot, image, viewport.bounds()),
                None => log::warn!("skipping {layer}: no raster built for {viewport}"),
            },
            Backing::Vector(VectorLayer::Structural) => draw_structural(surface, scene.features, viewport),
            Backing::Vector(VectorLayer::Targets) => draw_targets(surface, scene),
        }
    }

    draw_grid(surface, viewport, scene.config.grid_spacing);
}

fn draw_structural(surface: &mut impl Surface, features: &[StructuralFeature], viewport: Viewport) {
    let mut path = Vec::new();
    for feature in features.iter().filter(|f| f.points.len() >= 2) {
        path.clear();
        path.extend(feature.points.iter().map(|p| p.to_viewport(viewport)));
        surface.stroke_path(&path, &feature_stroke(feature.kind, feature.weight));
    }
}

fn draw_targets(surface: &mut impl Surface, scene: &Scene<'_>) {
    let viewport = scene.viewport;
    let pulse = scene.clock.pulse(scene.config.pulse_rate);
    let (w, h) = (f64::from(viewport.width), f64::from(viewport.height));

    for target in scene.targets {
        let style = match target.priority {
            Priority::High => &HIGH_MARKER,
            Priority::Medium => &MEDIUM_MARKER,
        };
        let c = target.position.to_viewport(viewport);
        let (hw, hh) = (target.footprint * w / 2.0, target.footprint * h / 2.0);
        let frame = Rect::centered(c, hw, hh);

        let glow = style.glow.with_alpha(style.glow_alpha + pulse as f32 * style.glow_gain);
        surface.stroke_rect(frame.inflate(pulse * scene.config.glow_expand), &Stroke::solid(glow, 1.0));
        surface.stroke_rect(frame, &style.frame);

        let (l, t, r, b) = (c.x - hw, c.y - hh, c.x + hw, c.y + hh);
        let brackets = [
            [Point::new(l, t + BRACKET_LEN), Point::new(l, t), Point::new(l + BRACKET_LEN, t)],
            [Point::new(r - BRACKET_LEN, t), Point::new(r, t), Point::new(r, t + BRACKET_LEN)],
            [Point::new(l, b - BRACKET_LEN), Point::new(l, b), Point::new(l + BRACKET_LEN, b)],
            [Point::new(r - BRACKET_LEN, b), Point::new(r, b), Point::new(r, b - BRACKET_LEN)],
        ];
        for bracket in &brackets {
            surface.stroke_path(bracket, &style.bracket);
        }

        surface.stroke_path(
            &[Point::new(c.x - CROSSHAIR_LEN, c.y), Point::new(c.x + CROSSHAIR_LEN, c.y)],
            &style.crosshair,
        );
        surface.stroke_path(
            &[Point::new(c.x, c.y - CROSSHAIR_LEN), Point::new(c.x, c.y + CROSSHAIR_LEN)],
            &style.crosshair,
        );

        surface.fill_text(&target.label, Point::new(c.x, t - 8.0), LABEL_SIZE, style.label);
        surface.fill_text(target.priority.badge(), Point::new(c.x, b + 14.0), BADGE_SIZE, style.badge);
    }
}

fn draw_grid(surface: &mut impl Surface, viewport: Viewport, spacing: f64) {
    if spacing <= 0.0 {
        return;
    }
    let (w, h) = (f64::from(viewport.width), f64::from(viewport.height));
    let mut x = 0.0;
    while x < w {
        surface.stroke_path(&[Point::new(x, 0.0), Point::new(x, h)], &GRID);
        x += spacing;
    }
    let mut y = 0.0;
    while y < h {
        surface.stroke_path(&[Point::new(0.0, y), Point::new(w, y)], &GRID);
        y += spacing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_weight_follows_feature_weight() {
        let major = feature_stroke(FeatureKind::Fault, Weight::Major);
        let secondary = feature_stroke(FeatureKind::Fault, Weight::Secondary);
        let minor = feature_stroke(FeatureKind::Fault, Weight::Minor);
        assert!(major.width > secondary.width && secondary.width > minor.width);
        assert!(major.dash.is_empty());
    }

    #[test]
    fn shears_dash_and_folds_dash_dot() {
        assert_eq!(feature_stroke(FeatureKind::Shear, Weight::Minor).dash, SHEAR_DASH);
        assert_eq!(feature_stroke(FeatureKind::Fold, Weight::Minor).dash.len(), 4);
    }
}
