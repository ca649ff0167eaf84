//! The fixed registry of thematic layers and their on/off state.

use std::fmt;
use std::str::FromStr;

use crate::error::GisError;
use crate::geom::Color;
use crate::raster::{Classifier, RasterPalette, RasterSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKind {
    Satellite,
    HostRock,
    IronOxide,
    Carbonate,
    Structural,
    Targets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorLayer {
    Structural,
    Targets,
}

/// How a layer reaches the canvas: blitted from a cached image, or stroked
/// from vector data every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backing {
    Raster(RasterSlot),
    Vector(VectorLayer),
}

impl LayerKind {
    /// Every layer, in draw order.
    pub const ALL: [LayerKind; 6] = [
        LayerKind::Satellite,
        LayerKind::HostRock,
        LayerKind::IronOxide,
        LayerKind::Carbonate,
        LayerKind::Structural,
        LayerKind::Targets,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn backing(self) -> Backing {
        match self {
            LayerKind::Satellite => Backing::Raster(RasterSlot::Satellite),
            LayerKind::HostRock => Backing::Raster(RasterSlot::HostRock),
            LayerKind::IronOxide => Backing::Raster(RasterSlot::IronOxide),
            LayerKind::Carbonate => Backing::Raster(RasterSlot::Carbonate),
            LayerKind::Structural => Backing::Vector(VectorLayer::Structural),
            LayerKind::Targets => Backing::Vector(VectorLayer::Targets),
        }
    }

    /// Identifier used by page markup (`data-layer="ironoxide"`).
    pub const fn name(self) -> &'static str {
        match self {
            LayerKind::Satellite => "satellite",
            LayerKind::HostRock => "hostrock",
            LayerKind::IronOxide => "ironoxide",
            LayerKind::Carbonate => "carbonate",
            LayerKind::Structural => "structural",
            LayerKind::Targets => "targets",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            LayerKind::Satellite => "Satellite Base",
            LayerKind::HostRock => "Host Rock Geology",
            LayerKind::IronOxide => "Iron Oxide Alteration",
            LayerKind::Carbonate => "Carbonate Anomaly",
            LayerKind::Structural => "Structural Lines",
            LayerKind::Targets => "Exploration Targets",
        }
    }

    /// Button swatch colour.
    pub const fn swatch(self) -> Color {
        match self {
            LayerKind::Satellite => Color::rgb(0x8a, 0x7a, 0x5a),
            LayerKind::HostRock => Color::rgb(0x5a, 0x6e, 0x8a),
            LayerKind::IronOxide => Color::rgb(0xcc, 0x44, 0x44),
            LayerKind::Carbonate => Color::rgb(0x44, 0xaa, 0x99),
            LayerKind::Structural => Color::rgb(0xe0, 0xc0, 0x60),
            LayerKind::Targets => Color::rgb(0xff, 0xff, 0x66),
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayerKind {
    type Err = GisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayerKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| GisError::UnknownLayer(s.to_string()))
    }
}

/// Enabled flags for every registered layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerSet {
    enabled: [bool; LayerKind::ALL.len()],
}

impl LayerSet {
    pub fn is_enabled(&self, kind: LayerKind) -> bool {
        self.enabled[kind.index()]
    }

    pub fn set(&mut self, kind: LayerKind, on: bool) {
        self.enabled[kind.index()] = on;
    }

    /// Flip `kind` and return its new state.
    pub fn toggle(&mut self, kind: LayerKind) -> bool {
        let on = !self.is_enabled(kind);
        self.set(kind, on);
        on
    }

    pub fn disable_all(&mut self) {
        self.enabled = Default::default();
    }

    /// Enabled layers in draw order.
    pub fn enabled(&self) -> impl Iterator<Item = LayerKind> + '_ {
        LayerKind::ALL.into_iter().filter(|&kind| self.is_enabled(kind))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LegendSymbol {
    Fill(Color),
    Line { color: Color, dash: &'static [f64] },
    Frame { color: Color, width: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendRow {
    pub symbol: LegendSymbol,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendSection {
    pub layer: LayerKind,
    pub title: &'static str,
    pub rows: Vec<LegendRow>,
}

/// Legend content for the enabled layers that carry one: the discrete
/// alteration classes, the structural line styles and target priorities.
pub fn legend(layers: &LayerSet, palette: &RasterPalette) -> Vec<LegendSection> {
    let row = |symbol: LegendSymbol, label: &'static str| LegendRow { symbol, label };
    layers
        .enabled()
        .filter_map(|layer| {
            let rows = match layer.backing() {
                Backing::Raster(slot @ (RasterSlot::IronOxide | RasterSlot::Carbonate)) => {
                    match &palette.recipe(slot).classifier {
                        Classifier::Banded { bands, .. } => bands
                            .iter()
                            .map(|b| row(LegendSymbol::Fill(Color::rgb(b.rgba[0], b.rgba[1], b.rgba[2])), b.label))
                            .collect(),
                        _ => return None,
                    }
                }
                Backing::Raster(_) => return None,
                Backing::Vector(VectorLayer::Structural) => vec![
                    row(LegendSymbol::Line { color: Color::rgb(0xe0, 0xc0, 0x60), dash: &[] }, "Fault"),
                    row(LegendSymbol::Line { color: Color::rgb(0xe0, 0xc0, 0x60), dash: &[4.0, 4.0] }, "Shear zone"),
                    row(LegendSymbol::Line { color: Color::rgb(0xda, 0xb4, 0x64), dash: &[8.0, 4.0, 2.0, 4.0] }, "Fold axis"),
                ],
                Backing::Vector(VectorLayer::Targets) => vec![
                    row(LegendSymbol::Frame { color: Color::rgb(0xff, 0xc8, 0x32), width: 2.0 }, "High priority"),
                    row(LegendSymbol::Frame { color: Color::rgb(0xc8, 0xa0, 0x50), width: 1.5 }, "Medium priority"),
                ],
            };
            Some(LegendSection { layer, title: layer.label(), rows })
        })
        .collect()
}
