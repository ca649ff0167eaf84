//! Exploration target markers.

use crate::geom::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    Medium,
}

impl Priority {
    /// Short badge text drawn under the marker.
    pub fn badge(self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MED",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetPoint {
    pub position: Point,
    pub priority: Priority,
    pub label: String,
    /// Marker side as a fraction of the viewport dimension.
    pub footprint: f64,
}

impl TargetPoint {
    pub fn new(x: f64, y: f64, priority: Priority, label: impl Into<String>, footprint: f64) -> Self {
        Self { position: Point::new(x, y), priority, label: label.into(), footprint }
    }
}

/// Targets placed where alteration, carbonate and structure overlap.
pub fn default_targets() -> Vec<TargetPoint> {
    vec![
        TargetPoint::new(0.38, 0.42, Priority::High, "T-1", 0.065),
        TargetPoint::new(0.55, 0.30, Priority::High, "T-2", 0.055),
        TargetPoint::new(0.28, 0.58, Priority::Medium, "T-3", 0.048),
        TargetPoint::new(0.65, 0.48, Priority::Medium, "T-4", 0.045),
        TargetPoint::new(0.48, 0.65, Priority::Medium, "T-5", 0.042),
    ]
}
