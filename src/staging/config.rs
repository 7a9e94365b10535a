//! Configuration for staging

use serde::{Deserialize, Serialize};

/// Distances used when turning layouts into coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Gap used by layouts without an explicit separation
    pub default_separation: f64,

    /// Distance between neighbouring seed positions
    pub seed_spacing: f64,

    /// Radius of each cycle's circle
    pub cycle_radius: f64,

    /// Gap between the circles of consecutive cycles
    pub cycle_spacing: f64,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            default_separation: 100.0,
            seed_spacing: 150.0,
            cycle_radius: 150.0,
            cycle_spacing: 100.0,
        }
    }
}

impl StageConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gap used when no separation is given
    pub fn with_default_separation(mut self, separation: f64) -> Self {
        self.default_separation = separation;
        self
    }

    /// Set the seed grid spacing
    pub fn with_seed_spacing(mut self, spacing: f64) -> Self {
        self.seed_spacing = spacing;
        self
    }

    /// Set the cycle circle radius
    pub fn with_cycle_radius(mut self, radius: f64) -> Self {
        self.cycle_radius = radius;
        self
    }

    pub fn with_cycle_spacing(mut self, spacing: f64) -> Self {
        self.cycle_spacing = spacing;
        self
    }
}
