//! Configuration for layout inference

use serde::{Deserialize, Serialize};

/// Search limits for layout inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Longest selector chain to try
    pub bound: usize,

    /// Compound confidence a candidate must exceed to be kept
    pub threshold: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            bound: 2,
            threshold: 0.9,
        }
    }
}

impl InferenceConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum selector chain length
    pub fn with_bound(mut self, bound: usize) -> Self {
        self.bound = bound;
        self
    }

    /// Set the acceptance threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}
