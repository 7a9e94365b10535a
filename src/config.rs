//! Pipeline configuration loaded from TOML
//!
//! ```toml
//! [inference]
//! bound = 3
//! threshold = 0.85
//!
//! [staging]
//! default_separation = 60.0
//! ```
//!
//! Every section and key is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::inference::InferenceConfig;
use crate::staging::StageConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub inference: InferenceConfig,
    pub staging: StageConfig,
}

impl SynthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }

    pub fn with_staging(mut self, staging: StageConfig) -> Self {
        self.staging = staging;
        self
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, LoadError> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(SynthConfig::from_str("").unwrap(), SynthConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = SynthConfig::from_str(
            r#"
[inference]
bound = 3

[staging]
cycle_radius = 80.0
"#,
        )
        .unwrap();
        assert_eq!(config.inference.bound, 3);
        assert!((config.inference.threshold - 0.9).abs() < 0.001);
        assert_eq!(config.staging.cycle_radius, 80.0);
        assert_eq!(config.staging.default_separation, 100.0);
    }

    #[test]
    fn test_invalid_toml() {
        let result = SynthConfig::from_str("[inference\nbound = 3");
        assert!(matches!(result, Err(LoadError::Toml(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = SynthConfig::from_file(Path::new("/nonexistent/synth.toml"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }
}
