//! Session configuration

use calibration::{CalibrationConfig, FixedThresholds};
use detector::DetectorConfig;
use measurement::ValidationConfig;
use scoring::ScoringConfig;
use serde::{Deserialize, Serialize};

/// Everything one session run needs, injected per session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub calibration: CalibrationConfig,

    /// Fallback thresholds when calibration is skipped or fails
    pub fixed_thresholds: FixedThresholds,

    pub detector: DetectorConfig,

    pub scoring: ScoringConfig,

    /// Integrity checks applied to every incoming frame; takes precedence
    /// over `detector.validation`
    pub validation: ValidationConfig,
}

impl SessionConfig {
    /// Create strict config
    pub fn strict() -> Self {
        Self {
            detector: DetectorConfig::strict(),
            scoring: ScoringConfig::strict(),
            ..Default::default()
        }
    }

    /// Create lenient config
    pub fn lenient() -> Self {
        Self {
            detector: DetectorConfig::lenient(),
            scoring: ScoringConfig::lenient(),
            ..Default::default()
        }
    }
}
