//! Scoring configuration

use detector::{PerCategory, ViolationCategory};
use serde::{Deserialize, Serialize};

use crate::ScoringError;

/// Lower bounds of the risk tiers; each tier is `[lower, next_lower)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskBands {
    pub borderline: f64,
    pub suspicious: f64,
    pub high_risk: f64,
}

impl Default for RiskBands {
    fn default() -> Self {
        Self {
            borderline: 0.20,
            suspicious: 0.40,
            high_risk: 0.65,
        }
    }
}

/// Sliding-window density analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporalConfig {
    /// Window width (seconds)
    pub window_sec: f64,
    /// Window step (seconds)
    pub step_sec: f64,
    /// Windows above this many events per second are high-activity
    pub density_threshold: f64,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            window_sec: 150.0,
            step_sec: 30.0,
            density_threshold: 0.02,
        }
    }
}

/// Event counts at which a category alert escalates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityConfig {
    pub suspicious_count: usize,
    pub high_risk_count: usize,
}

impl Default for SeverityConfig {
    fn default() -> Self {
        Self {
            suspicious_count: 1,
            high_risk_count: 3,
        }
    }
}

/// Scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Contribution of one event per category
    pub weights: PerCategory<f64>,

    /// Weighted event total at which the score reaches ~63%
    pub saturation: f64,

    pub risk_bands: RiskBands,

    pub temporal: TemporalConfig,

    pub severity: SeverityConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: PerCategory {
                head_movement: 0.6,
                eye_gaze: 1.1,
                face_missing: 4.0,
                multiple_faces: 6.0,
            },
            saturation: 10.0,
            risk_bands: RiskBands::default(),
            temporal: TemporalConfig::default(),
            severity: SeverityConfig::default(),
        }
    }
}

impl ScoringConfig {
    /// Create strict config (score saturates faster)
    pub fn strict() -> Self {
        Self {
            saturation: 6.0,
            ..Default::default()
        }
    }

    /// Create lenient config (score saturates slower)
    pub fn lenient() -> Self {
        Self {
            saturation: 16.0,
            ..Default::default()
        }
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ScoringError> {
        let RiskBands {
            borderline,
            suspicious,
            high_risk,
        } = self.risk_bands;
        let ascending = 0.0 < borderline && borderline < suspicious && suspicious < high_risk;
        if !ascending || high_risk > 1.0 {
            return Err(ScoringError::InvalidBands {
                borderline,
                suspicious,
                high_risk,
            });
        }

        let positive = [
            ("saturation", self.saturation),
            ("temporal.window_sec", self.temporal.window_sec),
            ("temporal.step_sec", self.temporal.step_sec),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ScoringError::NonPositive { field, value });
            }
        }
        if !(self.temporal.density_threshold.is_finite() && self.temporal.density_threshold >= 0.0) {
            return Err(ScoringError::NonPositive {
                field: "temporal.density_threshold",
                value: self.temporal.density_threshold,
            });
        }

        for category in ViolationCategory::ALL {
            let value = *self.weights.get(category);
            if !(value.is_finite() && value >= 0.0) {
                return Err(ScoringError::InvalidWeight {
                    category: category.as_str(),
                    value,
                });
            }
        }

        Ok(())
    }
}
