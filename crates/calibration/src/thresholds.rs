//! Detection thresholds selected once per session

use serde::{Deserialize, Serialize};

/// Thresholds derived from the session's own calibration baseline (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveThresholds {
    pub eye: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Industry-standard thresholds used when calibration is skipped or fails (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedThresholds {
    pub eye: f64,
    pub yaw: f64,
    pub pitch: f64,
}

impl FixedThresholds {
    /// Default fallback values
    pub const STANDARD: Self = Self {
        eye: 14.3,
        yaw: 12.5,
        pitch: 12.5,
    };
}

impl Default for FixedThresholds {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// The thresholds in force for a session.
///
/// Built once from the calibration outcome and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActiveThresholds {
    Adaptive(AdaptiveThresholds),
    Fixed(FixedThresholds),
}

impl ActiveThresholds {
    /// Whether the thresholds came from a successful calibration
    pub fn is_adaptive(&self) -> bool {
        matches!(self, ActiveThresholds::Adaptive(_))
    }
}

impl From<FixedThresholds> for ActiveThresholds {
    fn from(fixed: FixedThresholds) -> Self {
        ActiveThresholds::Fixed(fixed)
    }
}

impl From<AdaptiveThresholds> for ActiveThresholds {
    fn from(adaptive: AdaptiveThresholds) -> Self {
        ActiveThresholds::Adaptive(adaptive)
    }
}
