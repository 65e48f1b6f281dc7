//! Calibration configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Calibration configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationConfigError {
    /// Parameter must be a positive finite number
    #[error("{field} must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    /// Parameter must be a finite number that is zero or more
    #[error("{field} must be finite and non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    /// Threshold band is empty or not finite
    #[error("{signal} threshold band [{min}, {max}] is invalid")]
    InvalidBand { signal: &'static str, min: f64, max: f64 },
}

/// One value per baseline signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerSignal<T> {
    pub yaw: T,
    pub pitch: T,
    pub roll: T,
    pub eye: T,
}

impl<T> PerSignal<T> {
    /// Values paired with their signal names, in check order
    pub fn named(&self) -> [(&'static str, &T); 4] {
        [("yaw", &self.yaw), ("pitch", &self.pitch), ("roll", &self.roll), ("eye", &self.eye)]
    }
}

/// How an adaptive threshold is derived from a baseline signal:
/// `mean_abs_deviation * multiplier + margin`, clamped to `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub multiplier: f64,
    pub margin: f64,
    pub min: f64,
    pub max: f64,
}

impl ThresholdRule {
    /// Apply the rule to a baseline mean absolute deviation
    pub fn derive(&self, mean_abs_deviation: f64) -> f64 {
        (mean_abs_deviation * self.multiplier + self.margin).clamp(self.min, self.max)
    }

    fn validate(&self, signal: &'static str) -> Result<(), CalibrationConfigError> {
        if !(self.min.is_finite() && self.max.is_finite() && self.min <= self.max) {
            return Err(CalibrationConfigError::InvalidBand {
                signal,
                min: self.min,
                max: self.max,
            });
        }
        for (field, value) in [("multiplier", self.multiplier), ("margin", self.margin)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CalibrationConfigError::Negative { field, value });
            }
        }
        Ok(())
    }
}

/// Calibration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Run calibration at all; when false the session uses fixed thresholds
    pub enabled: bool,

    /// Length of the calibration window (seconds from the first frame)
    pub duration_sec: f64,

    /// Minimum accepted frames for a successful calibration
    pub min_frames: usize,

    /// Frames with any |angle| above its guard are not neutral and are rejected (degrees)
    pub stability_guard: PerSignal<f64>,

    /// Maximum baseline variance per signal (degrees squared)
    pub variance_ceiling: PerSignal<f64>,

    /// Adaptive threshold derivation per signal
    pub rules: PerSignal<ThresholdRule>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        // Floors match the fixed thresholds so a calm baseline is never stricter
        let head = ThresholdRule {
            multiplier: 2.5,
            margin: 10.0,
            min: 12.5,
            max: 30.0,
        };
        Self {
            enabled: true,
            duration_sec: 8.0,
            min_frames: 80,
            stability_guard: PerSignal {
                yaw: 20.0,
                pitch: 15.0,
                roll: 12.0,
                eye: 10.0,
            },
            variance_ceiling: PerSignal {
                yaw: 25.0,
                pitch: 25.0,
                roll: 25.0,
                eye: 25.0,
            },
            rules: PerSignal {
                yaw: head,
                pitch: head,
                roll: ThresholdRule {
                    multiplier: 2.5,
                    margin: 12.0,
                    min: 10.0,
                    max: 30.0,
                },
                eye: ThresholdRule {
                    multiplier: 2.2,
                    margin: 12.0,
                    min: 14.3,
                    max: 25.0,
                },
            },
        }
    }
}

impl CalibrationConfig {
    /// Calibration turned off; every session runs on fixed thresholds
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), CalibrationConfigError> {
        if !(self.duration_sec.is_finite() && self.duration_sec > 0.0) {
            return Err(CalibrationConfigError::NonPositive {
                field: "duration_sec",
                value: self.duration_sec,
            });
        }

        let limits = self
            .stability_guard
            .named()
            .into_iter()
            .chain(self.variance_ceiling.named());
        for (signal, &value) in limits {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CalibrationConfigError::Negative { field: signal, value });
            }
        }

        for (signal, rule) in self.rules.named() {
            rule.validate(signal)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_clamps_low() {
        let rule = ThresholdRule {
            multiplier: 2.0,
            margin: 0.0,
            min: 8.0,
            max: 30.0,
        };
        assert_eq!(rule.derive(0.1), 8.0);
    }

    #[test]
    fn test_rule_clamps_high() {
        let rule = CalibrationConfig::default().rules.yaw;
        assert_eq!(rule.derive(100.0), 30.0);
    }

    #[test]
    fn test_rule_linear_inside_band() {
        let rule = CalibrationConfig::default().rules.yaw;
        assert!((rule.derive(1.0) - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_calm_baseline_never_stricter_than_fixed() {
        let rules = CalibrationConfig::default().rules;
        assert_eq!(rules.yaw.derive(0.0), 12.5);
        assert_eq!(rules.pitch.derive(0.0), 12.5);
        assert_eq!(rules.eye.derive(0.0), 14.3);
    }

    #[test]
    fn test_default_is_valid() {
        assert!(CalibrationConfig::default().validate().is_ok());
        assert!(CalibrationConfig::disabled().validate().is_ok());
    }

    #[test]
    fn test_inverted_band_rejected() {
        let mut config = CalibrationConfig::default();
        config.rules.yaw.min = 30.0;
        config.rules.yaw.max = 8.0;
        assert_eq!(
            config.validate(),
            Err(CalibrationConfigError::InvalidBand {
                signal: "yaw",
                min: 30.0,
                max: 8.0
            })
        );
    }

    #[test]
    fn test_nan_band_rejected() {
        let mut config = CalibrationConfig::default();
        config.rules.eye.max = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(CalibrationConfigError::InvalidBand { signal: "eye", .. })
        ));
    }

    #[test]
    fn test_window_and_limits_checked() {
        let mut config = CalibrationConfig::default();
        config.duration_sec = 0.0;
        assert!(matches!(
            config.validate(),
            Err(CalibrationConfigError::NonPositive { field: "duration_sec", .. })
        ));

        let mut config = CalibrationConfig::default();
        config.variance_ceiling.roll = -1.0;
        assert_eq!(
            config.validate(),
            Err(CalibrationConfigError::Negative {
                field: "roll",
                value: -1.0
            })
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CalibrationConfig = serde_json::from_str(r#"{"enabled": false}"#).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.min_frames, 80);
        assert_eq!(config.duration_sec, 8.0);
    }
}
