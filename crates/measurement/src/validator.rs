//! Stream Validator for Integrity Checking

use crate::error::ValidationError;
use crate::Measurement;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Valid range for yaw, pitch and roll (degrees)
    pub angle_range: (f64, f64),
    /// Valid range for the gaze deviation angle (degrees)
    pub gaze_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            angle_range: (-180.0, 180.0),
            gaze_range: (-90.0, 90.0),
        }
    }
}

/// Validator for an ordered measurement stream.
///
/// Tracks the last accepted timestamp, so one instance must be used per
/// session. Equal consecutive timestamps are accepted.
#[derive(Debug, Clone)]
pub struct StreamValidator {
    config: ValidationConfig,
    last_timestamp: Option<f64>,
    frames_checked: u64,
}

impl StreamValidator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            last_timestamp: None,
            frames_checked: 0,
        }
    }

    /// Validate the next frame of the stream
    pub fn check(&mut self, m: &Measurement) -> Result<(), ValidationError> {
        let frame = self.frames_checked;

        if let Err(e) = self.check_frame(m, frame) {
            warn!("Rejected frame {}: {}", frame, e);
            return Err(e);
        }

        if let Some(previous) = self.last_timestamp {
            if m.timestamp < previous {
                warn!("Timestamp regression at frame {}: {} -> {}", frame, previous, m.timestamp);
                return Err(ValidationError::TimestampRegression {
                    previous,
                    current: m.timestamp,
                    frame,
                });
            }
        }

        self.last_timestamp = Some(m.timestamp);
        self.frames_checked += 1;
        Ok(())
    }

    /// Validate a single frame in isolation (no ordering check)
    pub fn check_frame(&self, m: &Measurement, frame: u64) -> Result<(), ValidationError> {
        let fields = [
            ("timestamp", m.timestamp),
            ("yaw", m.yaw),
            ("pitch", m.pitch),
            ("roll", m.roll),
            ("gaze_angle", m.gaze_angle),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field, frame });
            }
        }

        Self::validate_range("timestamp", m.timestamp, (0.0, f64::MAX), frame)?;
        Self::validate_range("yaw", m.yaw, self.config.angle_range, frame)?;
        Self::validate_range("pitch", m.pitch, self.config.angle_range, frame)?;
        Self::validate_range("roll", m.roll, self.config.angle_range, frame)?;
        Self::validate_range("gaze_angle", m.gaze_angle, self.config.gaze_range, frame)?;
        Ok(())
    }

    fn validate_range(
        field: &'static str,
        value: f64,
        range: (f64, f64),
        frame: u64,
    ) -> Result<(), ValidationError> {
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
                frame,
            })
        } else {
            Ok(())
        }
    }

    /// Last accepted timestamp, if any frame was accepted
    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    /// Number of frames accepted so far
    pub fn frames_checked(&self) -> u64 {
        self.frames_checked
    }
}

impl Default for StreamValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
