//! Detector configuration

use measurement::ValidationConfig;
use serde::{Deserialize, Serialize};

use crate::analysis::{PerCategory, ViolationCategory};
use crate::DetectorError;

/// Detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Minimum excursion length before it counts as a violation (seconds)
    pub min_event_duration: PerCategory<f64>,

    /// Stream integrity checks
    pub validation: ValidationConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_event_duration: PerCategory {
                head_movement: 4.0,
                eye_gaze: 7.0,
                face_missing: 1.0,
                multiple_faces: 1.0,
            },
            validation: ValidationConfig::default(),
        }
    }
}

impl DetectorConfig {
    /// Create strict config (shorter debounce floors)
    pub fn strict() -> Self {
        Self {
            min_event_duration: PerCategory {
                head_movement: 2.0,
                eye_gaze: 4.0,
                face_missing: 0.5,
                multiple_faces: 0.5,
            },
            ..Default::default()
        }
    }

    /// Check every debounce floor is a usable duration
    pub fn validate(&self) -> Result<(), DetectorError> {
        for category in ViolationCategory::ALL {
            let value = *self.min_event_duration.get(category);
            if !(value.is_finite() && value >= 0.0) {
                return Err(DetectorError::InvalidFloor {
                    category: category.as_str(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// Create lenient config (longer debounce floors)
    pub fn lenient() -> Self {
        Self {
            min_event_duration: PerCategory {
                head_movement: 6.0,
                eye_gaze: 10.0,
                face_missing: 3.0,
                multiple_faces: 2.0,
            },
            ..Default::default()
        }
    }
}
