//! Frame Measurements
//!
//! The per-frame tuple produced by the upstream pose/gaze inference, plus
//! integrity validation for the ordered measurement stream.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{StreamValidator, ValidationConfig};

use serde::{Deserialize, Serialize};

/// One sampled frame of head pose and gaze output
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Measurement {
    /// Seconds since session start
    pub timestamp: f64,
    /// Head yaw in degrees (negative = left)
    pub yaw: f64,
    /// Head pitch in degrees (negative = up)
    pub pitch: f64,
    /// Head roll in degrees
    pub roll: f64,
    /// Signed gaze deviation in degrees (negative = left)
    pub gaze_angle: f64,
    /// Number of faces detected in the frame
    pub face_count: u32,
}

impl Measurement {
    /// Frame with a single, centred face at the given time
    pub fn neutral(timestamp: f64) -> Self {
        Self {
            timestamp,
            face_count: 1,
            ..Default::default()
        }
    }

    /// Exactly one face visible
    pub fn has_single_face(&self) -> bool {
        self.face_count == 1
    }

    /// At least one face visible, so pose angles are meaningful
    pub fn has_face(&self) -> bool {
        self.face_count > 0
    }
}
