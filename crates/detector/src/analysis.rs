//! Violation events and categories

use serde::{Deserialize, Serialize};

/// Violation categories reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCategory {
    /// Head turned or tilted away (yaw, pitch, roll)
    HeadMovement,

    /// Eyes looking away from the screen
    EyeGaze,

    /// No face in frame
    FaceMissing,

    /// More than one person in frame
    MultipleFaces,
}

impl ViolationCategory {
    pub const ALL: [ViolationCategory; 4] = [
        ViolationCategory::HeadMovement,
        ViolationCategory::EyeGaze,
        ViolationCategory::FaceMissing,
        ViolationCategory::MultipleFaces,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCategory::HeadMovement => "head_movement",
            ViolationCategory::EyeGaze => "eye_gaze",
            ViolationCategory::FaceMissing => "face_missing",
            ViolationCategory::MultipleFaces => "multiple_faces",
        }
    }
}

/// Direction of a deviation, fixed when the excursion starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    #[default]
    None,
}

/// A tracked behavioural signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Yaw,
    Pitch,
    Roll,
    Gaze,
    FaceMissing,
    MultipleFaces,
}

impl Signal {
    pub fn category(&self) -> ViolationCategory {
        match self {
            Signal::Yaw | Signal::Pitch | Signal::Roll => ViolationCategory::HeadMovement,
            Signal::Gaze => ViolationCategory::EyeGaze,
            Signal::FaceMissing => ViolationCategory::FaceMissing,
            Signal::MultipleFaces => ViolationCategory::MultipleFaces,
        }
    }

    /// Direction implied by the sign of an angle on this signal
    pub fn direction_of(&self, value: f64) -> Direction {
        match self {
            Signal::Yaw | Signal::Roll | Signal::Gaze => {
                if value < 0.0 {
                    Direction::Left
                } else {
                    Direction::Right
                }
            }
            Signal::Pitch => {
                if value < 0.0 {
                    Direction::Up
                } else {
                    Direction::Down
                }
            }
            Signal::FaceMissing | Signal::MultipleFaces => Direction::None,
        }
    }
}

/// One value per violation category
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerCategory<T> {
    pub head_movement: T,
    pub eye_gaze: T,
    pub face_missing: T,
    pub multiple_faces: T,
}

impl<T> PerCategory<T> {
    pub fn get(&self, category: ViolationCategory) -> &T {
        match category {
            ViolationCategory::HeadMovement => &self.head_movement,
            ViolationCategory::EyeGaze => &self.eye_gaze,
            ViolationCategory::FaceMissing => &self.face_missing,
            ViolationCategory::MultipleFaces => &self.multiple_faces,
        }
    }

    pub fn get_mut(&mut self, category: ViolationCategory) -> &mut T {
        match category {
            ViolationCategory::HeadMovement => &mut self.head_movement,
            ViolationCategory::EyeGaze => &mut self.eye_gaze,
            ViolationCategory::FaceMissing => &mut self.face_missing,
            ViolationCategory::MultipleFaces => &mut self.multiple_faces,
        }
    }
}

/// A debounced violation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViolationEvent {
    pub category: ViolationCategory,
    /// Signal whose excursion produced the event
    pub signal: Signal,
    /// Seconds since session start when the threshold was first exceeded
    pub start_timestamp: f64,
    /// Seconds the excursion lasted
    pub duration: f64,
    pub direction: Direction,
    /// Peak magnitude in degrees (0 for face-presence events)
    pub intensity: f64,
}

impl ViolationEvent {
    pub fn end_timestamp(&self) -> f64 {
        self.start_timestamp + self.duration
    }
}
