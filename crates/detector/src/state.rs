//! Per-signal debounce state machines

use measurement::Measurement;
use tracing::debug;

use crate::analysis::{Direction, Signal, ViolationEvent};

/// How a signal reads on one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Signal is past its threshold
    pub exceeded: bool,
    /// Absolute deviation (degrees), 0 for face-presence signals
    pub magnitude: f64,
    pub direction: Direction,
}

impl Reading {
    /// Read an angle signal against its threshold
    pub fn angle(signal: Signal, value: f64, threshold: f64) -> Self {
        let magnitude = value.abs();
        Self {
            exceeded: magnitude > threshold,
            magnitude,
            direction: signal.direction_of(value),
        }
    }

    /// Read a face-presence condition
    pub fn presence(exceeded: bool) -> Self {
        Self {
            exceeded,
            magnitude: 0.0,
            direction: Direction::None,
        }
    }
}

/// Debounce state of one signal
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SignalState {
    #[default]
    Idle,
    Active {
        start: f64,
        peak: f64,
        direction: Direction,
    },
}

/// Idle/Active state machine for one tracked signal
#[derive(Debug, Clone)]
pub struct SignalMachine {
    signal: Signal,
    /// Angle threshold in degrees; unused by face-presence signals
    threshold: f64,
    min_duration: f64,
    state: SignalState,
}

impl SignalMachine {
    pub fn new(signal: Signal, threshold: f64, min_duration: f64) -> Self {
        Self {
            signal,
            threshold,
            min_duration,
            state: SignalState::Idle,
        }
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn state(&self) -> SignalState {
        self.state
    }

    /// Evaluate this signal on a frame
    pub fn read(&self, m: &Measurement) -> Reading {
        // Pose angles are meaningless without a face
        let angle = |value: f64| {
            if m.has_face() {
                Reading::angle(self.signal, value, self.threshold)
            } else {
                Reading::presence(false)
            }
        };

        match self.signal {
            Signal::Yaw => angle(m.yaw),
            Signal::Pitch => angle(m.pitch),
            Signal::Roll => angle(m.roll),
            Signal::Gaze => angle(m.gaze_angle),
            Signal::FaceMissing => Reading::presence(m.face_count == 0),
            Signal::MultipleFaces => Reading::presence(m.face_count > 1),
        }
    }

    /// Advance one frame; returns an event when an excursion closes past the floor
    pub fn step(&mut self, timestamp: f64, reading: Reading) -> Option<ViolationEvent> {
        match (self.state, reading.exceeded) {
            (SignalState::Idle, true) => {
                self.state = SignalState::Active {
                    start: timestamp,
                    peak: reading.magnitude,
                    direction: reading.direction,
                };
                None
            }
            (SignalState::Active { start, peak, direction }, true) => {
                self.state = SignalState::Active {
                    start,
                    peak: peak.max(reading.magnitude),
                    direction,
                };
                None
            }
            (SignalState::Active { .. }, false) => self.close(timestamp),
            (SignalState::Idle, false) => None,
        }
    }

    /// Close any open excursion at the given end boundary
    pub fn close(&mut self, end: f64) -> Option<ViolationEvent> {
        let SignalState::Active { start, peak, direction } = std::mem::take(&mut self.state) else {
            return None;
        };

        let duration = end - start;
        if duration < self.min_duration {
            debug!(
                "Discarded {:?} excursion of {:.3}s (floor {:.3}s)",
                self.signal, duration, self.min_duration
            );
            return None;
        }

        Some(ViolationEvent {
            category: self.signal.category(),
            signal: self.signal,
            start_timestamp: start,
            duration,
            direction,
            intensity: peak,
        })
    }
}
