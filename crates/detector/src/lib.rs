//! Violation Detector
//!
//! Converts a per-frame measurement stream into debounced violation events:
//! - Head movement (yaw, pitch, roll)
//! - Eye gaze deviation
//! - Face missing
//! - Multiple faces
//!
//! Each signal runs its own Idle/Active state machine over the same frame
//! clock. Excursions shorter than the category's minimum duration are noise
//! and never reported.

pub mod analysis;
pub mod config;
pub mod state;

pub use analysis::{Direction, PerCategory, Signal, ViolationCategory, ViolationEvent};
pub use config::DetectorConfig;
pub use state::{Reading, SignalMachine, SignalState};

use calibration::ActiveThresholds;
use measurement::{Measurement, StreamValidator, ValidationError};
use thiserror::Error;
use tracing::{debug, info};

/// Detector error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    #[error("Data integrity error: {0}")]
    Integrity(#[from] ValidationError),

    /// Minimum event duration must be finite and non-negative
    #[error("Minimum duration for {category} must be finite and non-negative, got {value}")]
    InvalidFloor { category: &'static str, value: f64 },
}

/// Violation detector for one session
#[derive(Debug, Clone)]
pub struct ViolationDetector {
    machines: Vec<SignalMachine>,
    validator: StreamValidator,
    events: Vec<ViolationEvent>,
    frames: u64,
    last_timestamp: Option<f64>,
}

impl ViolationDetector {
    /// Create a detector bound to the session's thresholds
    pub fn new(config: &DetectorConfig, thresholds: &ActiveThresholds) -> Self {
        Self::with_validator(config, thresholds, StreamValidator::new(config.validation.clone()))
    }

    /// Create a detector that continues an already validated stream.
    ///
    /// The validator keeps its clock, so ordering is enforced across the hand-over.
    pub fn with_validator(
        config: &DetectorConfig,
        thresholds: &ActiveThresholds,
        validator: StreamValidator,
    ) -> Self {
        let floor = |signal: Signal| *config.min_event_duration.get(signal.category());
        let machine = |signal: Signal, threshold: f64| SignalMachine::new(signal, threshold, floor(signal));

        let mut machines = match thresholds {
            ActiveThresholds::Adaptive(t) => vec![
                machine(Signal::Yaw, t.yaw),
                machine(Signal::Pitch, t.pitch),
                machine(Signal::Roll, t.roll),
                machine(Signal::Gaze, t.eye),
            ],
            // Roll is only tracked against a calibrated baseline
            ActiveThresholds::Fixed(t) => vec![
                machine(Signal::Yaw, t.yaw),
                machine(Signal::Pitch, t.pitch),
                machine(Signal::Gaze, t.eye),
            ],
        };
        machines.push(machine(Signal::FaceMissing, 0.0));
        machines.push(machine(Signal::MultipleFaces, 0.0));

        debug!("Detector armed with {} signal machines", machines.len());

        Self {
            machines,
            validator,
            events: Vec::new(),
            frames: 0,
            last_timestamp: None,
        }
    }

    /// Feed the next frame
    pub fn update(&mut self, m: &Measurement) -> Result<(), DetectorError> {
        self.validator.check(m)?;

        for machine in &mut self.machines {
            let reading = machine.read(m);
            if let Some(event) = machine.step(m.timestamp, reading) {
                debug!(
                    "{} event at {:.3}s lasting {:.3}s",
                    event.category.as_str(),
                    event.start_timestamp,
                    event.duration
                );
                self.events.push(event);
            }
        }

        self.frames += 1;
        self.last_timestamp = Some(m.timestamp);
        Ok(())
    }

    /// Run a whole stream through a fresh detector and flush it
    pub fn process<'a, I>(mut self, frames: I) -> Result<Vec<ViolationEvent>, DetectorError>
    where
        I: IntoIterator<Item = &'a Measurement>,
    {
        for m in frames {
            self.update(m)?;
        }
        Ok(self.finish())
    }

    /// End of stream: close open excursions at the last seen timestamp
    pub fn finish(mut self) -> Vec<ViolationEvent> {
        if let Some(end) = self.last_timestamp {
            for machine in &mut self.machines {
                if let Some(event) = machine.close(end) {
                    self.events.push(event);
                }
            }
        }

        info!(
            "Detector finished: {} events from {} frames",
            self.events.len(),
            self.frames
        );
        Self::sorted(self.events)
    }

    /// Stop without flushing; excursions still in progress are dropped
    pub fn abandon(self) -> Vec<ViolationEvent> {
        let open = self
            .machines
            .iter()
            .filter(|m| m.state() != SignalState::Idle)
            .count();
        debug!("Detector abandoned with {} open excursions", open);
        Self::sorted(self.events)
    }

    /// Frames run through the signal machines
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// Stream integrity state, including frames validated before hand-over
    pub fn validator(&self) -> &StreamValidator {
        &self.validator
    }

    /// Signals this detector tracks
    pub fn signals(&self) -> impl Iterator<Item = Signal> + '_ {
        self.machines.iter().map(SignalMachine::signal)
    }

    fn sorted(mut events: Vec<ViolationEvent>) -> Vec<ViolationEvent> {
        events.sort_by(|a, b| a.start_timestamp.total_cmp(&b.start_timestamp));
        events
    }
}
