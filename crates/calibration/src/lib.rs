//! Baseline Calibration
//!
//! Derives per-session detection thresholds from the first seconds of a
//! recording:
//! - Rejects frames that are not a neutral resting pose
//! - Validates the accepted baseline (frame count, variance ceiling)
//! - Computes adaptive thresholds, or falls back to fixed ones

pub mod config;
pub mod statistics;
pub mod thresholds;

pub use config::{CalibrationConfig, CalibrationConfigError, PerSignal, ThresholdRule};
pub use statistics::SignalStatistics;
pub use thresholds::{ActiveThresholds, AdaptiveThresholds, FixedThresholds};

use std::fmt;

use measurement::Measurement;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Outcome of the calibration step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalibrationStatus {
    Success,
    Failed,
    Skipped,
}

/// A signal tracked in the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineSignal {
    Yaw,
    Pitch,
    Roll,
    Eye,
}

impl fmt::Display for BaselineSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BaselineSignal::Yaw => "yaw",
            BaselineSignal::Pitch => "pitch",
            BaselineSignal::Roll => "roll",
            BaselineSignal::Eye => "eye",
        };
        f.write_str(name)
    }
}

/// Why a calibration fell back to fixed thresholds
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailureReason {
    #[error("only {accepted} stable frames, {required} required")]
    InsufficientFrames { accepted: usize, required: usize },

    #[error("{signal} variance {variance:.2} exceeds ceiling {ceiling:.2}")]
    VarianceCeiling {
        signal: BaselineSignal,
        variance: f64,
        ceiling: f64,
    },
}

/// Statistics of the accepted baseline frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineMetrics {
    pub yaw: SignalStatistics,
    pub pitch: SignalStatistics,
    pub roll: SignalStatistics,
    pub eye: SignalStatistics,
    pub accepted_frames: usize,
    pub rejected_frames: usize,
    /// Share of window frames with at least one face
    pub face_presence_ratio: f64,
}

/// Result of calibrating one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub status: CalibrationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_metrics: Option<BaselineMetrics>,
    pub active_thresholds: ActiveThresholds,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<FailureReason>,
    /// Frames taken from the stream by the calibration window
    pub frames_consumed: usize,
}

/// What the collector did with an offered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Frame is part of the baseline
    Accepted,
    /// Frame is inside the window but not a neutral pose
    Rejected,
    /// Frame lies past the calibration window and was not consumed
    WindowClosed,
}

/// Calibration engine
#[derive(Debug, Clone)]
pub struct CalibrationEngine {
    config: CalibrationConfig,
    fixed: FixedThresholds,
}

impl CalibrationEngine {
    /// Create a calibration engine with the fallback thresholds it should use
    pub fn new(config: CalibrationConfig, fixed: FixedThresholds) -> Self {
        Self { config, fixed }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Result for a session that does not calibrate
    pub fn skipped(&self) -> CalibrationResult {
        info!("Calibration disabled - using fixed thresholds");
        CalibrationResult {
            status: CalibrationStatus::Skipped,
            baseline_metrics: None,
            active_thresholds: self.fixed.into(),
            failure_reason: None,
            frames_consumed: 0,
        }
    }

    /// Start collecting a baseline from a live stream
    pub fn collector(&self) -> BaselineCollector<'_> {
        BaselineCollector {
            engine: self,
            window_end: None,
            yaw: Vec::new(),
            pitch: Vec::new(),
            roll: Vec::new(),
            eye: Vec::new(),
            rejected: 0,
            with_face: 0,
        }
    }

    /// Calibrate from a recorded stream prefix.
    ///
    /// Only frames inside the window are consumed; anything after it is ignored.
    pub fn calibrate(&self, frames: &[Measurement]) -> CalibrationResult {
        if !self.is_enabled() {
            return self.skipped();
        }

        let mut collector = self.collector();
        for m in frames {
            if collector.offer(m) == Admission::WindowClosed {
                break;
            }
        }
        collector.finish()
    }

    fn is_neutral(&self, m: &Measurement) -> bool {
        let guard = &self.config.stability_guard;
        m.has_single_face()
            && m.yaw.abs() <= guard.yaw
            && m.pitch.abs() <= guard.pitch
            && m.roll.abs() <= guard.roll
            && m.gaze_angle.abs() <= guard.eye
    }

    fn failed(
        &self,
        reason: FailureReason,
        metrics: Option<BaselineMetrics>,
        frames_consumed: usize,
    ) -> CalibrationResult {
        warn!("Calibration failed: {} - using fixed thresholds", reason);
        CalibrationResult {
            status: CalibrationStatus::Failed,
            baseline_metrics: metrics,
            active_thresholds: self.fixed.into(),
            failure_reason: Some(reason),
            frames_consumed,
        }
    }
}

impl Default for CalibrationEngine {
    fn default() -> Self {
        Self::new(CalibrationConfig::default(), FixedThresholds::default())
    }
}

/// Incremental baseline builder.
///
/// Keeps only the angle values of accepted frames; rejected frames are counted
/// and dropped.
#[derive(Debug)]
pub struct BaselineCollector<'a> {
    engine: &'a CalibrationEngine,
    window_end: Option<f64>,
    yaw: Vec<f64>,
    pitch: Vec<f64>,
    roll: Vec<f64>,
    eye: Vec<f64>,
    rejected: usize,
    with_face: usize,
}

impl BaselineCollector<'_> {
    /// Whether a frame lies past the window; false until the window opens
    pub fn is_past_window(&self, m: &Measurement) -> bool {
        self.window_end.is_some_and(|end| m.timestamp >= end)
    }

    /// Offer the next frame of the stream to the baseline
    pub fn offer(&mut self, m: &Measurement) -> Admission {
        if self.is_past_window(m) {
            return Admission::WindowClosed;
        }
        if self.window_end.is_none() {
            self.window_end = Some(m.timestamp + self.engine.config.duration_sec);
        }

        if m.has_face() {
            self.with_face += 1;
        }

        if self.engine.is_neutral(m) {
            self.yaw.push(m.yaw);
            self.pitch.push(m.pitch);
            self.roll.push(m.roll);
            self.eye.push(m.gaze_angle);
            Admission::Accepted
        } else {
            self.rejected += 1;
            Admission::Rejected
        }
    }

    /// Frames accepted so far
    pub fn accepted(&self) -> usize {
        self.yaw.len()
    }

    /// Frames consumed so far (accepted and rejected)
    pub fn consumed(&self) -> usize {
        self.yaw.len() + self.rejected
    }

    /// Validate the baseline and select the session thresholds
    pub fn finish(self) -> CalibrationResult {
        let engine = self.engine;
        let config = &engine.config;
        let accepted = self.accepted();
        let consumed = self.consumed();

        debug!("Calibration window closed: {} accepted, {} rejected", accepted, self.rejected);

        let metrics = (accepted > 0).then(|| BaselineMetrics {
            yaw: SignalStatistics::compute(&self.yaw),
            pitch: SignalStatistics::compute(&self.pitch),
            roll: SignalStatistics::compute(&self.roll),
            eye: SignalStatistics::compute(&self.eye),
            accepted_frames: accepted,
            rejected_frames: self.rejected,
            face_presence_ratio: self.with_face as f64 / consumed as f64,
        });

        let Some(metrics) = metrics else {
            return engine.failed(
                FailureReason::InsufficientFrames {
                    accepted,
                    required: config.min_frames,
                },
                None,
                consumed,
            );
        };

        if accepted < config.min_frames {
            return engine.failed(
                FailureReason::InsufficientFrames {
                    accepted,
                    required: config.min_frames,
                },
                Some(metrics),
                consumed,
            );
        }

        let ceiling = &config.variance_ceiling;
        let checks = [
            (BaselineSignal::Yaw, metrics.yaw.variance, ceiling.yaw),
            (BaselineSignal::Pitch, metrics.pitch.variance, ceiling.pitch),
            (BaselineSignal::Roll, metrics.roll.variance, ceiling.roll),
            (BaselineSignal::Eye, metrics.eye.variance, ceiling.eye),
        ];
        if let Some(&(signal, variance, ceiling)) = checks.iter().find(|(_, v, c)| v > c) {
            return engine.failed(
                FailureReason::VarianceCeiling {
                    signal,
                    variance,
                    ceiling,
                },
                Some(metrics),
                consumed,
            );
        }

        let rules = &config.rules;
        let adaptive = AdaptiveThresholds {
            eye: rules.eye.derive(metrics.eye.mean_abs_deviation),
            yaw: rules.yaw.derive(metrics.yaw.mean_abs_deviation),
            pitch: rules.pitch.derive(metrics.pitch.mean_abs_deviation),
            roll: rules.roll.derive(metrics.roll.mean_abs_deviation),
        };

        info!(
            "Calibration SUCCESS | yaw={:.2}° pitch={:.2}° roll={:.2}° eye={:.2}°",
            adaptive.yaw, adaptive.pitch, adaptive.roll, adaptive.eye
        );

        CalibrationResult {
            status: CalibrationStatus::Success,
            baseline_metrics: Some(metrics),
            active_thresholds: adaptive.into(),
            failure_reason: None,
            frames_consumed: consumed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// 12 fps frames with a small deterministic jitter
    fn resting_frames(count: usize, jitter: f64) -> Vec<Measurement> {
        (0..count)
            .map(|i| {
                let s = if i % 2 == 0 { 1.0 } else { -1.0 };
                Measurement {
                    timestamp: i as f64 / 12.0,
                    yaw: s * jitter,
                    pitch: -s * jitter,
                    roll: s * jitter * 0.5,
                    gaze_angle: s * jitter * 0.8,
                    face_count: 1,
                }
            })
            .collect()
    }

    #[test]
    fn test_successful_calibration() {
        let engine = CalibrationEngine::default();
        let result = engine.calibrate(&resting_frames(96, 1.0));

        assert_eq!(result.status, CalibrationStatus::Success);
        assert_eq!(result.frames_consumed, 96);
        match result.active_thresholds {
            ActiveThresholds::Adaptive(t) => {
                // MAD 1.0 * 2.5 + 10
                assert!((t.yaw - 12.5).abs() < 1e-9);
                assert!((t.pitch - 12.5).abs() < 1e-9);
            }
            ActiveThresholds::Fixed(_) => panic!("expected adaptive thresholds"),
        }
        let metrics = result.baseline_metrics.unwrap();
        assert_eq!(metrics.accepted_frames, 96);
        assert_eq!(metrics.face_presence_ratio, 1.0);
    }

    #[test]
    fn test_skipped_when_disabled() {
        let engine = CalibrationEngine::new(CalibrationConfig::disabled(), FixedThresholds::STANDARD);
        let result = engine.calibrate(&resting_frames(96, 1.0));

        assert_eq!(result.status, CalibrationStatus::Skipped);
        assert_eq!(result.frames_consumed, 0);
        assert!(result.baseline_metrics.is_none());
        assert_eq!(result.active_thresholds, ActiveThresholds::Fixed(FixedThresholds::STANDARD));
    }

    #[test]
    fn test_insufficient_frames() {
        let engine = CalibrationEngine::default();
        let result = engine.calibrate(&resting_frames(40, 1.0));

        assert_eq!(result.status, CalibrationStatus::Failed);
        assert_eq!(
            result.failure_reason,
            Some(FailureReason::InsufficientFrames { accepted: 40, required: 80 })
        );
        assert!(!result.active_thresholds.is_adaptive());
        assert!(result.baseline_metrics.is_some());
    }

    #[test]
    fn test_unstable_frames_rejected() {
        let engine = CalibrationEngine::default();
        let mut frames = resting_frames(96, 1.0);
        for m in frames.iter_mut().take(30) {
            m.yaw = 45.0;
        }
        let result = engine.calibrate(&frames);

        let metrics = result.baseline_metrics.as_ref().unwrap();
        assert_eq!(metrics.rejected_frames, 30);
        assert_eq!(metrics.accepted_frames, 66);
        assert_eq!(result.status, CalibrationStatus::Failed);
    }

    #[test]
    fn test_face_loss_rejected() {
        let engine = CalibrationEngine::default();
        let mut frames = resting_frames(96, 1.0);
        frames[0].face_count = 0;
        frames[1].face_count = 2;
        let result = engine.calibrate(&frames);

        let metrics = result.baseline_metrics.unwrap();
        assert_eq!(metrics.rejected_frames, 2);
        assert!((metrics.face_presence_ratio - 95.0 / 96.0).abs() < 1e-9);
        assert_eq!(result.status, CalibrationStatus::Success);
    }

    #[test]
    fn test_variance_ceiling() {
        // Alternating +/-15 degrees stays inside the 20 degree guard but has variance 225
        let engine = CalibrationEngine::default();
        let mut frames = resting_frames(96, 1.0);
        for (i, m) in frames.iter_mut().enumerate() {
            m.yaw = if i % 2 == 0 { 15.0 } else { -15.0 };
        }
        let result = engine.calibrate(&frames);

        assert_eq!(result.status, CalibrationStatus::Failed);
        assert!(matches!(
            result.failure_reason,
            Some(FailureReason::VarianceCeiling { signal: BaselineSignal::Yaw, .. })
        ));
        assert_eq!(result.active_thresholds, ActiveThresholds::Fixed(FixedThresholds::STANDARD));
    }

    #[test]
    fn test_window_stops_consumption() {
        let engine = CalibrationEngine::default();
        // 20 seconds of frames, only 8 seconds (96 frames) belong to the window
        let result = engine.calibrate(&resting_frames(240, 1.0));
        assert_eq!(result.frames_consumed, 96);
    }

    #[test]
    fn test_collector_reports_window_closed() {
        let engine = CalibrationEngine::default();
        let mut collector = engine.collector();
        assert!(!collector.is_past_window(&Measurement::neutral(500.0)));
        assert_eq!(collector.offer(&Measurement::neutral(2.0)), Admission::Accepted);
        assert_eq!(collector.offer(&Measurement::neutral(9.99)), Admission::Accepted);
        assert!(collector.is_past_window(&Measurement::neutral(10.0)));
        assert_eq!(collector.offer(&Measurement::neutral(10.0)), Admission::WindowClosed);
        assert_eq!(collector.consumed(), 2);
    }

    #[test]
    fn test_empty_baseline_fails() {
        let engine = CalibrationEngine::default();
        let result = engine.calibrate(&[]);
        assert_eq!(result.status, CalibrationStatus::Failed);
        assert!(result.baseline_metrics.is_none());
    }

    proptest! {
        #[test]
        fn prop_wider_baseline_never_lowers_threshold(
            jitter in 0.0f64..3.0,
            scale in 1.0f64..1.6,
        ) {
            let config = CalibrationConfig {
                variance_ceiling: PerSignal { yaw: 1e6, pitch: 1e6, roll: 1e6, eye: 1e6 },
                ..Default::default()
            };
            let engine = CalibrationEngine::new(config, FixedThresholds::STANDARD);
            let narrow = engine.calibrate(&resting_frames(96, jitter));
            let wide = engine.calibrate(&resting_frames(96, jitter * scale));

            match (narrow.active_thresholds, wide.active_thresholds) {
                (ActiveThresholds::Adaptive(n), ActiveThresholds::Adaptive(w)) => {
                    prop_assert!(w.yaw >= n.yaw);
                    prop_assert!(w.pitch >= n.pitch);
                    prop_assert!(w.roll >= n.roll);
                    prop_assert!(w.eye >= n.eye);
                }
                _ => prop_assert!(false, "both baselines should calibrate"),
            }
        }
    }
}
