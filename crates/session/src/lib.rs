//! Session Orchestrator
//!
//! Runs one recorded session end to end:
//! - Validates every frame
//! - Calibrates on the opening window (unless disabled)
//! - Detects violations over the rest of the stream
//! - Scores the events and assembles the report
//!
//! The orchestrator holds configuration only, so one instance can serve
//! many sessions in parallel.

mod config;
mod report;

#[cfg(test)]
mod scenarios;

pub use config::SessionConfig;
pub use report::{format_timestamp, EventRecord, ProcessingMetadata, SessionReport};

use std::time::Instant;

use calibration::{CalibrationConfigError, CalibrationEngine};
use detector::{DetectorError, ViolationDetector};
use measurement::{Measurement, StreamValidator, ValidationError};
use scoring::{ScoringEngine, ScoringError};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Session error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Session contains no measurements")]
    NoData,

    #[error("Stream ended inside the calibration window ({calibration_frames} frames); nothing was analysed")]
    NoAnalysableFrames { calibration_frames: u64 },

    #[error("Calibration configuration error: {0}")]
    Calibration(#[from] CalibrationConfigError),

    #[error("Data integrity error: {0}")]
    Integrity(#[from] ValidationError),

    #[error("Detector error: {0}")]
    Detector(DetectorError),

    #[error("Scoring configuration error: {0}")]
    Scoring(#[from] ScoringError),
}

impl From<DetectorError> for SessionError {
    fn from(err: DetectorError) -> Self {
        match err {
            DetectorError::Integrity(e) => SessionError::Integrity(e),
            other => SessionError::Detector(other),
        }
    }
}

/// Session orchestrator
#[derive(Debug, Clone)]
pub struct SessionOrchestrator {
    config: SessionConfig,
    calibration: CalibrationEngine,
    scoring: ScoringEngine,
}

impl SessionOrchestrator {
    /// Create an orchestrator; rejects unusable configurations
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        config.calibration.validate()?;
        config.detector.validate()?;
        let scoring = ScoringEngine::new(config.scoring.clone())?;
        let calibration = CalibrationEngine::new(config.calibration.clone(), config.fixed_thresholds);
        Ok(Self {
            config,
            calibration,
            scoring,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run a full session over an ordered measurement stream
    pub fn run<I>(&self, session_id: Option<String>, frames: I) -> Result<SessionReport, SessionError>
    where
        I: IntoIterator<Item = Measurement>,
    {
        let started = Instant::now();
        let session_id = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut frames = frames.into_iter().peekable();
        if frames.peek().is_none() {
            warn!("Session {} has no measurements", session_id);
            return Err(SessionError::NoData);
        }

        info!("Session {} started", session_id);

        // Validation is owned here during calibration, then by the detector
        let mut validator = StreamValidator::new(self.config.validation.clone());
        let calibration = if self.calibration.is_enabled() {
            let mut collector = self.calibration.collector();
            while let Some(m) = frames.next_if(|m| !collector.is_past_window(m)) {
                validator.check(&m)?;
                collector.offer(&m);
            }
            collector.finish()
        } else {
            self.calibration.skipped()
        };

        let mut detector = ViolationDetector::with_validator(
            &self.config.detector,
            &calibration.active_thresholds,
            validator,
        );
        for m in frames {
            detector.update(&m)?;
        }

        let frames_received = detector.validator().frames_checked();
        let frames_analyzed = detector.frames_processed();
        let session_duration = detector.validator().last_timestamp().unwrap_or(0.0);
        let calibration_frames = calibration.frames_consumed as u64;
        if frames_analyzed == 0 {
            warn!(
                "Session {} ended inside the calibration window after {} frames",
                session_id, calibration_frames
            );
            return Err(SessionError::NoAnalysableFrames { calibration_frames });
        }

        let events = detector.finish();
        let score = self.scoring.score(&events, session_duration);

        let metadata = ProcessingMetadata {
            frames_received,
            calibration_frames,
            frames_analyzed,
            session_duration_sec: session_duration,
            processing_time_sec: started.elapsed().as_secs_f64(),
        };
        debug!("Session {} metadata: {:?}", session_id, metadata);

        info!(
            "Session {} complete | calibration={:?} events={} score={:.3} risk={:?}",
            session_id,
            calibration.status,
            events.len(),
            score.confidence_score,
            score.risk_classification
        );

        Ok(SessionReport {
            session_id,
            calibration_status: calibration.status,
            failure_reason: calibration.failure_reason,
            active_thresholds: calibration.active_thresholds,
            baseline_metrics: calibration.baseline_metrics,
            events: events.iter().map(EventRecord::from).collect(),
            alert_counts: score.alert_counts,
            confidence_score: score.confidence_score,
            risk_classification: score.risk_classification,
            category_scores: score.category_scores,
            alerts: score.alerts,
            high_activity_periods: score.high_activity_periods,
            metadata,
        })
    }
}
