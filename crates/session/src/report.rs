//! Session report assembly

use calibration::{ActiveThresholds, BaselineMetrics, CalibrationStatus, FailureReason};
use detector::{Direction, PerCategory, ViolationCategory, ViolationEvent};
use scoring::{CategoryAlert, HighActivityPeriod, RiskLevel};
use serde::{Deserialize, Serialize};

/// Render seconds as `MM:SS:mmm`
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    format!(
        "{:02}:{:02}:{:03}",
        total_ms / 60_000,
        (total_ms / 1000) % 60,
        total_ms % 1000
    )
}

/// A violation as presented to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub category: ViolationCategory,
    /// Start time as `MM:SS:mmm`
    pub timestamp: String,
    pub start_seconds: f64,
    pub duration: f64,
    pub direction: Direction,
    pub intensity: f64,
}

impl From<&ViolationEvent> for EventRecord {
    fn from(event: &ViolationEvent) -> Self {
        Self {
            category: event.category,
            timestamp: format_timestamp(event.start_timestamp),
            start_seconds: event.start_timestamp,
            duration: event.duration,
            direction: event.direction,
            intensity: event.intensity,
        }
    }
}

/// Processing statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    pub frames_received: u64,
    /// Frames taken by the calibration window
    pub calibration_frames: u64,
    /// Frames run through the detector
    pub frames_analyzed: u64,
    pub session_duration_sec: f64,
    /// Wall-clock time spent in the run
    pub processing_time_sec: f64,
}

/// Final output of one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: String,
    pub calibration_status: CalibrationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<FailureReason>,
    pub active_thresholds: ActiveThresholds,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_metrics: Option<BaselineMetrics>,
    pub events: Vec<EventRecord>,
    pub alert_counts: PerCategory<usize>,
    pub confidence_score: f64,
    pub risk_classification: RiskLevel,
    pub category_scores: PerCategory<f64>,
    pub alerts: Vec<CategoryAlert>,
    pub high_activity_periods: Vec<HighActivityPeriod>,
    pub metadata: ProcessingMetadata,
}
