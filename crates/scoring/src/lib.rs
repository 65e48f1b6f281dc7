//! Scoring Engine
//!
//! Turns a session's violation events into a confidence score, a risk tier,
//! per-category alerts, and high-activity periods.

mod config;
mod engine;
mod temporal;

pub use config::{RiskBands, ScoringConfig, SeverityConfig, TemporalConfig};
pub use engine::{AlertSeverity, CategoryAlert, RiskLevel, ScoreResult, ScoringEngine};
pub use temporal::{high_activity_periods, HighActivityPeriod};

use thiserror::Error;

/// Scoring configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    /// Band boundaries not strictly ascending inside (0, 1]
    #[error("Invalid risk bands: borderline {borderline}, suspicious {suspicious}, high risk {high_risk}")]
    InvalidBands {
        borderline: f64,
        suspicious: f64,
        high_risk: f64,
    },

    /// Parameter must be a positive finite number
    #[error("{field} must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    /// Category weight must be finite and non-negative
    #[error("Weight for {category} must be finite and non-negative, got {value}")]
    InvalidWeight { category: &'static str, value: f64 },
}
