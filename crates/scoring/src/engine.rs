//! Scoring Engine Implementation

use detector::{PerCategory, ViolationCategory, ViolationEvent};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{RiskBands, ScoringConfig};
use crate::temporal::{high_activity_periods, HighActivityPeriod};
use crate::ScoringError;

/// Session risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Clean,
    Borderline,
    Suspicious,
    HighRisk,
}

impl RiskBands {
    /// Map a confidence score to its tier (lower bound inclusive)
    pub fn classify(&self, score: f64) -> RiskLevel {
        if score >= self.high_risk {
            RiskLevel::HighRisk
        } else if score >= self.suspicious {
            RiskLevel::Suspicious
        } else if score >= self.borderline {
            RiskLevel::Borderline
        } else {
            RiskLevel::Clean
        }
    }
}

/// Severity of a single category's alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Minor,
    Suspicious,
    HighRisk,
}

/// Summary of one category's events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAlert {
    pub category: ViolationCategory,
    pub total_occurrences: usize,
    pub severity: AlertSeverity,
    /// Event start times (seconds), ascending
    pub timestamps: Vec<f64>,
    /// Peak intensity over the category's events (degrees)
    pub max_intensity: f64,
}

/// Aggregate assessment of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Confidence that the session contains misconduct, in [0, 1]
    pub confidence_score: f64,
    pub risk_classification: RiskLevel,
    pub alert_counts: PerCategory<usize>,
    /// Score each category would get on its own
    pub category_scores: PerCategory<f64>,
    pub alerts: Vec<CategoryAlert>,
    pub high_activity_periods: Vec<HighActivityPeriod>,
}

/// Scoring engine
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    /// Create a scoring engine; rejects unusable configurations
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Saturating curve: 0 for no weight, approaching 1 as weight grows
    fn saturate(&self, weighted: f64) -> f64 {
        (1.0 - (-weighted / self.config.saturation).exp()).clamp(0.0, 1.0)
    }

    /// Score a session's events
    pub fn score(&self, events: &[ViolationEvent], session_duration: f64) -> ScoreResult {
        let mut alert_counts = PerCategory::<usize>::default();
        for event in events {
            *alert_counts.get_mut(event.category) += 1;
        }

        let weights = &self.config.weights;
        let mut category_scores = PerCategory::<f64>::default();
        let mut weighted_total = 0.0;
        for category in ViolationCategory::ALL {
            let weighted = *weights.get(category) * *alert_counts.get(category) as f64;
            *category_scores.get_mut(category) = self.saturate(weighted);
            weighted_total += weighted;
        }

        let confidence_score = self.saturate(weighted_total);
        let risk_classification = self.config.risk_bands.classify(confidence_score);

        let alerts = ViolationCategory::ALL
            .into_iter()
            .filter_map(|category| self.category_alert(category, events))
            .collect();

        let high_activity_periods =
            high_activity_periods(events, session_duration, &self.config.temporal);
        debug!("{} high-activity periods", high_activity_periods.len());

        info!(
            "Score computed | confidence={:.3} risk={:?} events={}",
            confidence_score,
            risk_classification,
            events.len()
        );

        ScoreResult {
            confidence_score,
            risk_classification,
            alert_counts,
            category_scores,
            alerts,
            high_activity_periods,
        }
    }

    fn category_alert(
        &self,
        category: ViolationCategory,
        events: &[ViolationEvent],
    ) -> Option<CategoryAlert> {
        let matching: Vec<&ViolationEvent> =
            events.iter().filter(|e| e.category == category).collect();
        if matching.is_empty() {
            return None;
        }

        let mut timestamps: Vec<f64> = matching.iter().map(|e| e.start_timestamp).collect();
        timestamps.sort_by(f64::total_cmp);
        let max_intensity = matching.iter().map(|e| e.intensity).fold(0.0, f64::max);

        let severity = &self.config.severity;
        let count = matching.len();
        let severity = if count >= severity.high_risk_count {
            AlertSeverity::HighRisk
        } else if count >= severity.suspicious_count {
            AlertSeverity::Suspicious
        } else {
            AlertSeverity::Minor
        };

        Some(CategoryAlert {
            category,
            total_occurrences: count,
            severity,
            timestamps,
            max_intensity,
        })
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self {
            config: ScoringConfig::default(),
        }
    }
}
