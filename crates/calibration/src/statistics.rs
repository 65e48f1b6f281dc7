//! Baseline Signal Statistics

use serde::{Deserialize, Serialize};

/// Summary statistics for one signal over the accepted baseline frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalStatistics {
    /// Mean value
    pub mean: f64,
    /// Population variance
    pub variance: f64,
    /// Mean absolute deviation from the mean
    pub mean_abs_deviation: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
}

impl SignalStatistics {
    /// Compute statistics from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;

        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        // Variance is zero for a single sample
        let (m2, abs_dev) = values.iter().fold((0.0, 0.0), |(m2, abs_dev), &v| {
            let d = v - mean;
            (m2 + d * d, abs_dev + d.abs())
        });

        Self {
            mean,
            variance: m2 / n,
            mean_abs_deviation: abs_dev / n,
            min,
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_computation() {
        let stats = SignalStatistics::compute(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((stats.mean - 3.0).abs() < 1e-9);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
    }

    #[test]
    fn test_variance_and_deviation() {
        let stats = SignalStatistics::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((stats.variance - 4.0).abs() < 1e-9);
        // |d| = 3,1,1,1,0,0,2,4 -> 12 / 8
        assert!((stats.mean_abs_deviation - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_single_value() {
        let stats = SignalStatistics::compute(&[3.5]);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.mean_abs_deviation, 0.0);
    }

    #[test]
    fn test_empty_values() {
        let stats = SignalStatistics::compute(&[]);
        assert_eq!(stats, SignalStatistics::default());
    }
}
