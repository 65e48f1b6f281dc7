//! Validation Error Types

use thiserror::Error;

/// Data-integrity errors in the measurement stream
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value is NaN or infinite
    #[error("{field} is not a finite number at frame {frame}")]
    NonFinite { field: &'static str, frame: u64 },

    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}] at frame {frame}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
        frame: u64,
    },

    /// Timestamp went backwards
    #[error("Timestamp regressed from {previous}s to {current}s at frame {frame}")]
    TimestampRegression {
        previous: f64,
        current: f64,
        frame: u64,
    },
}
