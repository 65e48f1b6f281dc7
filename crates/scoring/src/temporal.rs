//! Temporal alert density analysis

use detector::ViolationEvent;
use serde::{Deserialize, Serialize};

use crate::config::TemporalConfig;

/// A stretch of the session with unusually dense violations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighActivityPeriod {
    pub start: f64,
    pub end: f64,
    /// Highest window density inside the period (events per second)
    pub peak_density: f64,
    /// Events overlapping the period
    pub event_count: usize,
}

/// Window bounds covering `[0, duration]`.
///
/// Sessions shorter than one window get a single window; otherwise windows
/// advance by `step` and the last one is aligned to the session end.
fn windows(duration: f64, width: f64, step: f64) -> Vec<(f64, f64)> {
    if duration.is_nan() || duration <= 0.0 {
        return Vec::new();
    }
    if duration <= width {
        return vec![(0.0, duration)];
    }

    let mut bounds = Vec::new();
    let mut k = 0u32;
    loop {
        let start = k as f64 * step;
        if start + width >= duration {
            break;
        }
        bounds.push((start, start + width));
        k += 1;
    }
    bounds.push((duration - width, duration));
    bounds
}

fn overlaps(event: &ViolationEvent, start: f64, end: f64) -> bool {
    if event.duration > 0.0 {
        event.start_timestamp < end && event.end_timestamp() > start
    } else {
        event.start_timestamp >= start && event.start_timestamp < end
    }
}

fn count_overlapping(events: &[ViolationEvent], start: f64, end: f64) -> usize {
    events.iter().filter(|e| overlaps(e, start, end)).count()
}

/// Find high-activity periods.
///
/// A run of consecutive qualifying windows forms one period; a quiet window
/// in between starts a new one even if the windows overlap.
pub fn high_activity_periods(
    events: &[ViolationEvent],
    session_duration: f64,
    config: &TemporalConfig,
) -> Vec<HighActivityPeriod> {
    let mut periods: Vec<HighActivityPeriod> = Vec::new();
    let mut extending = false;

    for (start, end) in windows(session_duration, config.window_sec, config.step_sec) {
        let density = count_overlapping(events, start, end) as f64 / (end - start);
        if density <= config.density_threshold {
            extending = false;
            continue;
        }

        match periods.last_mut() {
            Some(current) if extending => {
                current.end = current.end.max(end);
                current.peak_density = current.peak_density.max(density);
            }
            _ => periods.push(HighActivityPeriod {
                start,
                end,
                peak_density: density,
                event_count: 0,
            }),
        }
        extending = true;
    }

    for period in &mut periods {
        period.event_count = count_overlapping(events, period.start, period.end);
    }
    periods
}
