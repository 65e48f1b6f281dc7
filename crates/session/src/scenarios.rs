//! End-to-end session scenarios

use calibration::{ActiveThresholds, BaselineSignal, CalibrationConfig, CalibrationStatus, FailureReason, FixedThresholds};
use detector::{Direction, ViolationCategory};
use measurement::Measurement;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use scoring::RiskLevel;

use crate::{SessionConfig, SessionOrchestrator};

const FPS: f64 = 12.0;

fn orchestrator(config: SessionConfig) -> SessionOrchestrator {
    SessionOrchestrator::new(config).unwrap()
}

fn without_calibration() -> SessionConfig {
    SessionConfig {
        calibration: CalibrationConfig::disabled(),
        ..Default::default()
    }
}

/// `count` frames at 12 fps shaped by `f(index, timestamp)`
fn recording(count: usize, f: impl Fn(usize, f64) -> Measurement) -> Vec<Measurement> {
    (0..count).map(|i| f(i, i as f64 / FPS)).collect()
}

/// Small natural head sway, well inside every threshold
fn calm(i: usize, t: f64) -> Measurement {
    let phase = i as f64 * 0.7;
    Measurement {
        yaw: 2.5 * phase.sin(),
        pitch: 2.0 * phase.cos(),
        roll: 1.5 * (phase * 0.5).sin(),
        gaze_angle: 3.0 * (phase * 1.3).cos(),
        ..Measurement::neutral(t)
    }
}

#[test]
fn scenario_quiet_session_is_clean() {
    // 45 seconds, 540 frames
    let frames = recording(540, calm);

    for config in [SessionConfig::default(), without_calibration()] {
        let report = orchestrator(config).run(None, frames.clone()).unwrap();
        assert!(report.events.is_empty());
        assert_eq!(report.confidence_score, 0.0);
        assert_eq!(report.risk_classification, RiskLevel::Clean);
        assert!(report.alerts.is_empty());
        assert_eq!(report.metadata.frames_received, 540);
    }
}

#[test]
fn scenario_steady_pose_just_inside_fixed_thresholds() {
    // A candidate sitting still, slightly turned: inside 12.5 / 14.3 degrees
    let frames = recording(540, |i, t| Measurement {
        yaw: if i % 2 == 0 { 12.0 } else { 11.9 },
        pitch: -12.0,
        gaze_angle: 9.0,
        ..Measurement::neutral(t)
    });

    for config in [SessionConfig::default(), without_calibration()] {
        let report = orchestrator(config).run(None, frames.clone()).unwrap();
        assert!(report.events.is_empty(), "unexpected events: {:?}", report.events);
        assert_eq!(report.confidence_score, 0.0);
        assert_eq!(report.risk_classification, RiskLevel::Clean);
    }

    let report = orchestrator(SessionConfig::default()).run(None, frames).unwrap();
    assert_eq!(report.calibration_status, CalibrationStatus::Success);
    match report.active_thresholds {
        ActiveThresholds::Adaptive(t) => {
            assert!(t.yaw >= FixedThresholds::STANDARD.yaw);
            assert!(t.pitch >= FixedThresholds::STANDARD.pitch);
            assert!(t.eye >= FixedThresholds::STANDARD.eye);
        }
        ActiveThresholds::Fixed(_) => panic!("expected adaptive thresholds"),
    }
}

#[test]
fn scenario_sustained_head_turn() {
    let mut frames = recording(480, |_, t| {
        if (22.0..26.345).contains(&t) {
            Measurement {
                yaw: -(18.0 + (t - 22.0)),
                ..Measurement::neutral(t)
            }
        } else {
            Measurement::neutral(t)
        }
    });
    frames.push(Measurement::neutral(26.345));
    frames.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    let peak = frames.iter().map(|m| m.yaw.abs()).fold(0.0, f64::max);

    for config in [SessionConfig::default(), without_calibration()] {
        let report = orchestrator(config).run(None, frames.clone()).unwrap();

        assert_eq!(report.events.len(), 1);
        let event = &report.events[0];
        assert_eq!(event.category, ViolationCategory::HeadMovement);
        assert_eq!(event.timestamp, "00:22:000");
        assert_eq!(event.start_seconds, 22.0);
        assert!((event.duration - 4.345).abs() < 1e-9);
        assert_eq!(event.direction, Direction::Left);
        assert_eq!(event.intensity, peak);
        assert_eq!(report.alert_counts.head_movement, 1);
    }
}

#[test]
fn scenario_brief_face_loss_is_noise() {
    let frames = recording(360, |_, t| Measurement {
        face_count: if (15.0..15.5).contains(&t) { 0 } else { 1 },
        ..Measurement::neutral(t)
    });

    let report = orchestrator(SessionConfig::default()).run(None, frames).unwrap();
    assert!(report.events.is_empty());
    assert_eq!(report.risk_classification, RiskLevel::Clean);
}

#[test]
fn scenario_manipulated_baseline_falls_back() {
    // Window: 6 frames looking away, then 90 frames swinging +/-15 degrees
    let frames = recording(480, |i, t| {
        if i < 6 {
            Measurement {
                gaze_angle: 30.0,
                ..Measurement::neutral(t)
            }
        } else if t < 8.0 {
            Measurement {
                yaw: if i % 2 == 0 { 15.0 } else { -15.0 },
                ..Measurement::neutral(t)
            }
        } else if (20.0..26.0).contains(&t) {
            // Only crosses the fixed 12.5 degree threshold
            Measurement {
                yaw: 13.0,
                ..Measurement::neutral(t)
            }
        } else {
            Measurement::neutral(t)
        }
    });

    let report = orchestrator(SessionConfig::default()).run(None, frames).unwrap();

    assert_eq!(report.calibration_status, CalibrationStatus::Failed);
    assert_eq!(report.active_thresholds, ActiveThresholds::Fixed(FixedThresholds::STANDARD));
    assert!(matches!(
        report.failure_reason,
        Some(FailureReason::VarianceCeiling {
            signal: BaselineSignal::Yaw,
            ..
        })
    ));
    let baseline = report.baseline_metrics.as_ref().unwrap();
    assert_eq!(baseline.accepted_frames, 90);
    assert_eq!(baseline.rejected_frames, 6);

    assert_eq!(report.events.len(), 1);
    assert_eq!(report.events[0].direction, Direction::Right);
    assert_eq!(report.events[0].start_seconds, 20.0);
}

#[test]
fn scenario_second_person_is_high_risk() {
    let frames = recording(1200, |_, t| Measurement {
        face_count: if (30.0..33.0).contains(&t) || (70.0..74.0).contains(&t) {
            2
        } else {
            1
        },
        ..Measurement::neutral(t)
    });

    let report = orchestrator(SessionConfig::default()).run(None, frames).unwrap();

    assert_eq!(report.alert_counts.multiple_faces, 2);
    assert_eq!(report.risk_classification, RiskLevel::HighRisk);
    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].timestamps, vec![30.0, 70.0]);
}

#[test]
fn scenario_report_wire_format() {
    let frames = recording(240, calm);
    let report = orchestrator(SessionConfig::default())
        .run(Some("exam-7".to_string()), frames)
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["session_id"], "exam-7");
    assert_eq!(json["calibration_status"], "SUCCESS");
    assert_eq!(json["risk_classification"], "CLEAN");
    assert_eq!(json["active_thresholds"]["kind"], "adaptive");
    assert_eq!(json["alert_counts"]["face_missing"], 0);
    assert!(json.get("failure_reason").is_none());
}

fn arb_frame() -> impl Strategy<Value = (f64, f64, u32)> {
    (-30.0f64..30.0, -30.0f64..30.0, 0u32..3)
}

proptest! {
    #[test]
    fn prop_session_is_deterministic_and_accounts_for_frames(
        // At least 100 frames, so something is left after the calibration window
        samples in proptest::collection::vec(arb_frame(), 20..300),
        hold in 5usize..12,
        calibrate in any::<bool>(),
    ) {
        let frames: Vec<Measurement> = samples
            .iter()
            .flat_map(|s| std::iter::repeat(*s).take(hold))
            .enumerate()
            .map(|(i, (yaw, gaze, faces))| Measurement {
                timestamp: i as f64 / FPS,
                yaw,
                gaze_angle: gaze,
                face_count: faces,
                ..Default::default()
            })
            .collect();

        let config = if calibrate { SessionConfig::default() } else { without_calibration() };
        let orchestrator = orchestrator(config);
        let first = orchestrator.run(Some("p".to_string()), frames.clone()).unwrap();
        let second = orchestrator.run(Some("p".to_string()), frames.clone()).unwrap();

        prop_assert_eq!(&first.events, &second.events);
        prop_assert_eq!(&first.alerts, &second.alerts);
        prop_assert_eq!(first.confidence_score, second.confidence_score);
        prop_assert_eq!(first.calibration_status, second.calibration_status);
        prop_assert_eq!(first.metadata.frames_received, frames.len() as u64);
        prop_assert_eq!(
            first.metadata.calibration_frames + first.metadata.frames_analyzed,
            frames.len() as u64
        );
        for pair in first.events.windows(2) {
            prop_assert!(pair[0].start_seconds <= pair[1].start_seconds);
        }
        prop_assert!((0.0..=1.0).contains(&first.confidence_score));
    }
}
