use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use repcount_core::error::RepError;
use repcount_core::mocks::{CountingAudio, FailingAudio, RecordingSink, ScriptedSource};
use repcount_core::{
    ArmSide, NullSink, RunParams, Session, SessionBuilder, StopReason, run,
};
use repcount_traits::clock::test_clock::TestClock;
use repcount_traits::{Estimate, Keypoint, KeypointLayout, KeypointName, Pose};

fn arms_at(deg: f32) -> Pose {
    let r = deg.to_radians();
    let mut pose = Pose::new(KeypointLayout::MoveNet17);
    for (s, e, w, x0) in [
        (KeypointName::LeftShoulder, KeypointName::LeftElbow, KeypointName::LeftWrist, 100.0),
        (KeypointName::RightShoulder, KeypointName::RightElbow, KeypointName::RightWrist, 300.0),
    ] {
        pose.set(s, Keypoint::new(x0, 100.0, 0.9));
        pose.set(e, Keypoint::new(x0, 200.0, 0.9));
        pose.set(w, Keypoint::new(x0 + 100.0 * r.sin(), 200.0 - 100.0 * r.cos(), 0.9));
    }
    pose
}

fn curl_script() -> Vec<Result<Estimate, String>> {
    [170.0, 170.0, 55.0, 55.0, 170.0]
        .into_iter()
        .map(|d| Ok(Estimate::Pose(arms_at(d))))
        .collect()
}

fn session(clock: &TestClock) -> Session {
    SessionBuilder::new()
        .with_smoothing_window(1)
        .with_clock(Arc::new(clock.clone()))
        .build()
        .unwrap()
}

fn unpaced() -> RunParams {
    RunParams {
        acquire_timeout: Duration::from_secs(2),
        frame_rate_hz: 0,
        max_frames: None,
    }
}

#[test]
fn end_of_stream_ends_the_run() {
    let clock = TestClock::new();
    let mut s = session(&clock);
    let mut audio = CountingAudio::default();
    let mut sink = RecordingSink::default();
    let stop = AtomicBool::new(false);

    let summary = run(
        ScriptedSource::new(curl_script()),
        &mut audio,
        &mut sink,
        &mut s,
        &unpaced(),
        &stop,
    )
    .unwrap();

    assert_eq!(summary.stop, StopReason::EndOfStream);
    assert_eq!(summary.total_reps, 2);
    assert_eq!(summary.left_reps, 1);
    assert_eq!(summary.right_reps, 1);
    // The end-of-stream estimate counts as an attempt.
    assert_eq!(summary.frames, 6);
    assert_eq!(sink.reports.len(), 5);
    assert_eq!(audio.plays(), 2);
    assert!(!s.is_active());
}

#[test]
fn failing_estimate_does_not_end_the_run() {
    let clock = TestClock::new();
    let mut s = session(&clock);
    let mut script = curl_script();
    script.insert(2, Err("inference crashed".into()));
    script.insert(0, Ok(Estimate::NoPerson));
    let mut sink = RecordingSink::default();

    let summary = run(
        ScriptedSource::new(script),
        &mut CountingAudio::default(),
        &mut sink,
        &mut s,
        &unpaced(),
        &AtomicBool::new(false),
    )
    .unwrap();

    assert_eq!(summary.failed_frames, 1);
    assert_eq!(summary.no_person_frames, 1);
    assert_eq!(summary.total_reps, 2);
    assert_eq!(sink.no_person, vec![0]);
}

#[test]
fn audio_failure_does_not_change_counts() {
    let clock = TestClock::new();
    let mut s = session(&clock);
    let summary = run(
        ScriptedSource::new(curl_script()),
        &mut FailingAudio,
        &mut NullSink,
        &mut s,
        &unpaced(),
        &AtomicBool::new(false),
    )
    .unwrap();
    assert_eq!(summary.total_reps, 2);
}

#[test]
fn muted_session_plays_no_cues() {
    let clock = TestClock::new();
    let mut s = session(&clock);
    s.set_volume(0.0).unwrap();
    let mut audio = CountingAudio::default();
    run(
        ScriptedSource::new(curl_script()),
        &mut audio,
        &mut NullSink,
        &mut s,
        &unpaced(),
        &AtomicBool::new(false),
    )
    .unwrap();
    assert_eq!(audio.plays(), 0);
    assert_eq!(s.total_reps(), 2);
}

#[test]
fn acquisition_timeout_is_reported_as_timeout() {
    let clock = TestClock::new();
    let mut s = session(&clock);
    let params = RunParams {
        acquire_timeout: Duration::from_millis(20),
        ..unpaced()
    };
    let err = run(
        ScriptedSource::new(curl_script()).with_open_delay(Duration::from_millis(300)),
        &mut CountingAudio::default(),
        &mut NullSink,
        &mut s,
        &params,
        &AtomicBool::new(false),
    )
    .expect_err("open is slower than the timeout");
    assert_eq!(err.downcast_ref::<RepError>(), Some(&RepError::AcquireTimeout(20)));
    assert!(!s.is_active());
}

#[test]
fn acquisition_failure_is_fatal() {
    let clock = TestClock::new();
    let mut s = session(&clock);
    let err = run(
        ScriptedSource::new(curl_script()).with_open_error("camera permission denied"),
        &mut CountingAudio::default(),
        &mut NullSink,
        &mut s,
        &unpaced(),
        &AtomicBool::new(false),
    )
    .expect_err("open fails");
    assert!(matches!(err.downcast_ref::<RepError>(), Some(RepError::Acquire(m)) if m.contains("permission")));
}

#[test]
fn max_frames_and_shutdown_stop_the_loop() {
    let clock = TestClock::new();
    let mut s = session(&clock);
    let params = RunParams {
        max_frames: Some(3),
        ..unpaced()
    };
    let summary = run(
        ScriptedSource::new(curl_script()),
        &mut CountingAudio::default(),
        &mut NullSink,
        &mut s,
        &params,
        &AtomicBool::new(false),
    )
    .unwrap();
    assert_eq!(summary.stop, StopReason::MaxFrames);
    assert_eq!(summary.frames, 3);

    let mut s = session(&clock);
    let summary = run(
        ScriptedSource::new(curl_script()),
        &mut CountingAudio::default(),
        &mut NullSink,
        &mut s,
        &unpaced(),
        &AtomicBool::new(true),
    )
    .unwrap();
    assert_eq!(summary.stop, StopReason::Shutdown);
    assert_eq!(summary.frames, 0);
}

#[test]
fn pacing_uses_the_injected_clock() {
    let clock = TestClock::new();
    let mut s = session(&clock);
    let params = RunParams {
        frame_rate_hz: 10,
        ..unpaced()
    };
    let summary = run(
        ScriptedSource::new(curl_script()),
        &mut CountingAudio::default(),
        &mut NullSink,
        &mut s,
        &params,
        &AtomicBool::new(false),
    )
    .unwrap();
    // Five paced pose frames at 100 ms each; the loop breaks on end of
    // stream before pacing the last attempt.
    assert_eq!(summary.elapsed, Duration::from_millis(500));
    assert_eq!(s.arm(ArmSide::Left).rep_count(), 1);
}

/// Panics on the first estimate; would report end of stream afterwards.
struct PanickingSource {
    calls: u32,
}

impl repcount_traits::PoseSource for PanickingSource {
    fn estimate(&mut self) -> Result<Estimate, repcount_traits::BoxError> {
        self.calls += 1;
        if self.calls == 1 {
            panic!("model crashed");
        }
        Ok(Estimate::EndOfStream)
    }
}

#[test]
fn dead_worker_ends_the_run_instead_of_spinning() {
    let clock = TestClock::new();
    let mut s = session(&clock);
    // Unpaced and unbounded: only the lost worker can stop this loop.
    let summary = run(
        PanickingSource { calls: 0 },
        &mut CountingAudio::default(),
        &mut NullSink,
        &mut s,
        &unpaced(),
        &AtomicBool::new(false),
    )
    .unwrap();
    assert_eq!(summary.stop, StopReason::SourceLost);
    assert_eq!(summary.stop.as_str(), "source_lost");
    assert_eq!(summary.frames, 1);
    assert_eq!(summary.failed_frames, 1);
    assert_eq!(summary.total_reps, 0);
    assert!(!s.is_active());
}
