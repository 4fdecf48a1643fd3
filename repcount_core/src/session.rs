//! Workout session: both arm trackers, the session clock, the frame-rate
//! meter and the runtime-tunable settings.

use std::sync::Arc;
use std::time::{Duration, Instant};

use repcount_traits::{Clock, Pose};

use crate::config::{MAX_SMOOTHING_WINDOW, Thresholds};
use crate::error::{RepError, Result};
use crate::fps::FpsMeter;
use crate::phase::RepTrigger;
use crate::tracker::{ArmSide, ArmTracker, ArmUpdate, JointSample};
use crate::util::format_mmss;

/// Everything that happened in one processed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    /// Zero-based index of the frame within the session.
    pub frame: u64,
    pub left: ArmUpdate,
    pub right: ArmUpdate,
    pub total_reps: u32,
}

impl FrameReport {
    /// Number of reps completed in this frame (0, 1 or 2).
    pub fn reps_completed(&self) -> u32 {
        u32::from(self.left.rep_completed) + u32::from(self.right.rep_completed)
    }

    pub fn arm(&self, side: ArmSide) -> &ArmUpdate {
        match side {
            ArmSide::Left => &self.left,
            ArmSide::Right => &self.right,
        }
    }
}

pub struct Session {
    left: ArmTracker,
    right: ArmTracker,
    thresholds: Thresholds,
    trigger: RepTrigger,
    volume: f32,
    clock: Arc<dyn Clock + Send + Sync>,
    started_at: Option<Instant>,
    active: bool,
    fps: FpsMeter,
    frames: u64,
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("active", &self.active)
            .field("left_reps", &self.left.rep_count())
            .field("right_reps", &self.right.rep_count())
            .field("trigger", &self.trigger)
            .field("window", &self.left.window())
            .field("volume", &self.volume)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub(crate) fn from_parts(
        thresholds: Thresholds,
        window: usize,
        trigger: RepTrigger,
        volume: f32,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            left: ArmTracker::new(ArmSide::Left, window),
            right: ArmTracker::new(ArmSide::Right, window),
            thresholds,
            trigger,
            volume,
            clock,
            started_at: None,
            active: false,
            fps: FpsMeter::new(),
            frames: 0,
        }
    }

    /// Begin feeding frames to the trackers. Idempotent.
    pub fn start(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        self.started_at = Some(self.clock.now());
        tracing::info!(
            trigger = self.trigger.name(),
            window = self.left.window(),
            "session started"
        );
    }

    /// Stop feeding frames. Counts are kept.
    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.started_at = None;
        tracing::info!(total_reps = self.total_reps(), "session stopped");
    }

    /// Zero both arms; restarts the session clock when active.
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        self.frames = 0;
        self.fps.reset();
        self.started_at = self.active.then(|| self.clock.now());
        tracing::info!("session reset");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Time since start; `None` while stopped.
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|t| self.clock.elapsed_since(t))
    }

    /// `mm:ss`, `00:00` while stopped.
    pub fn elapsed_label(&self) -> String {
        format_mmss(self.elapsed().unwrap_or(Duration::ZERO))
    }

    /// Run one detected pose through both arms.
    ///
    /// Returns `None` when the session is not active.
    pub fn process_pose(&mut self, pose: &Pose) -> Option<FrameReport> {
        let left = JointSample::from_pose(pose, ArmSide::Left);
        let right = JointSample::from_pose(pose, ArmSide::Right);
        self.process_joints(&left, &right)
    }

    pub fn process_joints(
        &mut self,
        left: &JointSample,
        right: &JointSample,
    ) -> Option<FrameReport> {
        if !self.active {
            return None;
        }
        let left = self.left.observe(left, &self.thresholds, self.trigger);
        let right = self.right.observe(right, &self.thresholds, self.trigger);
        let frame = self.record_frame();
        Some(FrameReport {
            frame,
            left,
            right,
            total_reps: self.total_reps(),
        })
    }

    /// Count a processed frame (pose or not) for the frame-rate meter.
    /// Returns the frame's index.
    pub fn record_frame(&mut self) -> u64 {
        let idx = self.frames;
        self.frames = self.frames.saturating_add(1);
        if let Some(fps) = self.fps.tick(self.clock.now()) {
            tracing::trace!(fps, "frame rate sample");
        }
        idx
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn total_reps(&self) -> u32 {
        self.left.rep_count().saturating_add(self.right.rep_count())
    }

    pub fn arm(&self, side: ArmSide) -> &ArmTracker {
        match side {
            ArmSide::Left => &self.left,
            ArmSide::Right => &self.right,
        }
    }

    pub fn fps(&self) -> &FpsMeter {
        &self.fps
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn trigger(&self) -> RepTrigger {
        self.trigger
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn smoothing_window(&self) -> usize {
        self.left.window()
    }

    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    /// Resize both smoothing windows. Shrinking drops the oldest samples.
    pub fn set_smoothing_window(&mut self, window: usize) -> Result<()> {
        if !(1..=MAX_SMOOTHING_WINDOW).contains(&window) {
            return Err(eyre::Report::new(RepError::Config(format!(
                "smoothing window must be in 1..={MAX_SMOOTHING_WINDOW}, got {window}"
            ))));
        }
        self.left.set_window(window);
        self.right.set_window(window);
        tracing::debug!(window, "smoothing window changed");
        Ok(())
    }

    /// Cue loudness in `[0, 1]`; 0 mutes cues.
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(eyre::Report::new(RepError::Config(format!(
                "volume must be in [0, 1], got {volume}"
            ))));
        }
        self.volume = volume;
        Ok(())
    }

    pub fn set_trigger(&mut self, trigger: RepTrigger) {
        self.trigger = trigger;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SessionBuilder;
    use crate::phase::Phase;
    use repcount_traits::clock::test_clock::TestClock;
    use repcount_traits::{Keypoint, KeypointLayout, KeypointName};

    fn session(clock: &TestClock) -> Session {
        SessionBuilder::new()
            .with_smoothing_window(1)
            .with_clock(Arc::new(clock.clone()))
            .build()
            .expect("valid session")
    }

    /// Pose with both arms bent to roughly `deg` degrees at the elbow.
    fn arms_at(deg: f32) -> Pose {
        let r = deg.to_radians();
        let (dx, dy) = (r.sin(), -r.cos());
        let mut pose = Pose::new(KeypointLayout::MoveNet17);
        for (s, e, w, x0) in [
            (KeypointName::LeftShoulder, KeypointName::LeftElbow, KeypointName::LeftWrist, 100.0),
            (KeypointName::RightShoulder, KeypointName::RightElbow, KeypointName::RightWrist, 300.0),
        ] {
            pose.set(s, Keypoint::new(x0, 100.0, 0.9));
            pose.set(e, Keypoint::new(x0, 200.0, 0.9));
            pose.set(w, Keypoint::new(x0 + 100.0 * dx, 200.0 + 100.0 * dy, 0.9));
        }
        pose
    }

    #[test]
    fn inactive_session_ignores_frames() {
        let clock = TestClock::new();
        let mut s = session(&clock);
        assert!(s.process_pose(&arms_at(170.0)).is_none());
        assert_eq!(s.elapsed(), None);
        assert_eq!(s.elapsed_label(), "00:00");
    }

    #[test]
    fn full_curl_on_both_arms_counts_two() {
        let clock = TestClock::new();
        let mut s = session(&clock);
        s.start();
        let mut completed = 0;
        for deg in [170.0, 170.0, 55.0, 55.0, 170.0] {
            let report = s.process_pose(&arms_at(deg)).expect("active");
            completed += report.reps_completed();
        }
        assert_eq!(completed, 2);
        assert_eq!(s.total_reps(), 2);
        assert_eq!(s.arm(ArmSide::Left).phase(), Phase::Ready);
    }

    #[test]
    fn stop_keeps_counts_and_clears_clock() {
        let clock = TestClock::new();
        let mut s = session(&clock);
        s.start();
        for deg in [170.0, 40.0, 170.0] {
            s.process_pose(&arms_at(deg));
        }
        clock.advance_ms(65_000);
        assert_eq!(s.elapsed_label(), "01:05");
        s.stop();
        assert_eq!(s.total_reps(), 2);
        assert_eq!(s.elapsed(), None);
    }

    #[test]
    fn reset_restarts_clock_only_when_active() {
        let clock = TestClock::new();
        let mut s = session(&clock);
        s.start();
        s.process_pose(&arms_at(170.0));
        clock.advance_ms(5_000);
        s.reset();
        assert_eq!(s.elapsed(), Some(Duration::ZERO));
        assert_eq!(s.total_reps(), 0);
        assert_eq!(s.frames(), 0);

        s.stop();
        s.reset();
        assert_eq!(s.elapsed(), None);
    }

    #[test]
    fn runtime_settings_are_validated() {
        let clock = TestClock::new();
        let mut s = session(&clock);
        assert!(s.set_smoothing_window(0).is_err());
        assert!(s.set_smoothing_window(31).is_err());
        s.set_smoothing_window(7).expect("in range");
        assert_eq!(s.arm(ArmSide::Right).window(), 7);
        assert!(s.set_volume(1.5).is_err());
        s.set_volume(0.0).expect("mute");
        s.set_trigger(RepTrigger::DownToUp);
        assert_eq!(s.trigger(), RepTrigger::DownToUp);
    }

    #[test]
    fn curling_one_arm_never_counts_for_the_other() {
        let clock = TestClock::new();
        let mut s = session(&clock);
        s.start();
        let arm_at = |deg: f32| {
            let r = deg.to_radians();
            JointSample::new(
                Keypoint::new(100.0, 100.0, 0.9),
                Keypoint::new(100.0, 200.0, 0.9),
                Keypoint::new(100.0 + 100.0 * r.sin(), 200.0 - 100.0 * r.cos(), 0.9),
            )
        };
        let resting = arm_at(100.0);
        for deg in [170.0, 170.0, 55.0, 55.0, 170.0, 170.0, 55.0, 170.0] {
            let report = s.process_joints(&arm_at(deg), &resting).expect("active");
            assert_eq!(report.right.rep_count, 0);
            assert!(!report.right.rep_completed);
        }
        assert_eq!(s.arm(ArmSide::Left).rep_count(), 2);
        assert_eq!(s.arm(ArmSide::Right).rep_count(), 0);
        assert_eq!(s.arm(ArmSide::Right).phase(), Phase::Ready);
        assert_eq!(s.arm(ArmSide::Right).history(), vec![100]);
        assert_eq!(s.total_reps(), 2);
    }

    #[test]
    fn arms_do_not_share_state() {
        let clock = TestClock::new();
        let mut s = session(&clock);
        s.start();
        let extended = JointSample::new(
            Keypoint::new(0.0, 0.0, 0.9),
            Keypoint::new(0.0, 10.0, 0.9),
            Keypoint::new(0.0, 20.0, 0.9),
        );
        let missing = JointSample::default();
        let report = s.process_joints(&extended, &missing).expect("active");
        assert_eq!(report.left.phase, Phase::Down);
        assert_eq!(report.right.phase, Phase::Ready);
        assert_eq!(report.right.angle, None);
        assert!(s.arm(ArmSide::Right).history().is_empty());
    }
}
