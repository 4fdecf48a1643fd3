//! Per-arm rep tracking: confidence gate → angle → smoothing → phase → count.

use repcount_traits::{Keypoint, KeypointName, Pose};

use crate::angle::joint_angle;
use crate::config::Thresholds;
use crate::phase::{Phase, RepTrigger};
use crate::smoothing::AngleSmoother;

/// Which arm a tracker follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmSide {
    Left,
    Right,
}

impl ArmSide {
    pub const BOTH: [ArmSide; 2] = [ArmSide::Left, ArmSide::Right];

    pub fn label(self) -> &'static str {
        match self {
            ArmSide::Left => "left",
            ArmSide::Right => "right",
        }
    }

    /// Shoulder, elbow, wrist.
    pub fn joints(self) -> [KeypointName; 3] {
        match self {
            ArmSide::Left => [
                KeypointName::LeftShoulder,
                KeypointName::LeftElbow,
                KeypointName::LeftWrist,
            ],
            ArmSide::Right => [
                KeypointName::RightShoulder,
                KeypointName::RightElbow,
                KeypointName::RightWrist,
            ],
        }
    }
}

/// Shoulder, elbow and wrist for one arm in one frame; any may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointSample {
    pub shoulder: Option<Keypoint>,
    pub elbow: Option<Keypoint>,
    pub wrist: Option<Keypoint>,
}

impl JointSample {
    pub fn new(shoulder: Keypoint, elbow: Keypoint, wrist: Keypoint) -> Self {
        Self {
            shoulder: Some(shoulder),
            elbow: Some(elbow),
            wrist: Some(wrist),
        }
    }

    pub fn from_pose(pose: &Pose, side: ArmSide) -> Self {
        let [s, e, w] = side.joints();
        Self {
            shoulder: pose.get(s).copied(),
            elbow: pose.get(e).copied(),
            wrist: pose.get(w).copied(),
        }
    }

    /// Elbow angle if all three joints clear the confidence gate.
    pub fn angle(&self, min_confidence: f32) -> Option<u16> {
        let (s, e, w) = (self.shoulder?, self.elbow?, self.wrist?);
        if [s, e, w].iter().all(|k| k.is_confident(min_confidence)) {
            Some(joint_angle(&s, &e, &w))
        } else {
            None
        }
    }
}

/// What happened to one arm this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmUpdate {
    pub side: ArmSide,
    /// Smoothed angle; `None` when the frame was rejected for this arm.
    pub angle: Option<u16>,
    pub previous: Phase,
    pub phase: Phase,
    pub rep_count: u32,
    pub rep_completed: bool,
}

impl ArmUpdate {
    pub fn phase_changed(&self) -> bool {
        self.previous != self.phase
    }

    /// `"NN°"`, or `"--°"` when the angle is unknown.
    pub fn angle_label(&self) -> String {
        match self.angle {
            Some(a) => format!("{a}°"),
            None => "--°".to_string(),
        }
    }
}

/// State machine and counter for one arm.
#[derive(Debug, Clone)]
pub struct ArmTracker {
    side: ArmSide,
    phase: Phase,
    smoother: AngleSmoother,
    rep_count: u32,
    last_angle: Option<u16>,
}

impl ArmTracker {
    pub fn new(side: ArmSide, window: usize) -> Self {
        Self {
            side,
            phase: Phase::Ready,
            smoother: AngleSmoother::new(window),
            rep_count: 0,
            last_angle: None,
        }
    }

    /// Gate, smooth and classify one frame's joints.
    ///
    /// A rejected frame (missing or low-confidence joint) leaves phase,
    /// count and history untouched.
    pub fn observe(
        &mut self,
        sample: &JointSample,
        thresholds: &Thresholds,
        trigger: RepTrigger,
    ) -> ArmUpdate {
        match sample.angle(thresholds.min_confidence) {
            Some(raw) => self.observe_angle(raw, thresholds, trigger),
            None => ArmUpdate {
                side: self.side,
                angle: None,
                previous: self.phase,
                phase: self.phase,
                rep_count: self.rep_count,
                rep_completed: false,
            },
        }
    }

    /// Feed an already-computed raw angle.
    pub fn observe_angle(
        &mut self,
        raw: u16,
        thresholds: &Thresholds,
        trigger: RepTrigger,
    ) -> ArmUpdate {
        let smoothed = self.smoother.push(raw.min(180));
        let previous = self.phase;
        let next = previous.next(smoothed, thresholds);

        let rep_completed = next != previous && trigger.fires(previous, next);
        if rep_completed {
            self.rep_count = self.rep_count.saturating_add(1);
            tracing::debug!(
                side = self.side.label(),
                count = self.rep_count,
                angle = smoothed,
                "rep completed"
            );
        }
        if next != previous {
            tracing::trace!(
                side = self.side.label(),
                from = previous.label(),
                to = next.label(),
                angle = smoothed,
                "phase change"
            );
        }

        self.phase = next;
        self.last_angle = Some(smoothed);
        ArmUpdate {
            side: self.side,
            angle: Some(smoothed),
            previous,
            phase: next,
            rep_count: self.rep_count,
            rep_completed,
        }
    }

    /// Back to `Ready`, empty history, zero count.
    pub fn reset(&mut self) {
        self.phase = Phase::Ready;
        self.smoother.clear();
        self.rep_count = 0;
        self.last_angle = None;
    }

    pub fn set_window(&mut self, window: usize) {
        self.smoother.set_window(window);
    }

    pub fn side(&self) -> ArmSide {
        self.side
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rep_count(&self) -> u32 {
        self.rep_count
    }

    pub fn last_angle(&self) -> Option<u16> {
        self.last_angle
    }

    pub fn window(&self) -> usize {
        self.smoother.window()
    }

    /// Raw angles currently in the smoothing window, oldest first.
    pub fn history(&self) -> Vec<u16> {
        self.smoother.history().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(tracker: &mut ArmTracker, angles: &[u16], trigger: RepTrigger) -> Vec<ArmUpdate> {
        let t = Thresholds::default();
        angles
            .iter()
            .map(|&a| tracker.observe_angle(a, &t, trigger))
            .collect()
    }

    #[test]
    fn reference_sequence_counts_one_rep_on_up_to_ready() {
        let mut arm = ArmTracker::new(ArmSide::Left, 1);
        let ups = drive(&mut arm, &[170, 170, 55, 55, 170], RepTrigger::UpToReady);
        let phases: Vec<Phase> = ups.iter().map(|u| u.phase).collect();
        use Phase::*;
        assert_eq!(phases, vec![Down, Down, Up, Up, Ready]);
        let fired: Vec<bool> = ups.iter().map(|u| u.rep_completed).collect();
        assert_eq!(fired, vec![false, false, false, false, true]);
        assert_eq!(arm.rep_count(), 1);
    }

    #[test]
    fn reference_sequence_counts_one_rep_on_down_to_up() {
        let mut arm = ArmTracker::new(ArmSide::Left, 1);
        let ups = drive(&mut arm, &[170, 170, 55, 55, 170], RepTrigger::DownToUp);
        let fired: Vec<bool> = ups.iter().map(|u| u.rep_completed).collect();
        assert_eq!(fired, vec![false, false, true, false, false]);
        assert_eq!(arm.rep_count(), 1);
        assert_eq!(arm.phase(), Phase::Ready);
    }

    #[test]
    fn partial_curl_does_not_count() {
        let mut arm = ArmTracker::new(ArmSide::Right, 1);
        // extend, bend to 100 (released to Ready), extend again
        drive(&mut arm, &[170, 100, 170, 100], RepTrigger::UpToReady);
        assert_eq!(arm.rep_count(), 0);
        assert_eq!(arm.phase(), Phase::Ready);
    }

    #[test]
    fn rejected_frame_changes_nothing() {
        let t = Thresholds::default();
        let mut arm = ArmTracker::new(ArmSide::Left, 5);
        drive(&mut arm, &[170, 170], RepTrigger::UpToReady);
        let before = (arm.phase(), arm.rep_count(), arm.history());

        let good = Keypoint::new(0.0, 0.0, 0.9);
        let weak = Keypoint::new(0.0, 10.0, 0.1);
        let sample = JointSample::new(good, weak, Keypoint::new(0.0, 20.0, 0.9));
        let up = arm.observe(&sample, &t, RepTrigger::UpToReady);

        assert_eq!(up.angle, None);
        assert!(!up.phase_changed());
        assert_eq!((arm.phase(), arm.rep_count(), arm.history()), before);
    }

    #[test]
    fn missing_joint_is_rejected() {
        let sample = JointSample {
            shoulder: Some(Keypoint::new(0.0, 0.0, 0.9)),
            elbow: None,
            wrist: Some(Keypoint::new(0.0, 2.0, 0.9)),
        };
        assert_eq!(sample.angle(0.3), None);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut arm = ArmTracker::new(ArmSide::Left, 1);
        drive(&mut arm, &[170, 20, 170, 20], RepTrigger::UpToReady);
        assert_eq!(arm.rep_count(), 1);
        assert_eq!(arm.phase(), Phase::Ready);
        arm.reset();
        assert_eq!(arm.phase(), Phase::Ready);
        assert_eq!(arm.rep_count(), 0);
        assert!(arm.history().is_empty());
        assert_eq!(arm.last_angle(), None);
    }

    #[rstest::rstest]
    #[case::from_ready(&[], Phase::Ready)]
    #[case::from_down(&[170], Phase::Down)]
    #[case::from_up(&[170, 55], Phase::Up)]
    #[case::mid_second_rep(&[170, 55, 170, 170, 55], Phase::Up)]
    fn reset_works_from_any_phase(#[case] prefix: &[u16], #[case] reached: Phase) {
        let mut arm = ArmTracker::new(ArmSide::Right, 1);
        drive(&mut arm, prefix, RepTrigger::UpToReady);
        assert_eq!(arm.phase(), reached);

        arm.reset();
        assert_eq!(arm.phase(), Phase::Ready);
        assert_eq!(arm.rep_count(), 0);
        assert!(arm.history().is_empty());
        assert_eq!(arm.last_angle(), None);

        // A stale Down/Up must not leak into the next cycle.
        drive(&mut arm, &[55, 170, 55, 170], RepTrigger::UpToReady);
        assert_eq!(arm.rep_count(), 1);
    }

    #[test]
    fn angle_labels() {
        let mut arm = ArmTracker::new(ArmSide::Left, 1);
        let up = arm.observe_angle(42, &Thresholds::default(), RepTrigger::UpToReady);
        assert_eq!(up.angle_label(), "42°");
        let rejected = arm.observe(&JointSample::default(), &Thresholds::default(), RepTrigger::UpToReady);
        assert_eq!(rejected.angle_label(), "--°");
    }
}
