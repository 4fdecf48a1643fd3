use std::f32::consts::TAU;
use std::time::Duration;

use repcount_traits::{BoxError, Estimate, Keypoint, KeypointLayout, KeypointName, Pose, PoseSource};

use crate::error::SimError;

/// Confident score for every synthesized joint.
const SCORE: f32 = 0.9;
/// Wrist score on dropout frames.
const DROPOUT_SCORE: f32 = 0.05;
/// Forearm length in normalized image units.
const FOREARM: f32 = 0.13;

/// Tiny xorshift PRNG; enough for jitter.
#[derive(Debug, Clone)]
struct XorShift32(u32);

impl XorShift32 {
    fn new(seed: u32) -> Self {
        Self(seed.max(1))
    }

    /// Uniform in `[-1, 1)`.
    fn next_signed(&mut self) -> f32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        (x as f32) / (u32::MAX as f32 + 1.0) * 2.0 - 1.0
    }
}

/// Both arms curling on a cosine between `min_angle` and `max_angle`.
///
/// Frame 0 starts fully extended. Coordinates are normalized to `[0, 1]`
/// with y pointing down, shoulders above elbows.
#[derive(Debug, Clone)]
pub struct SimulatedPoseSource {
    params: repcount_config::Sim,
    layout: KeypointLayout,
    rng: XorShift32,
    frame: u64,
    frame_limit: Option<u64>,
    opened: bool,
}

impl SimulatedPoseSource {
    pub fn new(params: &repcount_config::Sim, layout: KeypointLayout) -> Self {
        Self {
            params: *params,
            layout,
            rng: XorShift32::new(params.seed),
            frame: 0,
            frame_limit: None,
            opened: false,
        }
    }

    /// Report end of stream after `n` frames.
    pub fn with_frame_limit(mut self, n: u64) -> Self {
        self.frame_limit = Some(n);
        self
    }

    /// Noise-free elbow angle for `frame`, with the arm lagging by
    /// `offset` cycles.
    pub fn ideal_angle(&self, frame: u64, offset: f32) -> f32 {
        let cycle = self.params.cycle_frames.max(2) as f32;
        let t = (frame as f32 / cycle + offset).fract();
        let mid = (self.params.max_angle + self.params.min_angle) / 2.0;
        let amp = (self.params.max_angle - self.params.min_angle) / 2.0;
        mid + amp * (TAU * t).cos()
    }

    fn noisy_angle(&mut self, offset: f32) -> f32 {
        let jitter = self.params.jitter_deg * self.rng.next_signed();
        (self.ideal_angle(self.frame, offset) + jitter).clamp(0.0, 180.0)
    }

    fn is_dropout(&self) -> bool {
        let every = u64::from(self.params.dropout_every);
        every > 0 && self.frame % every == every - 1
    }

    fn synthesize(&mut self) -> Pose {
        let left_deg = self.noisy_angle(0.0);
        let right_deg = self.noisy_angle(self.params.right_phase_offset);
        let wrist_score = if self.is_dropout() { DROPOUT_SCORE } else { SCORE };

        let mut pose = Pose::new(self.layout)
            .with(KeypointName::Nose, Keypoint::new(0.5, 0.15, SCORE));
        // Image left is the subject's right arm.
        place_arm(&mut pose, Arm::Right, 0.35, -1.0, right_deg, wrist_score);
        place_arm(&mut pose, Arm::Left, 0.65, 1.0, left_deg, wrist_score);
        pose
    }
}

#[derive(Clone, Copy)]
enum Arm {
    Left,
    Right,
}

/// Shoulder at `(x, 0.30)`, elbow straight below, wrist swung outward by
/// `deg` from the upper arm.
fn place_arm(pose: &mut Pose, arm: Arm, x: f32, outward: f32, deg: f32, wrist_score: f32) {
    let (s, e, w) = match arm {
        Arm::Left => (
            KeypointName::LeftShoulder,
            KeypointName::LeftElbow,
            KeypointName::LeftWrist,
        ),
        Arm::Right => (
            KeypointName::RightShoulder,
            KeypointName::RightElbow,
            KeypointName::RightWrist,
        ),
    };
    let r = deg.to_radians();
    let (ex, ey) = (x, 0.45);
    pose.set(s, Keypoint::new(x, 0.30, SCORE));
    pose.set(e, Keypoint::new(ex, ey, SCORE));
    pose.set(
        w,
        Keypoint::new(ex + outward * FOREARM * r.sin(), ey - FOREARM * r.cos(), wrist_score),
    );
}

impl PoseSource for SimulatedPoseSource {
    fn open(&mut self) -> Result<(), BoxError> {
        if self.params.open_delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(self.params.open_delay_ms));
        }
        self.opened = true;
        tracing::debug!(
            cycle_frames = self.params.cycle_frames,
            seed = self.params.seed,
            open_delay_ms = self.params.open_delay_ms,
            "simulated pose source opened"
        );
        Ok(())
    }

    fn estimate(&mut self) -> Result<Estimate, BoxError> {
        if !self.opened {
            return Err(Box::new(SimError::NotOpened));
        }
        if let Some(limit) = self.frame_limit
            && self.frame >= limit
        {
            return Ok(Estimate::EndOfStream);
        }
        let pose = self.synthesize();
        self.frame += 1;
        Ok(Estimate::Pose(pose))
    }
}
