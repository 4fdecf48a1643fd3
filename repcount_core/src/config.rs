//! Runtime configuration types for the rep counter.
//!
//! These are what `Session` and the runner consume. They are separate from
//! the TOML-deserialized schema in `repcount_config`; see `conversions`.

use std::time::Duration;

/// Angle thresholds (integer degrees) and the joint confidence gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Above this the arm is extended.
    pub down_angle: u16,
    /// Below this the arm is flexed.
    pub up_angle: u16,
    /// Hysteresis below `down_angle` before `Down` falls back to `Ready`.
    pub min_angle_change: u16,
    /// Joints must score strictly above this.
    pub min_confidence: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            down_angle: 150,
            up_angle: 60,
            min_angle_change: 20,
            min_confidence: 0.3,
        }
    }
}

impl Thresholds {
    /// `Down` drops back to `Ready` below this angle (if not already flexed).
    #[inline]
    pub fn release_angle(&self) -> u16 {
        self.down_angle.saturating_sub(self.min_angle_change)
    }
}

/// Default smoothing window in frames.
pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;
/// Largest accepted smoothing window.
pub const MAX_SMOOTHING_WINDOW: usize = 30;
/// Default cue loudness.
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Frame-loop parameters for `runner::run`.
#[derive(Debug, Clone)]
pub struct RunParams {
    /// Bound on `PoseSource::open`. The only timeout in the loop.
    pub acquire_timeout: Duration,
    /// Target loop rate; 0 runs as fast as inference allows.
    pub frame_rate_hz: u32,
    /// Stop after this many inference attempts.
    pub max_frames: Option<u64>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            acquire_timeout: Duration::from_secs(10),
            frame_rate_hz: 30,
            max_frames: None,
        }
    }
}
