//! Curl phase classification and the rep-completion contract.

use std::fmt;

use crate::config::Thresholds;

/// Motion phase of one arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Waiting for the arm to extend.
    #[default]
    Ready,
    /// Arm extended, curl not yet completed.
    Down,
    /// Arm flexed.
    Up,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Ready => "Ready",
            Phase::Down => "Down",
            Phase::Up => "Up",
        }
    }

    /// Phase after observing `angle` (smoothed, degrees).
    ///
    /// | from  | condition                                   | to    |
    /// |-------|---------------------------------------------|-------|
    /// | Ready | angle > down                                | Down  |
    /// | Down  | angle < up                                  | Up    |
    /// | Down  | up <= angle < down - min_angle_change       | Ready |
    /// | Up    | angle > down                                | Ready |
    ///
    /// Anything else keeps the current phase.
    pub fn next(self, angle: u16, t: &Thresholds) -> Phase {
        match self {
            Phase::Ready if angle > t.down_angle => Phase::Down,
            Phase::Down if angle < t.up_angle => Phase::Up,
            Phase::Down if angle < t.release_angle() => Phase::Ready,
            Phase::Up if angle > t.down_angle => Phase::Ready,
            current => current,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which transition counts as a completed repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepTrigger {
    /// Count when the arm is extended again after having been flexed.
    /// A rep needs the full down → up → ready cycle.
    #[default]
    UpToReady,
    /// Count as soon as the flexed position is reached.
    DownToUp,
}

impl RepTrigger {
    #[inline]
    pub fn fires(self, from: Phase, to: Phase) -> bool {
        match self {
            RepTrigger::UpToReady => from == Phase::Up && to == Phase::Ready,
            RepTrigger::DownToUp => from == Phase::Down && to == Phase::Up,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RepTrigger::UpToReady => "up_to_ready",
            RepTrigger::DownToUp => "down_to_up",
        }
    }
}
