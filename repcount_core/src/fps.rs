//! Frame-rate meter: one rounded sample per elapsed second, averaged over a
//! bounded history.

use std::collections::VecDeque;
use std::time::Instant;

use crate::util::{MILLIS_PER_SEC, div_round_half_up};

/// Number of per-second samples kept for the average.
pub const FPS_HISTORY: usize = 60;

#[derive(Debug, Clone)]
pub struct FpsMeter {
    window_start: Option<Instant>,
    frames: u32,
    history: VecDeque<u32>,
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsMeter {
    pub fn new() -> Self {
        Self {
            window_start: None,
            frames: 0,
            history: VecDeque::with_capacity(FPS_HISTORY),
        }
    }

    /// Count one processed frame at `now`.
    ///
    /// Once at least one second has passed since the current window opened,
    /// `round(frames * 1000 / elapsed_ms)` is recorded and returned.
    pub fn tick(&mut self, now: Instant) -> Option<u32> {
        let start = *self.window_start.get_or_insert(now);
        self.frames = self.frames.saturating_add(1);

        let elapsed_ms = now.saturating_duration_since(start).as_millis();
        if elapsed_ms < u128::from(MILLIS_PER_SEC) {
            return None;
        }
        let elapsed_ms = u32::try_from(elapsed_ms).unwrap_or(u32::MAX);
        let fps = div_round_half_up(self.frames.saturating_mul(1000), elapsed_ms);

        if self.history.len() == FPS_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(fps);
        self.window_start = Some(now);
        self.frames = 0;
        Some(fps)
    }

    /// Most recent one-second sample.
    pub fn current(&self) -> Option<u32> {
        self.history.back().copied()
    }

    /// Rounded mean of the recorded samples, 0 before the first sample.
    pub fn average(&self) -> u32 {
        let sum: u32 = self.history.iter().sum();
        div_round_half_up(sum, self.history.len() as u32)
    }

    pub fn samples(&self) -> usize {
        self.history.len()
    }

    pub fn reset(&mut self) {
        self.window_start = None;
        self.frames = 0;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn samples_once_per_second() {
        let mut m = FpsMeter::new();
        let t0 = Instant::now();
        // 30 frames spaced 33 ms apart, then the frame that crosses 1 s
        for i in 0..30u64 {
            assert_eq!(m.tick(t0 + Duration::from_millis(i * 33)), None);
        }
        let fps = m.tick(t0 + Duration::from_millis(1000));
        assert_eq!(fps, Some(31));
        assert_eq!(m.average(), 31);
    }

    #[test]
    fn average_is_rounded_mean_of_bounded_history() {
        let mut m = FpsMeter::new();
        let mut t = Instant::now();
        m.tick(t);
        for _ in 0..(FPS_HISTORY + 10) {
            t += Duration::from_millis(500);
            m.tick(t);
            t += Duration::from_millis(500);
            m.tick(t);
        }
        assert_eq!(m.samples(), FPS_HISTORY);
        assert_eq!(m.average(), 2);
    }

    #[test]
    fn empty_meter_averages_zero() {
        let m = FpsMeter::new();
        assert_eq!(m.average(), 0);
        assert_eq!(m.current(), None);
    }
}
