//! Moving-average filter over recent raw angles.

use std::collections::VecDeque;

use crate::util::div_round_half_up;

/// Fixed-capacity FIFO of raw angles; output is the rounded mean.
///
/// Invariant: `len() <= window()` at all times, including after the window
/// is shrunk at runtime.
#[derive(Debug, Clone)]
pub struct AngleSmoother {
    window: usize,
    history: VecDeque<u16>,
}

impl AngleSmoother {
    /// `window` is clamped to at least 1.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            history: VecDeque::with_capacity(window),
        }
    }

    /// Push a raw angle and return the smoothed value.
    pub fn push(&mut self, raw: u16) -> u16 {
        self.history.push_back(raw);
        while self.history.len() > self.window {
            self.history.pop_front();
        }
        self.mean().unwrap_or(raw)
    }

    /// Rounded mean of the current history, `None` when empty.
    pub fn mean(&self) -> Option<u16> {
        if self.history.is_empty() {
            return None;
        }
        let sum: u32 = self.history.iter().map(|&a| u32::from(a)).sum();
        Some(div_round_half_up(sum, self.history.len() as u32) as u16)
    }

    /// Change capacity; oldest samples beyond the new window are dropped now.
    pub fn set_window(&mut self, window: usize) {
        self.window = window.max(1);
        while self.history.len() > self.window {
            self.history.pop_front();
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Raw samples, oldest first.
    pub fn history(&self) -> impl Iterator<Item = u16> + '_ {
        self.history.iter().copied()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}
