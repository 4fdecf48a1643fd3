//! Builder for `Session`.
//!
//! Validation lives in one place (`validate_and_build`) so sessions built
//! from a config file and sessions built by hand get the same checks.

use std::sync::Arc;

use repcount_traits::clock::{Clock, MonotonicClock};

use crate::config::{DEFAULT_SMOOTHING_WINDOW, DEFAULT_VOLUME, MAX_SMOOTHING_WINDOW, Thresholds};
use crate::error::{BuildError, Result};
use crate::phase::RepTrigger;
use crate::session::Session;

#[derive(Default)]
pub struct SessionBuilder {
    thresholds: Option<Thresholds>,
    window: Option<usize>,
    trigger: Option<RepTrigger>,
    volume: Option<f32>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed every setting from a validated config file.
    ///
    /// A disabled `[audio]` section maps to volume 0.
    pub fn from_config(cfg: &repcount_config::Config) -> Self {
        let volume = if cfg.audio.enabled {
            cfg.audio.volume
        } else {
            0.0
        };
        Self::new()
            .with_thresholds(Thresholds::from(&cfg.thresholds))
            .with_smoothing_window(cfg.smoothing.window)
            .with_trigger(RepTrigger::from(cfg.counting.trigger))
            .with_volume(volume)
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }
    pub fn with_smoothing_window(mut self, window: usize) -> Self {
        self.window = Some(window);
        self
    }
    pub fn with_trigger(mut self, trigger: RepTrigger) -> Self {
        self.trigger = Some(trigger);
        self
    }
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }
    /// Provide a custom clock; defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<Session> {
        validate_and_build(
            self.thresholds.unwrap_or_default(),
            self.window.unwrap_or(DEFAULT_SMOOTHING_WINDOW),
            self.trigger.unwrap_or_default(),
            self.volume.unwrap_or(DEFAULT_VOLUME),
            self.clock,
        )
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

fn validate_and_build(
    thresholds: Thresholds,
    window: usize,
    trigger: RepTrigger,
    volume: f32,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
) -> Result<Session> {
    // ── Validation ───────────────────────────────────────────────────────────
    // `angle > down` and `angle < up` must both be reachable in 0..=180.
    if thresholds.down_angle == 0 || thresholds.down_angle > 179 {
        return Err(invalid("down_angle must be in 1..=179"));
    }
    if thresholds.up_angle == 0 {
        return Err(invalid("up_angle must be >= 1"));
    }
    if thresholds.up_angle >= thresholds.down_angle {
        return Err(invalid("up_angle must be below down_angle"));
    }
    if thresholds.release_angle() < thresholds.up_angle
        || thresholds.min_angle_change > thresholds.down_angle
    {
        return Err(invalid(
            "min_angle_change must keep down_angle - min_angle_change >= up_angle",
        ));
    }
    if !(0.0..1.0).contains(&thresholds.min_confidence) {
        return Err(invalid("min_confidence must be in [0, 1)"));
    }
    if !(1..=MAX_SMOOTHING_WINDOW).contains(&window) {
        return Err(invalid("smoothing window must be in 1..=30"));
    }
    if !(0.0..=1.0).contains(&volume) {
        return Err(invalid("volume must be in [0, 1]"));
    }

    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(c) => c,
        None => Arc::new(MonotonicClock::new()),
    };

    Ok(Session::from_parts(thresholds, window, trigger, volume, clock))
}
