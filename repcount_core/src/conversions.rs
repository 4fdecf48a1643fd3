//! `From` implementations bridging `repcount_config` types to runtime types.

use std::time::Duration;

use crate::config::{RunParams, Thresholds};
use crate::model::ModelPreference;
use crate::phase::RepTrigger;

// ── Thresholds ───────────────────────────────────────────────────────────────

impl From<&repcount_config::Thresholds> for Thresholds {
    fn from(c: &repcount_config::Thresholds) -> Self {
        Self {
            down_angle: c.down_angle,
            up_angle: c.up_angle,
            min_angle_change: c.min_angle_change,
            min_confidence: c.min_confidence,
        }
    }
}

// ── RepTrigger ───────────────────────────────────────────────────────────────

impl From<repcount_config::Trigger> for RepTrigger {
    fn from(t: repcount_config::Trigger) -> Self {
        match t {
            repcount_config::Trigger::UpToReady => RepTrigger::UpToReady,
            repcount_config::Trigger::DownToUp => RepTrigger::DownToUp,
        }
    }
}

// ── RunParams ────────────────────────────────────────────────────────────────

impl From<&repcount_config::Source> for RunParams {
    fn from(c: &repcount_config::Source) -> Self {
        Self {
            acquire_timeout: Duration::from_millis(c.acquire_timeout_ms),
            frame_rate_hz: c.frame_rate_hz,
            max_frames: c.max_frames,
        }
    }
}

// ── ModelPreference ──────────────────────────────────────────────────────────

impl From<repcount_config::ModelChoice> for ModelPreference {
    fn from(c: repcount_config::ModelChoice) -> Self {
        use crate::model::ModelKind;
        match c {
            repcount_config::ModelChoice::Auto => ModelPreference::Auto,
            repcount_config::ModelChoice::MovenetLightning => {
                ModelPreference::Fixed(ModelKind::MoveNetLightning)
            }
            repcount_config::ModelChoice::MovenetThunder => {
                ModelPreference::Fixed(ModelKind::MoveNetThunder)
            }
            repcount_config::ModelChoice::Blazepose => ModelPreference::Fixed(ModelKind::BlazePose),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_maps_to_default_runtime_values() {
        let cfg = repcount_config::Config::default();
        assert_eq!(Thresholds::from(&cfg.thresholds), Thresholds::default());
        assert_eq!(RepTrigger::from(cfg.counting.trigger), RepTrigger::default());
        let run = RunParams::from(&cfg.source);
        assert_eq!(run.acquire_timeout, Duration::from_secs(10));
        assert_eq!(run.frame_rate_hz, 30);
        assert_eq!(ModelPreference::from(cfg.model.kind), ModelPreference::Auto);
    }
}
