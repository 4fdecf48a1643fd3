#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and pose-trace parsing for the rep counter.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//!   Every section is optional; an empty file yields the defaults.
//! - The pose-trace CSV loader enforces headers and frame ordering so a
//!   recorded session can be replayed deterministically.
use serde::Deserialize;

/// Angle thresholds (integer degrees) and the joint confidence gate.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Thresholds {
    /// Arm counts as extended above this angle.
    pub down_angle: u16,
    /// Arm counts as flexed below this angle.
    pub up_angle: u16,
    /// Hysteresis below `down_angle` before a half-started curl falls back to ready.
    pub min_angle_change: u16,
    /// Joints must score strictly above this to be used.
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

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Smoothing {
    /// Moving-average window in frames (1 disables smoothing).
    pub window: usize,
}

impl Default for Smoothing {
    fn default() -> Self {
        Self { window: 5 }
    }
}

/// Which phase transition completes a repetition.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Count when the arm is extended again after a full curl.
    #[default]
    UpToReady,
    /// Count as soon as the flexed position is reached.
    DownToUp,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(default)]
pub struct Counting {
    pub trigger: Trigger,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Audio {
    /// Cue loudness in [0.0, 1.0]; 0 mutes.
    pub volume: f32,
    pub enabled: bool,
}

impl Default for Audio {
    fn default() -> Self {
        Self {
            volume: 0.5,
            enabled: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Source {
    /// Max time to wait for the camera/model to come up.
    pub acquire_timeout_ms: u64,
    /// Target loop rate; 0 runs unpaced.
    pub frame_rate_hz: u32,
    /// Stop after this many frames (unbounded when absent).
    pub max_frames: Option<u64>,
}

impl Default for Source {
    fn default() -> Self {
        Self {
            acquire_timeout_ms: 10_000,
            frame_rate_hz: 30,
            max_frames: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ModelChoice {
    /// Pick from the device profile.
    #[default]
    Auto,
    MovenetLightning,
    MovenetThunder,
    Blazepose,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(default)]
pub struct Model {
    pub kind: ModelChoice,
}

/// Synthetic curl generator used by the simulated source.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Sim {
    /// Frames per full curl.
    pub cycle_frames: u32,
    /// Elbow angle at full flex (degrees).
    pub min_angle: f32,
    /// Elbow angle at full extension (degrees).
    pub max_angle: f32,
    /// Peak uniform noise added to the elbow angle (degrees).
    pub jitter_deg: f32,
    /// Every Nth frame the wrist confidence drops below any sane gate; 0 disables.
    pub dropout_every: u32,
    /// Fraction of a cycle the right arm lags the left.
    pub right_phase_offset: f32,
    pub seed: u32,
    /// Camera warm-up: `open()` blocks this long before the first frame.
    pub open_delay_ms: u64,
}

impl Default for Sim {
    fn default() -> Self {
        Self {
            cycle_frames: 45,
            min_angle: 40.0,
            max_angle: 170.0,
            jitter_deg: 3.0,
            dropout_every: 0,
            right_phase_offset: 0.5,
            seed: 7,
            open_delay_ms: 0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub thresholds: Thresholds,
    pub smoothing: Smoothing,
    pub counting: Counting,
    pub audio: Audio,
    pub source: Source,
    pub model: Model,
    pub sim: Sim,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Largest accepted smoothing window.
pub const MAX_SMOOTHING_WINDOW: usize = 30;

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Thresholds
        let t = &self.thresholds;
        // Angles are clamped to 0..=180, so both comparisons need room to fire.
        if t.down_angle == 0 || t.down_angle > 179 {
            eyre::bail!("thresholds.down_angle must be in 1..=179");
        }
        if t.up_angle == 0 {
            eyre::bail!("thresholds.up_angle must be >= 1");
        }
        if t.up_angle >= t.down_angle {
            eyre::bail!("thresholds.up_angle must be < thresholds.down_angle");
        }
        if t.down_angle.saturating_sub(t.min_angle_change) < t.up_angle {
            eyre::bail!(
                "thresholds.min_angle_change must keep down_angle - min_angle_change >= up_angle"
            );
        }
        if !(0.0..1.0).contains(&t.min_confidence) {
            eyre::bail!("thresholds.min_confidence must be in [0.0, 1.0)");
        }

        // Smoothing
        if self.smoothing.window == 0 {
            eyre::bail!("smoothing.window must be >= 1");
        }
        if self.smoothing.window > MAX_SMOOTHING_WINDOW {
            eyre::bail!("smoothing.window must be <= {MAX_SMOOTHING_WINDOW}");
        }

        // Audio
        if !(0.0..=1.0).contains(&self.audio.volume) {
            eyre::bail!("audio.volume must be in [0.0, 1.0]");
        }

        // Source
        if self.source.acquire_timeout_ms == 0 {
            eyre::bail!("source.acquire_timeout_ms must be >= 1");
        }
        if self.source.acquire_timeout_ms > 5 * 60 * 1000 {
            eyre::bail!("source.acquire_timeout_ms is unreasonably large (>5min)");
        }
        if self.source.frame_rate_hz > 1000 {
            eyre::bail!("source.frame_rate_hz must be <= 1000");
        }
        if self.source.max_frames == Some(0) {
            eyre::bail!("source.max_frames must be >= 1 when set");
        }

        // Sim
        let s = &self.sim;
        if s.cycle_frames < 2 {
            eyre::bail!("sim.cycle_frames must be >= 2");
        }
        if !(0.0..=180.0).contains(&s.min_angle) || !(0.0..=180.0).contains(&s.max_angle) {
            eyre::bail!("sim.min_angle and sim.max_angle must be in [0, 180]");
        }
        if s.min_angle >= s.max_angle {
            eyre::bail!("sim.min_angle must be < sim.max_angle");
        }
        if !(s.jitter_deg >= 0.0 && s.jitter_deg.is_finite()) {
            eyre::bail!("sim.jitter_deg must be >= 0");
        }
        if !(0.0..1.0).contains(&s.right_phase_offset) {
            eyre::bail!("sim.right_phase_offset must be in [0.0, 1.0)");
        }
        if s.open_delay_ms > 60_000 {
            eyre::bail!("sim.open_delay_ms must be <= 60000");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {r:?}");
        }

        Ok(())
    }
}

/// Pose-trace CSV schema: one row per detected keypoint.
///
/// Expected headers:
/// frame,keypoint,x,y,score
///
/// Example:
/// frame,keypoint,x,y,score
/// 0,left_shoulder,320.0,120.5,0.91
/// 0,left_elbow,322.0,210.0,0.88
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TraceRow {
    pub frame: u64,
    pub keypoint: String,
    pub x: f32,
    pub y: f32,
    pub score: f32,
}

/// Rows sharing one frame number.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceFrame {
    pub frame: u64,
    pub rows: Vec<TraceRow>,
}

/// A validated recording, grouped by frame in ascending order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PoseTrace {
    pub frames: Vec<TraceFrame>,
}

impl PoseTrace {
    /// Group rows by frame. Frame numbers must be non-decreasing; scores in
    /// [0, 1]; coordinates finite.
    pub fn from_rows(rows: Vec<TraceRow>) -> eyre::Result<Self> {
        if rows.is_empty() {
            eyre::bail!("pose trace is empty");
        }
        let mut frames: Vec<TraceFrame> = Vec::new();
        for (i, row) in rows.into_iter().enumerate() {
            if !(row.x.is_finite() && row.y.is_finite()) {
                eyre::bail!("trace row {i}: non-finite coordinates");
            }
            if !(0.0..=1.0).contains(&row.score) {
                eyre::bail!("trace row {i}: score {} outside [0, 1]", row.score);
            }
            match frames.last_mut() {
                Some(last) if last.frame == row.frame => last.rows.push(row),
                Some(last) if last.frame > row.frame => {
                    eyre::bail!(
                        "trace row {i}: frame {} goes backwards (previous {})",
                        row.frame,
                        last.frame
                    );
                }
                _ => frames.push(TraceFrame {
                    frame: row.frame,
                    rows: vec![row],
                }),
            }
        }
        Ok(Self { frames })
    }

    /// Frames spanned by the recording, gaps included.
    pub fn span(&self) -> u64 {
        match (self.frames.first(), self.frames.last()) {
            (Some(a), Some(b)) => (b.frame - a.frame).saturating_add(1),
            _ => 0,
        }
    }
}

impl TryFrom<Vec<TraceRow>> for PoseTrace {
    type Error = eyre::Report;
    fn try_from(rows: Vec<TraceRow>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

pub fn load_pose_trace_csv(path: &std::path::Path) -> eyre::Result<PoseTrace> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open pose trace CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["frame", "keypoint", "x", "y", "score"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "pose trace CSV must have headers 'frame,keypoint,x,y,score', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<TraceRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    PoseTrace::try_from(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(frame: u64, keypoint: &str) -> TraceRow {
        TraceRow {
            frame,
            keypoint: keypoint.to_string(),
            x: 1.0,
            y: 2.0,
            score: 0.9,
        }
    }

    #[test]
    fn empty_config_is_valid_defaults() {
        let cfg = load_toml("").expect("parse");
        cfg.validate().expect("defaults validate");
        assert_eq!(cfg.thresholds.down_angle, 150);
        assert_eq!(cfg.smoothing.window, 5);
        assert_eq!(cfg.counting.trigger, Trigger::UpToReady);
        assert_eq!(cfg.model.kind, ModelChoice::Auto);
    }

    #[test]
    fn trace_groups_rows_and_reports_span() {
        let trace =
            PoseTrace::from_rows(vec![row(3, "nose"), row(3, "left_eye"), row(7, "nose")])
                .expect("valid");
        assert_eq!(trace.frames.len(), 2);
        assert_eq!(trace.frames[0].rows.len(), 2);
        assert_eq!(trace.span(), 5);
    }

    #[test]
    fn trace_rejects_backwards_frames() {
        let err = PoseTrace::from_rows(vec![row(2, "nose"), row(1, "nose")]).unwrap_err();
        assert!(err.to_string().contains("goes backwards"));
    }
}
