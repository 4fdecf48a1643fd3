//! Session assembly: config mapping, source selection, and the run itself.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use eyre::WrapErr;
use repcount_core::error::{RepError, Result as CoreResult};
use repcount_core::{
    ArmSide, DeviceProfile, JointSample, ModelKind, ModelPreference, RepTrigger, RunParams,
    RunSummary, SessionBuilder, Thresholds,
};
use repcount_traits::{Estimate, Keypoint, PoseSource};
use serde_json::json;

use crate::cli::{SourceKind, TriggerArg};
use crate::render::{ConsoleSink, JsonLinesSink};

/// Command-line overrides for `run`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub source: SourceKind,
    pub trace: Option<PathBuf>,
    pub frames: Option<u64>,
    pub fps: Option<u32>,
    pub trigger: Option<TriggerArg>,
    pub window: Option<usize>,
    pub volume: Option<f32>,
    pub quiet: bool,
}

fn config_err(msg: impl Into<String>) -> eyre::Report {
    eyre::Report::new(RepError::Config(msg.into()))
}

fn pick_model(cfg: &repcount_config::Config) -> ModelKind {
    let pref = ModelPreference::from(cfg.model.kind);
    let model = pref.resolve(&DeviceProfile::detect());
    tracing::info!(model = model.name(), auto = matches!(pref, ModelPreference::Auto), "pose model selected");
    model
}

fn build_source(
    cfg: &repcount_config::Config,
    opts: &RunOptions,
) -> CoreResult<Box<dyn PoseSource + Send>> {
    let layout = pick_model(cfg).layout();
    let source: Box<dyn PoseSource + Send> = match opts.source {
        SourceKind::Sim => Box::new(repcount_sim::SimulatedPoseSource::new(&cfg.sim, layout)),
        SourceKind::Replay => {
            let path = opts
                .trace
                .as_deref()
                .ok_or_else(|| config_err("--trace is required with --source replay"))?;
            let trace = repcount_config::load_pose_trace_csv(path)
                .map_err(|e| config_err(e.to_string()))?;
            tracing::info!(frames = trace.frames.len(), span = trace.span(), "pose trace loaded");
            let replay = repcount_sim::ReplayPoseSource::new(&trace, layout)
                .map_err(|e| config_err(e.to_string()))?;
            Box::new(replay)
        }
    };
    Ok(source)
}

pub fn run_session(
    cfg: &repcount_config::Config,
    opts: &RunOptions,
    json: bool,
    shutdown: Arc<AtomicBool>,
) -> CoreResult<RunSummary> {
    let mut builder = SessionBuilder::from_config(cfg);
    if let Some(t) = opts.trigger {
        builder = builder.with_trigger(RepTrigger::from(t));
    }
    if let Some(w) = opts.window {
        builder = builder.with_smoothing_window(w);
    }
    if let Some(v) = opts.volume {
        builder = builder.with_volume(v);
    }
    let mut session = builder.build()?;

    let mut params = RunParams::from(&cfg.source);
    if opts.frames.is_some() {
        params.max_frames = opts.frames;
    }
    if let Some(hz) = opts.fps {
        params.frame_rate_hz = hz;
    }

    let source = build_source(cfg, opts)?;
    let mut audio = repcount_sim::TerminalBell::stderr();
    let stdout = std::io::stdout();

    let summary = match (opts.quiet, json) {
        (true, _) => repcount_core::run(
            source,
            &mut audio,
            &mut repcount_core::NullSink,
            &mut session,
            &params,
            &shutdown,
        )?,
        (false, true) => repcount_core::run(
            source,
            &mut audio,
            &mut JsonLinesSink::new(stdout.lock()),
            &mut session,
            &params,
            &shutdown,
        )?,
        (false, false) => repcount_core::run(
            source,
            &mut audio,
            &mut ConsoleSink::new(stdout.lock()),
            &mut session,
            &params,
            &shutdown,
        )?,
    };
    Ok(summary)
}

pub fn summary_json(s: &RunSummary) -> serde_json::Value {
    json!({
        "event": "summary",
        "total_reps": s.total_reps,
        "left_reps": s.left_reps,
        "right_reps": s.right_reps,
        "frames": s.frames,
        "failed_frames": s.failed_frames,
        "no_person_frames": s.no_person_frames,
        "elapsed": repcount_core::util::format_mmss(s.elapsed),
        "elapsed_ms": u64::try_from(s.elapsed.as_millis()).unwrap_or(u64::MAX),
        "avg_fps": s.avg_fps,
        "stop": s.stop.as_str(),
    })
}

pub fn summary_text(s: &RunSummary) -> String {
    format!(
        "Session complete: {} reps (left {}, right {}) in {}, {} frames, avg {} fps",
        s.total_reps,
        s.left_reps,
        s.right_reps,
        repcount_core::util::format_mmss(s.elapsed),
        s.frames,
        s.avg_fps
    )
}

/// Validate the config, then drive a fresh session through one full curl
/// on both arms and confirm exactly one rep each.
pub fn self_check(cfg: &repcount_config::Config) -> CoreResult<()> {
    cfg.validate().map_err(|e| config_err(e.to_string()))?;
    let thresholds = Thresholds::from(&cfg.thresholds);

    for trigger in [RepTrigger::UpToReady, RepTrigger::DownToUp] {
        let mut session = SessionBuilder::new()
            .with_thresholds(thresholds)
            .with_smoothing_window(1)
            .with_trigger(trigger)
            .build()?;
        session.start();
        let extended = thresholds.down_angle.saturating_add(10).min(180);
        let flexed = thresholds.up_angle.saturating_sub(5);
        for deg in [extended, extended, flexed, flexed, extended] {
            let sample = arm_at(f32::from(deg));
            session.process_joints(&sample, &sample);
        }
        for side in ArmSide::BOTH {
            let reps = session.arm(side).rep_count();
            if reps != 1 {
                return Err(eyre::Report::new(RepError::State(format!(
                    "{} arm counted {reps} reps for one curl ({})",
                    side.label(),
                    trigger.name()
                ))));
            }
        }
    }

    let mut sim = repcount_sim::SimulatedPoseSource::new(&cfg.sim, pick_model(cfg).layout())
        .with_frame_limit(1);
    sim.open()
        .map_err(|e| eyre::Report::new(RepError::Acquire(e.to_string())))
        .wrap_err("simulated source")?;
    match sim.estimate() {
        Ok(Estimate::Pose(_)) => Ok(()),
        Ok(other) => Err(eyre::Report::new(RepError::Source(format!(
            "simulated source returned {other:?}"
        )))),
        Err(e) => Err(eyre::Report::new(RepError::Source(e.to_string()))),
    }
}

/// Shoulder straight above the elbow, forearm swung to `deg`.
fn arm_at(deg: f32) -> JointSample {
    let r = deg.to_radians();
    JointSample::new(
        Keypoint::new(0.0, 0.0, 1.0),
        Keypoint::new(0.0, 100.0, 1.0),
        Keypoint::new(100.0 * r.sin(), 100.0 - 100.0 * r.cos(), 1.0),
    )
}

pub fn device_report(gpu: bool, mobile: bool) -> (DeviceProfile, ModelKind) {
    let profile = DeviceProfile::detect().with_gpu(gpu).with_mobile(mobile);
    let model = profile.recommend();
    (profile, model)
}
