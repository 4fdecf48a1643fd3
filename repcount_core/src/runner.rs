use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use repcount_traits::{AudioCue, Clock, Estimate, PoseSource};

use crate::config::RunParams;
use crate::error::{RepError, Result as CoreResult};
use crate::render::RenderSink;
use crate::session::{FrameReport, Session};
use crate::worker::InferenceWorker;

/// Why the frame loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source reported it has no more frames.
    EndOfStream,
    /// `RunParams::max_frames` inference attempts were made.
    MaxFrames,
    /// The shutdown flag was raised.
    Shutdown,
    /// The inference thread died; the source cannot produce more frames.
    SourceLost,
}

impl StopReason {
    pub fn as_str(self) -> &'static str {
        match self {
            StopReason::EndOfStream => "end_of_stream",
            StopReason::MaxFrames => "max_frames",
            StopReason::Shutdown => "shutdown",
            StopReason::SourceLost => "source_lost",
        }
    }
}

/// Totals at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Inference attempts, including failed ones.
    pub frames: u64,
    pub failed_frames: u64,
    pub no_person_frames: u64,
    pub left_reps: u32,
    pub right_reps: u32,
    pub total_reps: u32,
    pub elapsed: Duration,
    pub avg_fps: u32,
    pub stop: StopReason,
}

/// Drive `session` from `source` until end of stream, `max_frames`,
/// `shutdown`, or the inference thread dying.
///
/// Fails only if the source cannot be acquired within
/// `params.acquire_timeout`. Per-frame inference errors are logged and
/// skipped; audio cue errors never affect counting.
pub fn run<S, A, R>(
    source: S,
    audio: &mut A,
    sink: &mut R,
    session: &mut Session,
    params: &RunParams,
    shutdown: &AtomicBool,
) -> CoreResult<RunSummary>
where
    S: PoseSource + Send + 'static,
    A: AudioCue + ?Sized,
    R: RenderSink + ?Sized,
{
    let acquire_ms = u64::try_from(params.acquire_timeout.as_millis()).unwrap_or(u64::MAX);
    tracing::info!(
        acquire_timeout_ms = acquire_ms,
        frame_rate_hz = params.frame_rate_hz,
        max_frames = ?params.max_frames,
        "session start"
    );

    let mut worker = InferenceWorker::spawn(source, params.acquire_timeout)?;
    session.start();

    let clock = session.clock().clone();
    let period = (params.frame_rate_hz > 0)
        .then(|| Duration::from_micros(crate::util::period_us(params.frame_rate_hz)));

    let mut attempts: u64 = 0;
    let mut failed: u64 = 0;
    let mut no_person: u64 = 0;

    let stop = loop {
        if shutdown.load(Ordering::Relaxed) {
            break StopReason::Shutdown;
        }
        if let Some(max) = params.max_frames
            && attempts >= max
        {
            break StopReason::MaxFrames;
        }

        let frame_start = clock.now();
        attempts += 1;

        match worker.infer() {
            Ok(Estimate::Pose(pose)) => {
                if let Some(report) = session.process_pose(&pose) {
                    play_cues(audio, session.volume(), &report);
                    sink.render(&report);
                }
            }
            Ok(Estimate::NoPerson) => {
                no_person += 1;
                let frame = session.record_frame();
                sink.no_person(frame);
            }
            Ok(Estimate::EndOfStream) => break StopReason::EndOfStream,
            Err(RepError::WorkerLost(reason)) => {
                failed += 1;
                tracing::error!(%reason, attempt = attempts, "pose worker lost, ending session");
                break StopReason::SourceLost;
            }
            Err(e) => {
                failed += 1;
                session.record_frame();
                tracing::warn!(error = %e, attempt = attempts, "pose estimation failed");
            }
        }

        if let Some(period) = period {
            let spent = clock.elapsed_since(frame_start);
            if spent < period {
                clock.sleep(period - spent);
            }
        }
    };

    let elapsed = session.elapsed().unwrap_or(Duration::ZERO);
    let summary = RunSummary {
        frames: attempts,
        failed_frames: failed,
        no_person_frames: no_person,
        left_reps: session.arm(crate::ArmSide::Left).rep_count(),
        right_reps: session.arm(crate::ArmSide::Right).rep_count(),
        total_reps: session.total_reps(),
        elapsed,
        avg_fps: session.fps().average(),
        stop,
    };
    session.stop();
    drop(worker);

    tracing::info!(
        total_reps = summary.total_reps,
        frames = summary.frames,
        failed = summary.failed_frames,
        stop = summary.stop.as_str(),
        "session end"
    );
    Ok(summary)
}

/// One cue per completed rep; muted at volume 0. Failures are logged only.
fn play_cues<A: AudioCue + ?Sized>(audio: &mut A, volume: f32, report: &FrameReport) {
    if volume <= 0.0 {
        return;
    }
    for _ in 0..report.reps_completed() {
        if let Err(e) = audio.play(volume) {
            tracing::warn!(error = %e, "audio cue failed");
        }
    }
}
