//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "repcount", version, about = "Bicep curl rep counter")]
pub struct Cli {
    /// Path to config TOML; built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit JSON lines (logs, frames, summary, errors) instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins when set
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Where poses come from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum SourceKind {
    /// Synthetic curls from the [sim] section
    #[default]
    Sim,
    /// Recorded pose trace CSV (requires --trace)
    Replay,
}

/// Which transition counts as a rep.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum TriggerArg {
    UpToReady,
    DownToUp,
}

impl From<TriggerArg> for repcount_core::RepTrigger {
    fn from(t: TriggerArg) -> Self {
        match t {
            TriggerArg::UpToReady => repcount_core::RepTrigger::UpToReady,
            TriggerArg::DownToUp => repcount_core::RepTrigger::DownToUp,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Count reps from a pose source until it ends, --frames is reached, or Ctrl-C
    Run {
        #[arg(long, value_enum, default_value_t = SourceKind::Sim)]
        source: SourceKind,
        /// Pose trace CSV (frame,keypoint,x,y,score) for --source replay
        #[arg(long, value_name = "FILE")]
        trace: Option<PathBuf>,
        /// Stop after this many frames (overrides source.max_frames)
        #[arg(long, value_name = "N")]
        frames: Option<u64>,
        /// Target frame rate, 0 = unpaced (overrides source.frame_rate_hz)
        #[arg(long, value_name = "HZ")]
        fps: Option<u32>,
        /// Rep trigger (overrides counting.trigger)
        #[arg(long, value_enum)]
        trigger: Option<TriggerArg>,
        /// Smoothing window in frames, 1..=30 (overrides smoothing.window)
        #[arg(long, value_name = "FRAMES")]
        window: Option<usize>,
        /// Cue volume in [0, 1]; 0 mutes (overrides audio.volume)
        #[arg(long)]
        volume: Option<f32>,
        /// Only print the final summary
        #[arg(long, action = ArgAction::SetTrue)]
        quiet: bool,
    },
    /// Validate config and run the counter against a known curl sequence
    SelfCheck,
    /// Show the detected device profile and the model it would pick
    Device {
        /// Assume a GPU is available
        #[arg(long, action = ArgAction::SetTrue)]
        gpu: bool,
        /// Treat the device as mobile
        #[arg(long, action = ArgAction::SetTrue)]
        mobile: bool,
    },
}
