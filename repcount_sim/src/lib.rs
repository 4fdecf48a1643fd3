//! Stand-in collaborators for running the rep counter without a camera,
//! a pose model or a speaker.
//!
//! - `SimulatedPoseSource`: synthetic curls, deterministic per seed
//! - `ReplayPoseSource`: plays back a recorded pose trace
//! - `TerminalBell`: rings the terminal bell as the rep cue

pub mod bell;
pub mod error;
pub mod replay;
pub mod synth;

pub use bell::TerminalBell;
pub use error::SimError;
pub use replay::ReplayPoseSource;
pub use synth::SimulatedPoseSource;
