//! Boundary types and collaborator traits shared across the repcount stack.
//!
//! The core never talks to a camera, a pose model or a speaker directly; it
//! goes through `PoseSource` and `AudioCue`. Implementations live in
//! `repcount_sim` (and in tests).

pub mod clock;
pub mod pose;

pub use clock::{Clock, MonotonicClock};
pub use pose::{Estimate, Keypoint, KeypointLayout, KeypointName, Pose, UnknownKeypoint};

/// Error type used at the trait boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Produces one pose estimate per frame (camera + pose model).
pub trait PoseSource {
    /// Acquire the underlying stream. Called once, before the first `estimate`.
    fn open(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Run inference on the next frame.
    fn estimate(&mut self) -> Result<Estimate, BoxError>;
}

/// Short audible cue played when a repetition completes.
pub trait AudioCue {
    /// `volume` is in `0.0..=1.0`.
    fn play(&mut self, volume: f32) -> Result<(), BoxError>;
}

impl<T: PoseSource + ?Sized> PoseSource for Box<T> {
    fn open(&mut self) -> Result<(), BoxError> {
        (**self).open()
    }

    fn estimate(&mut self) -> Result<Estimate, BoxError> {
        (**self).estimate()
    }
}

impl<T: AudioCue + ?Sized> AudioCue for Box<T> {
    fn play(&mut self, volume: f32) -> Result<(), BoxError> {
        (**self).play(volume)
    }
}
