#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core rep-counting logic (camera- and model-agnostic).
//!
//! Pose inference and audio go through `repcount_traits::PoseSource` and
//! `repcount_traits::AudioCue`; output goes through `render::RenderSink`.
//!
//! ## Pipeline
//!
//! Per arm and per frame: confidence gate (`tracker`), elbow angle
//! (`angle`), moving average (`smoothing`), phase transition (`phase`),
//! rep count. `Session` runs a left and a right tracker side by side and
//! owns the session clock and frame-rate meter. `runner::run` drives a
//! session from a pose source on a dedicated inference thread (`worker`).
//!
//! ## Units
//!
//! Angles are integer degrees in `0..=180`. Keypoint coordinates are
//! whatever the source produces (pixels or normalized); only their ratios
//! matter.

pub mod angle;
pub mod builder;
pub mod config;
pub mod conversions;
pub mod error;
pub mod fps;
pub mod mocks;
pub mod model;
pub mod phase;
pub mod render;
pub mod runner;
pub mod session;
pub mod smoothing;
pub mod source_error;
pub mod tracker;
pub mod util;
pub mod worker;

pub use angle::joint_angle;
pub use builder::SessionBuilder;
pub use config::{DEFAULT_SMOOTHING_WINDOW, DEFAULT_VOLUME, MAX_SMOOTHING_WINDOW, RunParams, Thresholds};
pub use error::{BuildError, RepError, Result};
pub use fps::FpsMeter;
pub use model::{DeviceClass, DeviceProfile, ModelKind, ModelPreference};
pub use phase::{Phase, RepTrigger};
pub use render::{NullSink, RenderSink};
pub use runner::{RunSummary, StopReason, run};
pub use session::{FrameReport, Session};
pub use smoothing::AngleSmoother;
pub use tracker::{ArmSide, ArmTracker, ArmUpdate, JointSample};
