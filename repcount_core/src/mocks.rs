//! Test and helper doubles for repcount_core

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use repcount_traits::{AudioCue, BoxError, Estimate, PoseSource};

use crate::render::RenderSink;
use crate::session::FrameReport;

/// Replays a fixed list of estimate outcomes, then reports end of stream.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: VecDeque<Result<Estimate, String>>,
    open_delay: Option<Duration>,
    open_error: Option<String>,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = Result<Estimate, String>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Block in `open()` for `d` (real time).
    pub fn with_open_delay(mut self, d: Duration) -> Self {
        self.open_delay = Some(d);
        self
    }

    pub fn with_open_error(mut self, msg: impl Into<String>) -> Self {
        self.open_error = Some(msg.into());
        self
    }
}

impl PoseSource for ScriptedSource {
    fn open(&mut self) -> Result<(), BoxError> {
        if let Some(d) = self.open_delay {
            std::thread::sleep(d);
        }
        match &self.open_error {
            Some(msg) => Err(Box::new(std::io::Error::other(msg.clone()))),
            None => Ok(()),
        }
    }

    fn estimate(&mut self) -> Result<Estimate, BoxError> {
        match self.script.pop_front() {
            Some(Ok(est)) => Ok(est),
            Some(Err(msg)) => Err(Box::new(std::io::Error::other(msg))),
            None => Ok(Estimate::EndOfStream),
        }
    }
}

/// Counts cues; clones share the counter.
#[derive(Debug, Default, Clone)]
pub struct CountingAudio {
    plays: Arc<AtomicU32>,
}

impl CountingAudio {
    pub fn plays(&self) -> u32 {
        self.plays.load(Ordering::Relaxed)
    }
}

impl AudioCue for CountingAudio {
    fn play(&mut self, _volume: f32) -> Result<(), BoxError> {
        self.plays.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Every cue fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingAudio;

impl AudioCue for FailingAudio {
    fn play(&mut self, _volume: f32) -> Result<(), BoxError> {
        Err(Box::new(std::io::Error::other("audio device busy")))
    }
}

/// Keeps every report for later inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub reports: Vec<FrameReport>,
    pub no_person: Vec<u64>,
}

impl RenderSink for RecordingSink {
    fn render(&mut self, report: &FrameReport) {
        self.reports.push(report.clone());
    }

    fn no_person(&mut self, frame: u64) {
        self.no_person.push(frame);
    }
}
