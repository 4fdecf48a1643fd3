//! Text and JSON-lines render sinks.

use std::io::Write;

use repcount_core::{ArmUpdate, FrameReport, RenderSink};
use serde_json::json;

fn changed(report: &FrameReport) -> bool {
    report.left.phase_changed()
        || report.right.phase_changed()
        || report.reps_completed() > 0
}

/// One line per frame where a phase changed or a rep completed.
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

fn arm_text(u: &ArmUpdate) -> String {
    let mark = if u.rep_completed { " +1" } else { "" };
    format!("{:<5} {:>4} ({}){mark}", u.phase.label(), u.angle_label(), u.rep_count)
}

impl<W: Write> RenderSink for ConsoleSink<W> {
    fn render(&mut self, report: &FrameReport) {
        if !changed(report) {
            return;
        }
        let line = format!(
            "frame {:>6}  L {:<20} R {:<20} total {}",
            report.frame,
            arm_text(&report.left),
            arm_text(&report.right),
            report.total_reps
        );
        if let Err(e) = writeln!(self.out, "{line}") {
            tracing::warn!(error = %e, "console write failed");
        }
    }
}

/// One JSON object per changed frame.
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

fn arm_json(u: &ArmUpdate) -> serde_json::Value {
    json!({
        "phase": u.phase.label(),
        "angle": u.angle,
        "reps": u.rep_count,
        "rep_completed": u.rep_completed,
    })
}

pub fn frame_json(report: &FrameReport) -> serde_json::Value {
    json!({
        "event": "frame",
        "frame": report.frame,
        "left": arm_json(&report.left),
        "right": arm_json(&report.right),
        "total_reps": report.total_reps,
    })
}

impl<W: Write> RenderSink for JsonLinesSink<W> {
    fn render(&mut self, report: &FrameReport) {
        if !changed(report) {
            return;
        }
        if let Err(e) = writeln!(self.out, "{}", frame_json(report)) {
            tracing::warn!(error = %e, "json write failed");
        }
    }
}
