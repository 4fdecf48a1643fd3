//! Output seam for per-frame results.

use crate::session::FrameReport;

/// Receives the result of every processed frame.
pub trait RenderSink {
    fn render(&mut self, report: &FrameReport);

    /// A frame was processed but nobody was in view.
    fn no_person(&mut self, _frame: u64) {}
}

impl<T: RenderSink + ?Sized> RenderSink for Box<T> {
    fn render(&mut self, report: &FrameReport) {
        (**self).render(report);
    }

    fn no_person(&mut self, frame: u64) {
        (**self).no_person(frame);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn render(&mut self, _report: &FrameReport) {}
}
