use std::collections::VecDeque;

use repcount_config::PoseTrace;
use repcount_traits::{BoxError, Estimate, Keypoint, KeypointLayout, KeypointName, Pose, PoseSource};

use crate::error::{Result, SimError};

/// Plays back a recorded pose trace, one trace frame per `estimate()`.
///
/// Frame numbers missing from the trace replay as `NoPerson`; after the
/// last recorded frame the source reports `EndOfStream`.
#[derive(Debug, Clone)]
pub struct ReplayPoseSource {
    frames: VecDeque<(u64, Pose)>,
    next_frame: u64,
    opened: bool,
}

impl ReplayPoseSource {
    /// Resolve every keypoint name up front so bad traces fail before the
    /// session starts.
    pub fn new(trace: &PoseTrace, layout: KeypointLayout) -> Result<Self> {
        let mut frames = VecDeque::with_capacity(trace.frames.len());
        for tf in &trace.frames {
            let mut pose = Pose::new(layout);
            for row in &tf.rows {
                let name: KeypointName = row.keypoint.parse().map_err(|_| SimError::UnknownKeypoint {
                    frame: tf.frame,
                    name: row.keypoint.clone(),
                })?;
                pose.set(name, Keypoint::new(row.x, row.y, row.score));
            }
            frames.push_back((tf.frame, pose));
        }
        let next_frame = frames.front().map_or(0, |(f, _)| *f);
        Ok(Self {
            frames,
            next_frame,
            opened: false,
        })
    }
}

impl PoseSource for ReplayPoseSource {
    fn open(&mut self) -> std::result::Result<(), BoxError> {
        self.opened = true;
        tracing::debug!(frames = self.frames.len(), "pose trace replay opened");
        Ok(())
    }

    fn estimate(&mut self) -> std::result::Result<Estimate, BoxError> {
        if !self.opened {
            return Err(Box::new(SimError::NotOpened));
        }
        let current = self.next_frame;
        let estimate = match self.frames.front() {
            None => return Ok(Estimate::EndOfStream),
            Some((f, _)) if *f == current => match self.frames.pop_front() {
                Some((_, pose)) => Estimate::Pose(pose),
                None => Estimate::EndOfStream,
            },
            Some(_) => Estimate::NoPerson,
        };
        self.next_frame = current.saturating_add(1);
        Ok(estimate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repcount_config::TraceRow;

    fn row(frame: u64, keypoint: &str) -> TraceRow {
        TraceRow {
            frame,
            keypoint: keypoint.to_string(),
            x: 1.0,
            y: 2.0,
            score: 0.8,
        }
    }

    #[test]
    fn gaps_replay_as_no_person() {
        let trace = PoseTrace::from_rows(vec![
            row(3, "left_elbow"),
            row(3, "left_wrist"),
            row(5, "right_elbow"),
        ])
        .expect("valid trace");
        let mut src = ReplayPoseSource::new(&trace, KeypointLayout::MoveNet17).expect("names ok");
        src.open().expect("open");

        match src.estimate().expect("frame 3") {
            Estimate::Pose(p) => assert_eq!(p.detected(), 2),
            other => panic!("expected pose, got {other:?}"),
        }
        assert_eq!(src.estimate().expect("frame 4"), Estimate::NoPerson);
        assert!(matches!(src.estimate().expect("frame 5"), Estimate::Pose(_)));
        assert_eq!(src.estimate().expect("end"), Estimate::EndOfStream);
        assert_eq!(src.estimate().expect("still end"), Estimate::EndOfStream);
    }

    #[test]
    fn unknown_keypoint_rejected_up_front() {
        let trace = PoseTrace::from_rows(vec![row(0, "left_elbow"), row(1, "tail")])
            .expect("valid rows");
        let err = ReplayPoseSource::new(&trace, KeypointLayout::MoveNet17).expect_err("bad name");
        assert!(matches!(err, SimError::UnknownKeypoint { frame: 1, .. }));
    }
}
