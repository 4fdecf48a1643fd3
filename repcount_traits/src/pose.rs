//! Pose estimator output: labeled 2D keypoints with confidence scores.

use std::fmt;
use std::str::FromStr;

/// One detected joint position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Estimator confidence in `[0, 1]`.
    pub score: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, score: f32) -> Self {
        Self { x, y, score }
    }

    /// True when the score is strictly above `min_confidence`.
    #[inline]
    pub fn is_confident(&self, min_confidence: f32) -> bool {
        self.score > min_confidence
    }
}

/// Joints shared by every supported keypoint layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeypointName {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl KeypointName {
    pub const ALL: [KeypointName; 17] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

impl fmt::Display for KeypointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a keypoint name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKeypoint(pub String);

impl fmt::Display for UnknownKeypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown keypoint name '{}'", self.0)
    }
}

impl std::error::Error for UnknownKeypoint {}

impl FromStr for KeypointName {
    type Err = UnknownKeypoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownKeypoint(needle.to_string()))
    }
}

/// Index layout of the keypoint array a model produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeypointLayout {
    /// MoveNet (Lightning/Thunder): 17 COCO keypoints.
    #[default]
    MoveNet17,
    /// BlazePose full body: 33 keypoints.
    BlazePose33,
}

impl KeypointLayout {
    pub fn len(self) -> usize {
        match self {
            Self::MoveNet17 => 17,
            Self::BlazePose33 => 33,
        }
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Array index of `name` in this layout.
    pub fn index_of(self, name: KeypointName) -> usize {
        use KeypointName::*;
        match self {
            Self::MoveNet17 => match name {
                Nose => 0,
                LeftEye => 1,
                RightEye => 2,
                LeftEar => 3,
                RightEar => 4,
                LeftShoulder => 5,
                RightShoulder => 6,
                LeftElbow => 7,
                RightElbow => 8,
                LeftWrist => 9,
                RightWrist => 10,
                LeftHip => 11,
                RightHip => 12,
                LeftKnee => 13,
                RightKnee => 14,
                LeftAnkle => 15,
                RightAnkle => 16,
            },
            Self::BlazePose33 => match name {
                Nose => 0,
                LeftEye => 2,
                RightEye => 5,
                LeftEar => 7,
                RightEar => 8,
                LeftShoulder => 11,
                RightShoulder => 12,
                LeftElbow => 13,
                RightElbow => 14,
                LeftWrist => 15,
                RightWrist => 16,
                LeftHip => 23,
                RightHip => 24,
                LeftKnee => 25,
                RightKnee => 26,
                LeftAnkle => 27,
                RightAnkle => 28,
            },
        }
    }
}

/// Keypoints detected for one person in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    layout: KeypointLayout,
    keypoints: Vec<Option<Keypoint>>,
}

impl Pose {
    /// An empty pose (no joint detected) in the given layout.
    pub fn new(layout: KeypointLayout) -> Self {
        Self {
            layout,
            keypoints: vec![None; layout.len()],
        }
    }

    /// Builder-style `set`.
    pub fn with(mut self, name: KeypointName, kp: Keypoint) -> Self {
        self.set(name, kp);
        self
    }

    pub fn set(&mut self, name: KeypointName, kp: Keypoint) {
        let idx = self.layout.index_of(name);
        self.keypoints[idx] = Some(kp);
    }

    pub fn get(&self, name: KeypointName) -> Option<&Keypoint> {
        self.keypoints
            .get(self.layout.index_of(name))
            .and_then(Option::as_ref)
    }

    pub fn layout(&self) -> KeypointLayout {
        self.layout
    }

    /// Number of joints present (any confidence).
    pub fn detected(&self) -> usize {
        self.keypoints.iter().filter(|k| k.is_some()).count()
    }
}

/// Outcome of one inference call.
#[derive(Debug, Clone, PartialEq)]
pub enum Estimate {
    /// A person was found.
    Pose(Pose),
    /// The frame was processed but nobody was detected.
    NoPerson,
    /// The source has no more frames (replay finished, camera closed).
    EndOfStream,
}
