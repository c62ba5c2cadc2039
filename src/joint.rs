//! Body landmarks and their canonical column naming.
//!
//! The 17 joints follow the COCO keypoint order used by the pose tracker.
//! Each joint contributes three columns, `{joint}_y`, `{joint}_x` and
//! `{joint}_confidence`, in that order.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of tracked joints.
pub const JOINT_COUNT: usize = 17;

/// Number of columns contributed by each joint.
pub const VALUES_PER_JOINT: usize = 3;

/// One of the 17 tracked body landmarks, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Joint {
    /// Tip of the nose.
    Nose,
    /// Left eye.
    LeftEye,
    /// Right eye.
    RightEye,
    /// Left ear.
    LeftEar,
    /// Right ear.
    RightEar,
    /// Left shoulder.
    LeftShoulder,
    /// Right shoulder.
    RightShoulder,
    /// Left elbow.
    LeftElbow,
    /// Right elbow.
    RightElbow,
    /// Left wrist.
    LeftWrist,
    /// Right wrist.
    RightWrist,
    /// Left hip.
    LeftHip,
    /// Right hip.
    RightHip,
    /// Left knee.
    LeftKnee,
    /// Right knee.
    RightKnee,
    /// Left ankle.
    LeftAnkle,
    /// Right ankle.
    RightAnkle,
}

impl Joint {
    /// All joints in canonical order.
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::Nose,
        Joint::LeftEye,
        Joint::RightEye,
        Joint::LeftEar,
        Joint::RightEar,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
    ];

    /// Position of the joint in canonical order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Column-name stem, e.g. `left_shoulder`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Joint::Nose => "nose",
            Joint::LeftEye => "left_eye",
            Joint::RightEye => "right_eye",
            Joint::LeftEar => "left_ear",
            Joint::RightEar => "right_ear",
            Joint::LeftShoulder => "left_shoulder",
            Joint::RightShoulder => "right_shoulder",
            Joint::LeftElbow => "left_elbow",
            Joint::RightElbow => "right_elbow",
            Joint::LeftWrist => "left_wrist",
            Joint::RightWrist => "right_wrist",
            Joint::LeftHip => "left_hip",
            Joint::RightHip => "right_hip",
            Joint::LeftKnee => "left_knee",
            Joint::RightKnee => "right_knee",
            Joint::LeftAnkle => "left_ankle",
            Joint::RightAnkle => "right_ankle",
        }
    }

    /// Human-readable name, e.g. `left shoulder`.
    #[must_use]
    pub fn display_name(self) -> String {
        self.name().replace('_', " ")
    }

    /// Look up a joint by its column-name stem.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|j| j.name() == name)
    }

    /// Column name for one coordinate of this joint.
    #[must_use]
    pub fn column(self, coordinate: Coordinate) -> String {
        format!("{}_{}", self.name(), coordinate.suffix())
    }
}

impl std::fmt::Display for Joint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the three per-joint values, in canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Coordinate {
    /// Vertical image coordinate.
    Y,
    /// Horizontal image coordinate.
    X,
    /// Tracker confidence, nominally in `[0, 1]`.
    Confidence,
}

impl Coordinate {
    /// Coordinates in canonical column order.
    pub const ALL: [Coordinate; VALUES_PER_JOINT] =
        [Coordinate::Y, Coordinate::X, Coordinate::Confidence];

    /// Offset of this coordinate within a joint's column triple.
    #[must_use]
    pub const fn offset(self) -> usize {
        self as usize
    }

    /// Column-name suffix.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Coordinate::Y => "y",
            Coordinate::X => "x",
            Coordinate::Confidence => "confidence",
        }
    }
}
