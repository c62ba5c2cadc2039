//! Real-time corrective feedback against a reference recording.
//!
//! This module provides [`LiveFeedback`], which accumulates live frames and,
//! after each one, compares every monitored joint's horizontal and vertical
//! track with the same-length prefix of a reference recording. Joints whose
//! DTW cost exceeds a threshold produce a [`FeedbackMessage`].
//!
//! It also defines the JSON request/response pair of the per-series
//! feedback boundary.
//!
//! # Example
//!
//! ```
//! use rehab_motion::{KeypointTable, LiveFeedback};
//!
//! let reference = KeypointTable::from_csv_str(
//!     "left_shoulder_x,left_shoulder_y\n0.0,0.0\n0.0,0.0\n",
//! )?;
//! let mut feedback = LiveFeedback::new(&reference)?;
//!
//! let mut frame = vec![f64::NAN; 51];
//! frame[16] = 5.0; // left_shoulder_x, far off the reference
//! frame[15] = 0.0; // left_shoulder_y
//! let messages = feedback.update(&frame)?;
//!
//! assert_eq!(messages.len(), 1);
//! assert_eq!(messages[0].to_string(), "Adjust your left shoulder horizontally");
//! # Ok::<(), rehab_motion::MotionError>(())
//! ```

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::alignment::{CostAccumulation, TrajectoryAligner};
use crate::canonical::CanonicalSchema;
#[cfg(feature = "serde")]
use crate::error::MotionError;
use crate::error::Result;
use crate::joint::{Coordinate, Joint};
use crate::table::KeypointTable;

/// DTW cost above which a joint is flagged.
pub const DEFAULT_FEEDBACK_THRESHOLD: f64 = 2.5;

/// Joints monitored for feedback: shoulders, elbows, wrists and hips.
pub const FEEDBACK_JOINTS: [Joint; 8] = [
    Joint::LeftShoulder,
    Joint::RightShoulder,
    Joint::LeftElbow,
    Joint::RightElbow,
    Joint::LeftWrist,
    Joint::RightWrist,
    Joint::LeftHip,
    Joint::RightHip,
];

/// Axis along which a joint deviates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    /// The `x` track.
    Horizontal,
    /// The `y` track.
    Vertical,
}

impl Direction {
    const fn coordinate(self) -> Coordinate {
        match self {
            Direction::Horizontal => Coordinate::X,
            Direction::Vertical => Coordinate::Y,
        }
    }

    const fn word(self) -> &'static str {
        match self {
            Direction::Horizontal => "horizontally",
            Direction::Vertical => "vertically",
        }
    }
}

/// A correction for one joint along one axis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeedbackMessage {
    /// Joint that drifted from the reference.
    pub joint: Joint,
    /// Axis along which it drifted.
    pub direction: Direction,
    /// DTW cost that triggered the message.
    pub cost: f64,
}

impl fmt::Display for FeedbackMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Adjust your {} {}",
            self.joint.display_name(),
            self.direction.word()
        )
    }
}

/// Streaming comparison of a live session with a reference recording.
#[derive(Debug, Clone)]
pub struct LiveFeedback {
    reference: KeypointTable,
    live: KeypointTable,
    aligner: TrajectoryAligner,
    threshold: f64,
    joints: Vec<Joint>,
    history: Vec<FeedbackMessage>,
}

impl LiveFeedback {
    /// Start a session against a reference recording.
    ///
    /// Step costs accumulate as root-sum-squares, the scale the default
    /// threshold is calibrated for.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference has no canonical column.
    pub fn new(reference: &KeypointTable) -> Result<Self> {
        let schema = CanonicalSchema::new();
        let reference = schema.canonicalize(reference)?;
        Ok(Self {
            reference,
            live: KeypointTable::empty(schema.columns().to_vec()),
            aligner: TrajectoryAligner::new().with_accumulation(CostAccumulation::RootSumSquares),
            threshold: DEFAULT_FEEDBACK_THRESHOLD,
            joints: FEEDBACK_JOINTS.to_vec(),
            history: Vec::new(),
        })
    }

    /// Set the flagging threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the monitored joints.
    #[must_use]
    pub fn with_joints(mut self, joints: impl IntoIterator<Item = Joint>) -> Self {
        self.joints = joints.into_iter().collect();
        self
    }

    /// Set the aligner.
    #[must_use]
    pub fn with_aligner(mut self, aligner: TrajectoryAligner) -> Self {
        self.aligner = aligner;
        self
    }

    /// Number of live frames received.
    #[must_use]
    pub fn frames(&self) -> usize {
        self.live.n_frames()
    }

    /// Every message emitted so far, oldest first.
    #[must_use]
    pub fn history(&self) -> &[FeedbackMessage] {
        &self.history
    }

    /// Append a live frame given in canonical column order.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame does not have 51 values.
    pub fn push_frame(&mut self, frame: &[f64]) -> Result<()> {
        self.live.push_frame(frame)
    }

    /// Append a live frame and evaluate the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame does not have 51 values.
    pub fn update(&mut self, frame: &[f64]) -> Result<Vec<FeedbackMessage>> {
        self.push_frame(frame)?;
        let messages = self.evaluate()?;
        self.history.extend(messages.iter().cloned());
        Ok(messages)
    }

    /// Compare the live session with the reference prefix of equal length.
    ///
    /// Tracks containing missing values never trigger a message.
    ///
    /// # Errors
    ///
    /// Propagates alignment failures.
    pub fn evaluate(&self) -> Result<Vec<FeedbackMessage>> {
        let n = self.live.n_frames();
        let prefix = self.reference.head(n);
        if n == 0 || prefix.n_frames() == 0 {
            return Ok(Vec::new());
        }

        let mut messages = Vec::new();
        for &joint in &self.joints {
            for direction in [Direction::Horizontal, Direction::Vertical] {
                let column = joint.column(direction.coordinate());
                let (Some(live), Some(reference)) =
                    (self.live.column(&column), prefix.column(&column))
                else {
                    continue;
                };
                let cost = self
                    .aligner
                    .align_series(&reference.to_vec(), &live.to_vec())?;
                log::trace!("frame {n}: cost {column} = {cost}");
                if cost > self.threshold {
                    messages.push(FeedbackMessage {
                        joint,
                        direction,
                        cost,
                    });
                }
            }
        }
        Ok(messages)
    }
}

/// Per-series feedback request: one joint coordinate over time.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    /// Reference recording of the coordinate.
    pub reference_joint_values: Vec<f64>,
    /// Live values of the same coordinate.
    pub current_joint_values: Vec<f64>,
}

/// Per-series feedback response.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    /// Alignment cost, as a one-element list.
    pub feedback_dtw: Vec<f64>,
}

#[cfg(feature = "serde")]
impl FeedbackRequest {
    /// Align the two series.
    ///
    /// # Errors
    ///
    /// Returns an error if either series is empty.
    pub fn evaluate(&self, aligner: &TrajectoryAligner) -> Result<FeedbackResponse> {
        let distance =
            aligner.align_series(&self.current_joint_values, &self.reference_joint_values)?;
        Ok(FeedbackResponse {
            feedback_dtw: vec![distance],
        })
    }
}

/// Answer a JSON feedback request with a JSON response.
///
/// # Errors
///
/// Returns [`MotionError::InvalidInput`] for malformed JSON or empty series.
#[cfg(feature = "serde")]
pub fn handle_feedback_json(request: &str) -> Result<String> {
    let request: FeedbackRequest = serde_json::from_str(request)
        .map_err(|e| MotionError::invalid_input(format!("invalid feedback request: {e}")))?;
    let response = request.evaluate(&TrajectoryAligner::new())?;
    serde_json::to_string(&response)
        .map_err(|e| MotionError::invalid_input(format!("unserializable response: {e}")))
}
