//! Rehabilitation Motion Library
//!
//! Turns per-frame 2D body-keypoint tracks recorded during a rehabilitation
//! exercise into classifier-ready tensors, and compares live trajectories with
//! reference recordings for real-time feedback.
//!
//! # Features
//!
//! - **Canonical columns**: any table of `{joint}_{y|x|confidence}` columns is
//!   reindexed onto one fixed 51-column layout
//! - **Joint geometry**: per-frame angles and distances, grouped into named
//!   feature sets
//! - **Per-exercise policies**: data-driven choice of features, smoothing and
//!   target length
//! - **Fixed-shape output**: `[1, L, F]` features plus a `[1, L]` padding mask
//! - **Trajectory alignment**: dynamic time warping for live feedback
//!
//! # Quick Start
//!
//! ```
//! use rehab_motion::{KeypointTable, PolicyTable, SequenceConditioner, TrajectoryAligner};
//!
//! let csv = "left_wrist_y,left_wrist_x,right_wrist_y,right_wrist_x\n\
//!            0.50,0.40,0.50,0.60\n\
//!            0.45,0.41,0.46,0.59\n";
//! let table = KeypointTable::from_csv_str(csv)?;
//!
//! let policies = PolicyTable::standard();
//! let prepared = SequenceConditioner::new().prepare_for(&table, "Es2", &policies)?;
//! assert_eq!(prepared.data.shape(), &[1, 1668, 36]);
//! assert_eq!(prepared.mask.shape(), &[1, 1668]);
//!
//! let reference = [0.50, 0.45, 0.40];
//! let live = [0.50, 0.50, 0.45, 0.40];
//! let cost = TrajectoryAligner::new().align_series(&reference, &live)?;
//! assert_eq!(cost, 0.0);
//! # Ok::<(), rehab_motion::MotionError>(())
//! ```
//!
//! # Exercises
//!
//! | Exercise | Features | Smoothing | Length |
//! |----------|----------|-----------|--------|
//! | `Es1` | 9 upper/lower-body angles and distances | 10 frames | 1515 |
//! | `Es2` | 36 raw positions | none | 1668 |
//! | `Es3` | 36 raw positions | none | 1518 |
//! | `Es4` | 36 raw positions | none | 1988 |
//! | `Es5` | 36 raw positions | none | 1022 |

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod alignment;
pub mod canonical;
pub mod conditioner;
pub mod config;
pub mod error;
pub mod features;
pub mod feedback;
pub mod geometry;
pub mod joint;
pub mod math;
pub mod scoring;
pub mod table;

// Re-exports for convenient access
pub use alignment::{dtw_distance, CostAccumulation, TrajectoryAligner};
pub use canonical::{CanonicalSchema, CANONICAL_COLUMNS, RAW_POSITION_FEATURES};
pub use conditioner::{PreparedTensor, SequenceConditioner, UndefinedValues, FRAME_CAP};
pub use config::{ExercisePolicy, FeatureSource, PolicyTable};
pub use error::{MotionError, Result};
pub use features::{FeatureKind, FeatureRegistry, FeatureSet, PointRef};
#[cfg(feature = "serde")]
pub use feedback::{handle_feedback_json, FeedbackRequest, FeedbackResponse};
pub use feedback::{Direction, FeedbackMessage, LiveFeedback};
pub use joint::{Coordinate, Joint};
pub use scoring::{Classifier, ClinicalScorer, DEFAULT_FEEDBACK_LIMIT, FEEDBACK_LIMIT_SCORE};
pub use table::KeypointTable;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
