//! Error types for sequence conditioning and trajectory alignment.
//!
//! Every fallible operation in the crate returns [`MotionError`]. The core
//! never catches or downgrades these; callers map them onto their own
//! transport (for example a 4xx response).

use thiserror::Error;

/// Main error type for keypoint processing operations.
#[derive(Error, Debug)]
pub enum MotionError {
    /// No policy exists for the exercise, or a policy is malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The sequence does not fit the fixed shape the classifier expects.
    #[error("Shape error: {0}")]
    Shape(String),

    /// The input table has nothing in common with the canonical schema.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Input validation errors.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Tabular input could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The external classifier reported a failure.
    #[error("Classifier error: {0}")]
    Classifier(String),
}

/// Result type alias for keypoint processing operations.
pub type Result<T> = std::result::Result<T, MotionError>;

impl MotionError {
    /// Create an unknown-exercise configuration error.
    #[must_use]
    pub fn unknown_exercise(exercise_id: &str) -> Self {
        Self::Configuration(format!("no policy registered for exercise '{exercise_id}'"))
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an error for a sequence longer than the target length.
    #[must_use]
    pub fn sequence_too_long(observed: usize, max_length: usize) -> Self {
        Self::Shape(format!(
            "observed {observed} frames but the target length is {max_length}"
        ))
    }

    /// Create a feature count mismatch error.
    #[must_use]
    pub fn feature_mismatch(expected: usize, actual: usize) -> Self {
        Self::Shape(format!("expected {expected} features per frame, got {actual}"))
    }

    /// Create a schema error.
    #[must_use]
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a classifier error.
    #[must_use]
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }
}
