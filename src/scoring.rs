//! Hand-off to the per-exercise clinical classifier.
//!
//! The trained model is external; this module only defines the seam it plugs
//! into and the glue that prepares its input.

use ndarray::{Array2, Array3};

use crate::conditioner::{PreparedTensor, SequenceConditioner};
use crate::config::PolicyTable;
use crate::error::{MotionError, Result};
use crate::feedback::FeedbackMessage;
use crate::table::KeypointTable;

/// Feedback messages a session may collect before the classifier is skipped.
pub const DEFAULT_FEEDBACK_LIMIT: usize = 75;

/// Score reported for a session that exceeded its feedback limit.
pub const FEEDBACK_LIMIT_SCORE: f64 = 100.0;

/// A trained sequence classifier for one exercise.
pub trait Classifier {
    /// Features per frame the model was trained on.
    fn expected_features(&self) -> usize;

    /// Score a `[1, L, F]` feature tensor with its `[1, L]` padding mask.
    ///
    /// # Errors
    ///
    /// Implementations report inference failures as
    /// [`MotionError::Classifier`].
    fn predict(&self, data: &Array3<f64>, mask: &Array2<f64>) -> Result<Vec<f64>>;
}

/// Prepares tables and runs them through a classifier.
#[derive(Debug, Clone)]
pub struct ClinicalScorer {
    conditioner: SequenceConditioner,
    policies: PolicyTable,
    feedback_limit: usize,
}

impl Default for ClinicalScorer {
    fn default() -> Self {
        Self::new(SequenceConditioner::default(), PolicyTable::default())
    }
}

impl ClinicalScorer {
    /// Scorer with the given conditioner and policies.
    #[must_use]
    pub fn new(conditioner: SequenceConditioner, policies: PolicyTable) -> Self {
        Self {
            conditioner,
            policies,
            feedback_limit: DEFAULT_FEEDBACK_LIMIT,
        }
    }

    /// Set how many feedback messages a session may collect before
    /// [`score_session`](Self::score_session) skips the classifier.
    #[must_use]
    pub fn with_feedback_limit(mut self, limit: usize) -> Self {
        self.feedback_limit = limit;
        self
    }

    /// The feedback limit in use.
    #[must_use]
    pub fn feedback_limit(&self) -> usize {
        self.feedback_limit
    }

    /// The policy table in use.
    #[must_use]
    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    /// Prepare a table for an exercise and check it fits the classifier.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::Shape`] if the prepared feature count differs
    /// from what the classifier expects, plus all conditioning errors.
    pub fn prepare(
        &self,
        table: &KeypointTable,
        exercise_id: &str,
        classifier: &dyn Classifier,
    ) -> Result<PreparedTensor> {
        let prepared = self.conditioner.prepare_for(table, exercise_id, &self.policies)?;
        if prepared.feature_count() != classifier.expected_features() {
            return Err(MotionError::feature_mismatch(
                classifier.expected_features(),
                prepared.feature_count(),
            ));
        }
        Ok(prepared)
    }

    /// Prepare a table and score it.
    ///
    /// # Errors
    ///
    /// See [`prepare`](Self::prepare); classifier failures pass through.
    pub fn score(
        &self,
        table: &KeypointTable,
        exercise_id: &str,
        classifier: &dyn Classifier,
    ) -> Result<Vec<f64>> {
        let prepared = self.prepare(table, exercise_id, classifier)?;
        let scores = classifier.predict(&prepared.data, &prepared.mask)?;
        log::info!(
            "{exercise_id}: scored {} frames -> {scores:?}",
            prepared.observed_frames()
        );
        Ok(scores)
    }

    /// Parse a CSV export and score it.
    ///
    /// # Errors
    ///
    /// CSV errors plus everything [`score`](Self::score) returns.
    pub fn score_csv(
        &self,
        csv: &str,
        exercise_id: &str,
        classifier: &dyn Classifier,
    ) -> Result<Vec<f64>> {
        self.score(&KeypointTable::from_csv_str(csv)?, exercise_id, classifier)
    }

    /// Score a finished live session.
    ///
    /// A session with more than [`feedback_limit`](Self::feedback_limit)
    /// feedback messages gets [`FEEDBACK_LIMIT_SCORE`] without consulting
    /// the classifier; otherwise this is [`score`](Self::score).
    ///
    /// # Errors
    ///
    /// Only on the classifier path; see [`score`](Self::score).
    pub fn score_session(
        &self,
        table: &KeypointTable,
        exercise_id: &str,
        feedback: &[FeedbackMessage],
        classifier: &dyn Classifier,
    ) -> Result<Vec<f64>> {
        if feedback.len() > self.feedback_limit {
            log::info!(
                "{exercise_id}: {} feedback messages over limit {}, classifier skipped",
                feedback.len(),
                self.feedback_limit
            );
            return Ok(vec![FEEDBACK_LIMIT_SCORE]);
        }
        self.score(table, exercise_id, classifier)
    }
}
