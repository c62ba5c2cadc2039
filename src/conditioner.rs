//! Fixed-shape tensor preparation for the per-exercise classifiers.
//!
//! # Pipeline Overview
//!
//! 1. Canonicalize the columns (no-op for canonical input)
//! 2. Reject sequences longer than the policy's target length
//! 3. Keep at most the first 600 frames
//! 4. Select raw positions or a derived feature set per the policy
//! 5. Optionally smooth every feature column with a trailing moving average
//! 6. Zero-pad at the tail and build the padding mask
//! 7. Replace undefined values with zero
//! 8. Add the leading batch dimension

use ndarray::{s, Array2, Array3, ArrayView2};

use crate::canonical::CanonicalSchema;
use crate::config::{ExercisePolicy, FeatureSource, PolicyTable};
use crate::error::{MotionError, Result};
use crate::features::{FeatureRegistry, FeatureSet};
use crate::math::rolling_mean_columns;
use crate::table::KeypointTable;

/// Frames kept from the head of a sequence before any processing.
pub const FRAME_CAP: usize = 600;

/// Undefined values replaced by zero, by origin.
///
/// Padding zeros are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UndefinedValues {
    /// Missing input cells, geometry computed from them, and smoothed cells
    /// whose window reaches one.
    pub from_input: usize,
    /// Cells left undefined by the smoothing warm-up.
    pub from_smoothing: usize,
}

impl UndefinedValues {
    /// Total number of replaced cells.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.from_input + self.from_smoothing
    }
}

/// Classifier input: padded features plus the padding mask.
#[derive(Debug, Clone)]
pub struct PreparedTensor {
    /// Features, shape `[1, max_length, F]`.
    pub data: Array3<f64>,
    /// Padding mask, shape `[1, max_length]`; `1.0` marks a padded frame.
    pub mask: Array2<f64>,
    observed_frames: usize,
    undefined: UndefinedValues,
}

impl PreparedTensor {
    /// Target sequence length.
    #[must_use]
    pub fn max_length(&self) -> usize {
        self.data.shape()[1]
    }

    /// Features per frame.
    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.data.shape()[2]
    }

    /// Number of real (non-padded) frames.
    #[must_use]
    pub fn observed_frames(&self) -> usize {
        self.observed_frames
    }

    /// Number of padded frames.
    #[must_use]
    pub fn padding_length(&self) -> usize {
        self.max_length() - self.observed_frames
    }

    /// Breakdown of the undefined values that were zeroed.
    #[must_use]
    pub fn undefined(&self) -> UndefinedValues {
        self.undefined
    }

    /// Consume into the `(data, mask)` pair.
    #[must_use]
    pub fn into_parts(self) -> (Array3<f64>, Array2<f64>) {
        (self.data, self.mask)
    }
}

/// Turns keypoint tables into classifier tensors.
///
/// Holds the canonical schema and the feature-set registry; both are plain
/// values and the conditioner itself is immutable, so one instance can serve
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct SequenceConditioner {
    schema: CanonicalSchema,
    features: FeatureRegistry,
    frame_cap: usize,
}

impl Default for SequenceConditioner {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceConditioner {
    /// Conditioner with the canonical schema and built-in feature sets.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: CanonicalSchema::new(),
            features: FeatureRegistry::standard(),
            frame_cap: FRAME_CAP,
        }
    }

    /// Replace the feature-set registry.
    #[must_use]
    pub fn with_registry(mut self, features: FeatureRegistry) -> Self {
        self.features = features;
        self
    }

    /// Register an additional feature set.
    #[must_use]
    pub fn with_feature_set(mut self, set: FeatureSet) -> Self {
        self.features.register(set);
        self
    }

    /// The canonical schema in use.
    #[must_use]
    pub fn schema(&self) -> &CanonicalSchema {
        &self.schema
    }

    /// Number of features per frame a policy produces.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy names an unknown feature set.
    pub fn feature_count(&self, policy: &ExercisePolicy) -> Result<usize> {
        match &policy.feature_source {
            FeatureSource::RawPositions => Ok(self.schema.retained_positions().len()),
            FeatureSource::Derived(name) => self.feature_set(name).map(FeatureSet::len),
        }
    }

    /// Look up the policy for an exercise and prepare the table with it.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::Configuration`] for an unknown exercise, plus
    /// everything [`prepare`](Self::prepare) can return.
    pub fn prepare_for(
        &self,
        table: &KeypointTable,
        exercise_id: &str,
        policies: &PolicyTable,
    ) -> Result<PreparedTensor> {
        self.prepare(table, policies.get(exercise_id)?)
    }

    /// Prepare a keypoint table for an exercise's classifier.
    ///
    /// # Errors
    ///
    /// - [`MotionError::Schema`] if the table has no canonical column
    /// - [`MotionError::Shape`] if the table has more frames than the
    ///   policy's `max_length`
    /// - [`MotionError::Configuration`] for an invalid policy or unknown
    ///   feature set
    ///
    /// # Example
    ///
    /// ```
    /// use rehab_motion::{KeypointTable, PolicyTable, SequenceConditioner};
    ///
    /// let table = KeypointTable::from_csv_str("left_hip_x,left_hip_y\n0.4,0.6\n0.5,0.6\n")?;
    /// let policy = PolicyTable::standard().get("Es5")?.clone();
    ///
    /// let prepared = SequenceConditioner::new().prepare(&table, &policy)?;
    /// assert_eq!(prepared.data.shape(), &[1, 1022, 36]);
    /// assert_eq!(prepared.padding_length(), 1020);
    /// # Ok::<(), rehab_motion::MotionError>(())
    /// ```
    pub fn prepare(&self, table: &KeypointTable, policy: &ExercisePolicy) -> Result<PreparedTensor> {
        policy.validate()?;
        let canonical = self.schema.canonicalize(table)?;

        // A take longer than the exercise's target length is rejected even
        // when the frame cap would hide it.
        let submitted = canonical.n_frames();
        if submitted > policy.max_length {
            return Err(MotionError::sequence_too_long(submitted, policy.max_length));
        }
        if submitted > self.frame_cap {
            log::warn!(
                "{}: dropping {} frames beyond the {}-frame cap",
                policy.exercise_id,
                submitted - self.frame_cap,
                self.frame_cap
            );
        }
        let canonical = canonical.head(self.frame_cap);
        let observed = canonical.n_frames();
        let padding_length = policy.max_length - observed;

        let features = self.select_features(&canonical.values(), policy)?;

        // Warm-up rows are undefined whatever the input; any other undefined
        // cell traces back to a missing input value inside its window.
        let (features, warm_up_rows) = match policy.smoothing_window {
            Some(window) => (
                rolling_mean_columns(&features.view(), window),
                window.saturating_sub(1).min(observed),
            ),
            None => (features, 0),
        };
        let from_smoothing = warm_up_rows * features.ncols();
        let undefined = UndefinedValues {
            from_input: count_nan(&features.view()) - from_smoothing,
            from_smoothing,
        };

        let mut data = Array3::<f64>::zeros((1, policy.max_length, features.ncols()));
        data.slice_mut(s![0, ..observed, ..])
            .zip_mut_with(&features, |cell, &value| {
                *cell = if value.is_nan() { 0.0 } else { value };
            });

        let mut mask = Array2::<f64>::zeros((1, policy.max_length));
        mask.slice_mut(s![0, observed..]).fill(1.0);

        log::debug!(
            "{}: prepared {observed} frames x {} features, {padding_length} padded, {} undefined zeroed",
            policy.exercise_id,
            features.ncols(),
            undefined.total()
        );

        Ok(PreparedTensor {
            data,
            mask,
            observed_frames: observed,
            undefined,
        })
    }

    fn feature_set(&self, name: &str) -> Result<&FeatureSet> {
        self.features
            .get(name)
            .ok_or_else(|| MotionError::configuration(format!("unknown feature set '{name}'")))
    }

    fn select_features(
        &self,
        values: &ArrayView2<'_, f64>,
        policy: &ExercisePolicy,
    ) -> Result<Array2<f64>> {
        match &policy.feature_source {
            FeatureSource::RawPositions => Ok(values
                .slice(s![.., self.schema.retained_positions()])
                .to_owned()),
            FeatureSource::Derived(name) => Ok(self.feature_set(name)?.compute(values)),
        }
    }
}

fn count_nan(values: &ArrayView2<'_, f64>) -> usize {
    values.iter().filter(|v| v.is_nan()).count()
}
