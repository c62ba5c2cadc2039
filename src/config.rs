//! Per-exercise conditioning policies.
//!
//! Each exercise maps to one immutable [`ExercisePolicy`]: which features the
//! exercise's classifier consumes, whether they are smoothed, and the fixed
//! sequence length it expects. Policies live in a [`PolicyTable`], so adding
//! an exercise means adding a row rather than a code branch.
//!
//! # Example
//!
//! ```
//! use rehab_motion::PolicyTable;
//!
//! let policies = PolicyTable::standard();
//! let es2 = policies.get("Es2")?;
//! assert_eq!(es2.max_length, 1668);
//! assert!(es2.uses_raw_positions());
//! # Ok::<(), rehab_motion::MotionError>(())
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MotionError, Result};
use crate::features::UPPER_LOWER_BODY;

/// Smoothing window used by the derived-feature exercise.
pub const DEFAULT_SMOOTHING_WINDOW: usize = 10;

/// Where an exercise's per-frame features come from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FeatureSource {
    /// Canonical keypoint columns minus the face columns.
    RawPositions,
    /// A named geometric feature set.
    Derived(String),
}

/// Conditioning policy for one exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExercisePolicy {
    /// Exercise identifier, e.g. `Es1`.
    pub exercise_id: String,

    /// Feature source fed to the classifier.
    pub feature_source: FeatureSource,

    /// Trailing moving-average width, if the features are smoothed.
    #[cfg_attr(feature = "serde", serde(default))]
    pub smoothing_window: Option<usize>,

    /// Sequence length the exercise's classifier expects.
    pub max_length: usize,
}

impl ExercisePolicy {
    /// Policy feeding raw keypoint positions.
    #[must_use]
    pub fn raw(exercise_id: impl Into<String>, max_length: usize) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            feature_source: FeatureSource::RawPositions,
            smoothing_window: None,
            max_length,
        }
    }

    /// Policy feeding a named derived feature set.
    #[must_use]
    pub fn derived(
        exercise_id: impl Into<String>,
        feature_set: impl Into<String>,
        max_length: usize,
    ) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            feature_source: FeatureSource::Derived(feature_set.into()),
            smoothing_window: None,
            max_length,
        }
    }

    /// Enable trailing moving-average smoothing.
    #[must_use]
    pub fn with_smoothing(mut self, window: usize) -> Self {
        self.smoothing_window = Some(window);
        self
    }

    /// Set the target sequence length.
    #[must_use]
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Whether raw positions are used.
    #[must_use]
    pub fn uses_raw_positions(&self) -> bool {
        matches!(self.feature_source, FeatureSource::RawPositions)
    }

    /// Whether derived features are used.
    #[must_use]
    pub fn uses_derived_features(&self) -> bool {
        matches!(self.feature_source, FeatureSource::Derived(_))
    }

    /// File name of the trained model conventionally paired with this exercise.
    #[must_use]
    pub fn model_file(&self) -> String {
        format!("ml_model_{}.h5", self.exercise_id)
    }

    /// Validate the policy.
    ///
    /// # Errors
    ///
    /// Returns an error if any field is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.exercise_id.is_empty() {
            return Err(MotionError::configuration("exercise_id must not be empty"));
        }
        if self.max_length == 0 {
            return Err(MotionError::configuration(format!(
                "{}: max_length must be positive",
                self.exercise_id
            )));
        }
        if self.smoothing_window == Some(0) {
            return Err(MotionError::configuration(format!(
                "{}: smoothing window must be at least 1",
                self.exercise_id
            )));
        }
        if let FeatureSource::Derived(name) = &self.feature_source {
            if name.is_empty() {
                return Err(MotionError::configuration(format!(
                    "{}: derived feature set name must not be empty",
                    self.exercise_id
                )));
            }
        }
        Ok(())
    }
}

/// Lookup table from exercise identifier to policy.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PolicyTable {
    policies: Vec<ExercisePolicy>,
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl PolicyTable {
    /// The five shipped exercises.
    ///
    /// `Es1` feeds smoothed upper/lower-body angles; the others feed raw
    /// positions.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            policies: vec![
                ExercisePolicy::derived("Es1", UPPER_LOWER_BODY, 1515)
                    .with_smoothing(DEFAULT_SMOOTHING_WINDOW),
                ExercisePolicy::raw("Es2", 1668),
                ExercisePolicy::raw("Es3", 1518),
                ExercisePolicy::raw("Es4", 1988),
                ExercisePolicy::raw("Es5", 1022),
            ],
        }
    }

    /// Table with no policies.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            policies: Vec::new(),
        }
    }

    /// Build a table from policies, validating each.
    ///
    /// # Errors
    ///
    /// Returns an error if a policy is invalid or an identifier repeats.
    pub fn from_policies(policies: Vec<ExercisePolicy>) -> Result<Self> {
        let table = Self { policies };
        table.validate()?;
        Ok(table)
    }

    /// Parse a JSON array of policies.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the table is invalid.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(json)
            .map_err(|e| MotionError::configuration(format!("invalid policy table: {e}")))?;
        table.validate()?;
        Ok(table)
    }

    /// Add or replace the policy for an exercise.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy is invalid.
    pub fn insert(&mut self, policy: ExercisePolicy) -> Result<()> {
        policy.validate()?;
        self.policies.retain(|p| p.exercise_id != policy.exercise_id);
        self.policies.push(policy);
        Ok(())
    }

    /// Policy for an exercise.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::Configuration`] for an unknown identifier.
    pub fn get(&self, exercise_id: &str) -> Result<&ExercisePolicy> {
        self.policies
            .iter()
            .find(|p| p.exercise_id == exercise_id)
            .ok_or_else(|| MotionError::unknown_exercise(exercise_id))
    }

    /// Registered exercise identifiers.
    pub fn exercise_ids(&self) -> impl Iterator<Item = &str> {
        self.policies.iter().map(|p| p.exercise_id.as_str())
    }

    /// Validate every policy and check identifiers are unique.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        for (i, policy) in self.policies.iter().enumerate() {
            policy.validate()?;
            if self.policies[..i]
                .iter()
                .any(|p| p.exercise_id == policy.exercise_id)
            {
                return Err(MotionError::configuration(format!(
                    "duplicate policy for exercise '{}'",
                    policy.exercise_id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table() {
        let table = PolicyTable::standard();
        assert!(table.validate().is_ok());

        let lengths: Vec<(String, usize)> = ["Es1", "Es2", "Es3", "Es4", "Es5"]
            .iter()
            .map(|id| (id.to_string(), table.get(id).unwrap().max_length))
            .collect();
        assert_eq!(
            lengths,
            vec![
                ("Es1".to_string(), 1515),
                ("Es2".to_string(), 1668),
                ("Es3".to_string(), 1518),
                ("Es4".to_string(), 1988),
                ("Es5".to_string(), 1022),
            ]
        );
    }

    #[test]
    fn test_es1_is_smoothed_derived() {
        let es1 = PolicyTable::standard().get("Es1").unwrap().clone();
        assert!(es1.uses_derived_features());
        assert!(!es1.uses_raw_positions());
        assert_eq!(es1.smoothing_window, Some(10));
        assert_eq!(es1.model_file(), "ml_model_Es1.h5");
    }

    #[test]
    fn test_raw_exercises_unsmoothed() {
        let table = PolicyTable::standard();
        for id in ["Es2", "Es3", "Es4", "Es5"] {
            let policy = table.get(id).unwrap();
            assert!(policy.uses_raw_positions());
            assert_eq!(policy.smoothing_window, None);
        }
    }

    #[test]
    fn test_unknown_exercise() {
        let err = PolicyTable::standard().get("Es6").unwrap_err();
        assert!(matches!(err, MotionError::Configuration(_)));
    }

    #[test]
    fn test_validation() {
        assert!(ExercisePolicy::raw("", 10).validate().is_err());
        assert!(ExercisePolicy::raw("Es9", 0).validate().is_err());
        assert!(ExercisePolicy::raw("Es9", 10).with_smoothing(0).validate().is_err());
        assert!(ExercisePolicy::derived("Es9", "", 10).validate().is_err());
        assert!(ExercisePolicy::raw("Es9", 10).with_smoothing(3).validate().is_ok());
    }

    #[test]
    fn test_duplicates_rejected() {
        let result = PolicyTable::from_policies(vec![
            ExercisePolicy::raw("Es1", 10),
            ExercisePolicy::raw("Es1", 20),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_insert_replaces() {
        let mut table = PolicyTable::standard();
        table
            .insert(ExercisePolicy::raw("Es2", 2000))
            .unwrap();
        table.insert(ExercisePolicy::raw("Es6", 800)).unwrap();

        assert_eq!(table.get("Es2").unwrap().max_length, 2000);
        assert_eq!(table.exercise_ids().count(), 6);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_round_trip() {
        let json = serde_json::to_string(&PolicyTable::standard()).unwrap();
        let parsed = PolicyTable::from_json(&json).unwrap();
        assert_eq!(parsed, PolicyTable::standard());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_from_file_format() {
        let json = r#"[
            {"exercise_id": "Es7", "feature_source": "raw_positions", "max_length": 900},
            {"exercise_id": "Es8", "feature_source": {"derived": "upper_lower_body"},
             "smoothing_window": 5, "max_length": 700}
        ]"#;
        let table = PolicyTable::from_json(json).unwrap();
        assert_eq!(table.get("Es7").unwrap().smoothing_window, None);
        assert_eq!(table.get("Es8").unwrap().smoothing_window, Some(5));
        assert!(PolicyTable::from_json("[{}]").is_err());
    }
}
