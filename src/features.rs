//! Named derived-feature sets.
//!
//! A [`FeatureSet`] is a declarative list of per-frame geometric features
//! (angles and distances between joints). Sets are looked up by name through
//! a [`FeatureRegistry`], so an exercise policy can point at a new set
//! without any change to the conditioning code.

use nalgebra::Point2;
use ndarray::{Array2, ArrayView2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{angle_series, distance_series, joint_track, midpoint_series};
use crate::joint::Joint;

/// Name of the arm/leg/hip feature set used by exercise `Es1`.
pub const UPPER_LOWER_BODY: &str = "upper_lower_body";

/// A point a feature is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PointRef {
    /// A tracked joint.
    Joint(Joint),
    /// The midpoint of two tracked joints.
    Midpoint(Joint, Joint),
}

impl PointRef {
    fn resolve(self, values: &ArrayView2<'_, f64>) -> Vec<Point2<f64>> {
        match self {
            PointRef::Joint(joint) => joint_track(values, joint),
            PointRef::Midpoint(a, b) => {
                midpoint_series(&joint_track(values, a), &joint_track(values, b))
            }
        }
    }
}

impl From<Joint> for PointRef {
    fn from(joint: Joint) -> Self {
        PointRef::Joint(joint)
    }
}

/// How a feature column is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FeatureKind {
    /// Angle at `vertex` between `first` and `end`, in degrees.
    Angle {
        /// End of the first arm.
        first: PointRef,
        /// Point the angle is measured at.
        vertex: PointRef,
        /// End of the second arm.
        end: PointRef,
    },
    /// Planar distance between two points.
    Distance {
        /// Start point.
        from: PointRef,
        /// End point.
        to: PointRef,
    },
}

/// One named feature column.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Feature {
    /// Column name, unique within its set.
    pub name: String,
    /// How the value is measured.
    pub kind: FeatureKind,
}

impl Feature {
    /// Compute this feature for every frame of a canonical matrix.
    #[must_use]
    pub fn compute(&self, values: &ArrayView2<'_, f64>) -> Vec<f64> {
        match self.kind {
            FeatureKind::Angle { first, vertex, end } => angle_series(
                &first.resolve(values),
                &vertex.resolve(values),
                &end.resolve(values),
            ),
            FeatureKind::Distance { from, to } => {
                distance_series(&from.resolve(values), &to.resolve(values))
            }
        }
    }
}

/// An ordered, named list of features.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureSet {
    name: String,
    features: Vec<Feature>,
}

impl FeatureSet {
    /// Create an empty feature set.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: Vec::new(),
        }
    }

    /// Append an angle feature.
    #[must_use]
    pub fn angle(
        mut self,
        name: impl Into<String>,
        first: impl Into<PointRef>,
        vertex: impl Into<PointRef>,
        end: impl Into<PointRef>,
    ) -> Self {
        self.features.push(Feature {
            name: name.into(),
            kind: FeatureKind::Angle {
                first: first.into(),
                vertex: vertex.into(),
                end: end.into(),
            },
        });
        self
    }

    /// Append a distance feature.
    #[must_use]
    pub fn distance(
        mut self,
        name: impl Into<String>,
        from: impl Into<PointRef>,
        to: impl Into<PointRef>,
    ) -> Self {
        self.features.push(Feature {
            name: name.into(),
            kind: FeatureKind::Distance {
                from: from.into(),
                to: to.into(),
            },
        });
        self
    }

    /// Arm-to-torso, elbow, knee and hip angles plus wrist and ankle spread.
    #[must_use]
    pub fn upper_lower_body() -> Self {
        use Joint::{
            LeftAnkle, LeftElbow, LeftHip, LeftKnee, LeftShoulder, LeftWrist, RightAnkle,
            RightElbow, RightHip, RightKnee, RightShoulder, RightWrist,
        };

        Self::new(UPPER_LOWER_BODY)
            .angle("left_arm_torso_angle", LeftElbow, LeftShoulder, LeftHip)
            .angle("right_arm_torso_angle", RightElbow, RightShoulder, RightHip)
            .angle("left_elbow_extension_angle", LeftShoulder, LeftElbow, LeftWrist)
            .angle("right_elbow_extension_angle", RightShoulder, RightElbow, RightWrist)
            .angle("left_knee_extension_angle", LeftHip, LeftKnee, LeftAnkle)
            .angle("right_knee_extension_angle", RightHip, RightKnee, RightAnkle)
            .angle(
                "hip_angle",
                LeftHip,
                PointRef::Midpoint(LeftHip, RightHip),
                RightHip,
            )
            .distance("hands_dist", LeftWrist, RightWrist)
            .distance("ankle_dist", LeftAnkle, RightAnkle)
    }

    /// Set name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Features in column order.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Number of feature columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the set has no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Compute a `frames × features` matrix from canonical values.
    #[must_use]
    pub fn compute(&self, values: &ArrayView2<'_, f64>) -> Array2<f64> {
        let mut out = Array2::zeros((values.nrows(), self.features.len()));
        for (mut column, feature) in out.columns_mut().into_iter().zip(&self.features) {
            for (cell, value) in column.iter_mut().zip(feature.compute(values)) {
                *cell = value;
            }
        }
        out
    }
}

/// Lookup table of feature sets by name.
#[derive(Debug, Clone)]
pub struct FeatureRegistry {
    sets: Vec<FeatureSet>,
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl FeatureRegistry {
    /// Registry with no sets.
    #[must_use]
    pub fn empty() -> Self {
        Self { sets: Vec::new() }
    }

    /// Registry with every built-in set.
    #[must_use]
    pub fn standard() -> Self {
        Self::empty().with(FeatureSet::upper_lower_body())
    }

    /// Add a set, replacing any existing set with the same name.
    #[must_use]
    pub fn with(mut self, set: FeatureSet) -> Self {
        self.register(set);
        self
    }

    /// Add a set, replacing any existing set with the same name.
    pub fn register(&mut self, set: FeatureSet) {
        self.sets.retain(|s| s.name != set.name);
        self.sets.push(set);
    }

    /// Find a set by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FeatureSet> {
        self.sets.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::{CanonicalSchema, CANONICAL_COLUMNS};
    use crate::joint::Coordinate;
    use approx::assert_relative_eq;

    /// A-pose: arms straight down, legs straight, ankles a bit wider than hips.
    fn standing_frame() -> Vec<f64> {
        let mut frame = vec![0.0; CANONICAL_COLUMNS];
        let mut set = |joint: Joint, x: f64, y: f64| {
            frame[CanonicalSchema::position(joint, Coordinate::X)] = x;
            frame[CanonicalSchema::position(joint, Coordinate::Y)] = y;
            frame[CanonicalSchema::position(joint, Coordinate::Confidence)] = 1.0;
        };
        set(Joint::LeftShoulder, 1.0, 2.0);
        set(Joint::RightShoulder, -1.0, 2.0);
        set(Joint::LeftElbow, 1.0, 1.0);
        set(Joint::RightElbow, -1.0, 1.0);
        set(Joint::LeftWrist, 1.0, 0.0);
        set(Joint::RightWrist, -1.0, 0.0);
        set(Joint::LeftHip, 0.5, 0.0);
        set(Joint::RightHip, -0.5, 0.0);
        set(Joint::LeftKnee, 0.5, -1.0);
        set(Joint::RightKnee, -0.5, -1.0);
        set(Joint::LeftAnkle, 1.5, -2.0);
        set(Joint::RightAnkle, -1.5, -2.0);
        frame
    }

    #[test]
    fn test_upper_lower_body_layout() {
        let set = FeatureSet::upper_lower_body();
        assert_eq!(set.len(), 9);
        assert_eq!(set.features()[0].name, "left_arm_torso_angle");
        assert_eq!(set.features()[6].name, "hip_angle");
        assert_eq!(set.features()[8].name, "ankle_dist");
    }

    #[test]
    fn test_upper_lower_body_values() {
        let frame = standing_frame();
        let values = ndarray::Array2::from_shape_vec((1, CANONICAL_COLUMNS), frame).unwrap();
        let out = FeatureSet::upper_lower_body().compute(&values.view());

        assert_eq!(out.shape(), &[1, 9]);
        // Elbow and wrist straight below the shoulder; hip slightly inward.
        let arm_torso = (0.5f64).atan2(2.0).to_degrees();
        assert_relative_eq!(out[[0, 0]], arm_torso, epsilon = 1e-9);
        assert_relative_eq!(out[[0, 1]], arm_torso, epsilon = 1e-9);
        assert_relative_eq!(out[[0, 2]], 180.0, epsilon = 1e-9);
        assert_relative_eq!(out[[0, 3]], 180.0, epsilon = 1e-9);
        // Hip, knee, ankle: (0.5,0) -> (0.5,-1) -> (1.5,-2)
        assert_relative_eq!(out[[0, 4]], 135.0, epsilon = 1e-9);
        assert_relative_eq!(out[[0, 5]], 135.0, epsilon = 1e-9);
        // Both hips are collinear with their midpoint.
        assert_relative_eq!(out[[0, 6]], 180.0, epsilon = 1e-9);
        assert_relative_eq!(out[[0, 7]], 2.0, epsilon = 1e-12);
        assert_relative_eq!(out[[0, 8]], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_joint_gives_nan() {
        let mut frame = standing_frame();
        frame[CanonicalSchema::position(Joint::LeftWrist, Coordinate::X)] = f64::NAN;
        let values = ndarray::Array2::from_shape_vec((1, CANONICAL_COLUMNS), frame).unwrap();
        let out = FeatureSet::upper_lower_body().compute(&values.view());

        assert!(out[[0, 2]].is_nan());
        assert!(out[[0, 7]].is_nan());
        assert!(!out[[0, 3]].is_nan());
    }

    #[test]
    fn test_registry_lookup_and_extension() {
        let custom = FeatureSet::new("shoulder_width").distance(
            "shoulder_dist",
            Joint::LeftShoulder,
            Joint::RightShoulder,
        );
        let registry = FeatureRegistry::standard().with(custom);

        assert_eq!(registry.get(UPPER_LOWER_BODY).map(FeatureSet::len), Some(9));
        assert_eq!(registry.get("shoulder_width").map(FeatureSet::len), Some(1));
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = FeatureRegistry::standard();
        registry.register(FeatureSet::new(UPPER_LOWER_BODY));
        assert!(registry.get(UPPER_LOWER_BODY).unwrap().is_empty());
    }
}
