//! Canonical column ordering.
//!
//! Every downstream stage indexes keypoint values by position, so tables from
//! any source are first reindexed onto one fixed 51-column layout:
//! `[nose_y, nose_x, nose_confidence, left_eye_y, ...]`.

use ndarray::{Array2, Axis};

use crate::error::{MotionError, Result};
use crate::joint::{Coordinate, Joint, JOINT_COUNT, VALUES_PER_JOINT};
use crate::table::KeypointTable;

/// Number of canonical columns.
pub const CANONICAL_COLUMNS: usize = JOINT_COUNT * VALUES_PER_JOINT;

/// Number of leading canonical columns the raw-position models never saw
/// (nose, eyes and ears).
pub const DROPPED_POSITION_COLUMNS: usize = 15;

/// Number of raw-position features fed to the classifiers.
pub const RAW_POSITION_FEATURES: usize = CANONICAL_COLUMNS - DROPPED_POSITION_COLUMNS;

/// The canonical column layout and the raw-position drop list.
///
/// Build once at start-up and pass it to whatever needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSchema {
    columns: Vec<String>,
}

impl Default for CanonicalSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl CanonicalSchema {
    /// Build the 51-column canonical schema.
    #[must_use]
    pub fn new() -> Self {
        let columns = Joint::ALL
            .iter()
            .flat_map(|&joint| Coordinate::ALL.iter().map(move |&c| joint.column(c)))
            .collect();
        Self { columns }
    }

    /// Canonical column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Names of the columns removed from raw-position features.
    #[must_use]
    pub fn dropped_columns(&self) -> &[String] {
        &self.columns[..DROPPED_POSITION_COLUMNS]
    }

    /// Canonical positions of the columns kept as raw-position features.
    #[must_use]
    pub fn retained_positions(&self) -> std::ops::Range<usize> {
        DROPPED_POSITION_COLUMNS..CANONICAL_COLUMNS
    }

    /// Canonical position of one joint coordinate.
    #[must_use]
    pub const fn position(joint: Joint, coordinate: Coordinate) -> usize {
        joint.index() * VALUES_PER_JOINT + coordinate.offset()
    }

    /// Whether a table already has exactly the canonical columns in order.
    #[must_use]
    pub fn is_canonical(&self, table: &KeypointTable) -> bool {
        table.columns() == self.columns.as_slice()
    }

    /// Reindex a table onto the canonical columns.
    ///
    /// Columns are matched by name. Canonical columns absent from the input
    /// are filled with `NaN`; input columns outside the schema are ignored.
    /// Rows are never dropped or reordered, and applying this to an already
    /// canonical table returns an identical table.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::Schema`] if the input shares no column with the
    /// schema.
    ///
    /// # Example
    ///
    /// ```
    /// use rehab_motion::{CanonicalSchema, KeypointTable};
    ///
    /// let table = KeypointTable::from_csv_str("nose_x,nose_y\n0.2,0.1\n")?;
    /// let canonical = CanonicalSchema::new().canonicalize(&table)?;
    ///
    /// assert_eq!(canonical.n_columns(), 51);
    /// assert_eq!(&canonical.columns()[..2], &["nose_y", "nose_x"]);
    /// assert!(canonical.column("nose_confidence").unwrap()[0].is_nan());
    /// # Ok::<(), rehab_motion::MotionError>(())
    /// ```
    pub fn canonicalize(&self, table: &KeypointTable) -> Result<KeypointTable> {
        if self.is_canonical(table) {
            return Ok(table.clone());
        }

        let n_frames = table.n_frames();
        let mut values = Array2::from_elem((n_frames, CANONICAL_COLUMNS), f64::NAN);
        let mut present = 0usize;

        for (position, name) in self.columns.iter().enumerate() {
            if let Some(source) = table.column(name) {
                values.index_axis_mut(Axis(1), position).assign(&source);
                present += 1;
            }
        }

        if present == 0 {
            return Err(MotionError::schema(format!(
                "none of the {} input columns match the canonical keypoint schema",
                table.n_columns()
            )));
        }
        if present < CANONICAL_COLUMNS {
            log::debug!(
                "{} of {CANONICAL_COLUMNS} canonical columns missing from input",
                CANONICAL_COLUMNS - present
            );
        }

        KeypointTable::new(self.columns.clone(), values)
    }
}
