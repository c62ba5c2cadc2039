//! Frame-per-row keypoint tables.
//!
//! A [`KeypointTable`] is the in-memory form of the tracker's CSV export:
//! one row per video frame, one named column per value. Missing values are
//! stored as `NaN` and resolved later by the conditioner.

use std::io::Read;

use ndarray::{s, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{MotionError, Result};

/// Column-named matrix of per-frame keypoint values.
#[derive(Debug, Clone)]
pub struct KeypointTable {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl KeypointTable {
    /// Build a table from column names and a `frames × columns` matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix width does not match the number of
    /// names, or if a column name appears twice.
    pub fn new(columns: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if columns.len() != values.ncols() {
            return Err(MotionError::invalid_input(format!(
                "{} column names for a matrix with {} columns",
                columns.len(),
                values.ncols()
            )));
        }
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(MotionError::invalid_input(format!(
                    "duplicate column '{name}'"
                )));
            }
        }
        Ok(Self { columns, values })
    }

    /// Build a table from row vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if any row has a different width than `columns`.
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: &[Vec<f64>],
    ) -> Result<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let width = columns.len();
        let mut flat = Vec::with_capacity(rows.len() * width);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(MotionError::invalid_input(format!(
                    "row {i} has {} values, expected {width}",
                    row.len()
                )));
            }
            flat.extend_from_slice(row);
        }
        let values = Array2::from_shape_vec((rows.len(), width), flat)
            .map_err(|e| MotionError::invalid_input(e.to_string()))?;
        Self::new(columns, values)
    }

    /// Parse a CSV document with a header row.
    ///
    /// Empty cells and the usual missing-value tokens (`NaN`, `NA`, `N/A`,
    /// `null`, `None`, `#N/A`) become missing values.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed CSV or a non-numeric cell.
    pub fn from_csv_str(csv: &str) -> Result<Self> {
        Self::from_csv_reader(csv.as_bytes())
    }

    /// Parse CSV from any reader.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed CSV or a non-numeric cell.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
        let mut rows = Vec::new();
        for (row_idx, record) in reader.records().enumerate() {
            let record = record?;
            let row = record
                .iter()
                .enumerate()
                .map(|(col_idx, cell)| parse_cell(cell, row_idx, &columns[col_idx]))
                .collect::<Result<Vec<f64>>>()?;
            rows.push(row);
        }

        log::debug!(
            "parsed keypoint table: {} frames, {} columns",
            rows.len(),
            columns.len()
        );
        Self::from_rows(columns, &rows)
    }

    /// Empty table with the given columns.
    #[must_use]
    pub fn empty(columns: Vec<String>) -> Self {
        let width = columns.len();
        Self {
            columns,
            values: Array2::zeros((0, width)),
        }
    }

    /// Swap `left_` and `right_` column prefixes.
    ///
    /// Reference recordings filmed facing the patient are mirrored; swapping
    /// the sides makes them comparable with a live capture.
    #[must_use]
    pub fn with_sides_swapped(mut self) -> Self {
        for name in &mut self.columns {
            if let Some(rest) = name.strip_prefix("left_") {
                *name = format!("right_{rest}");
            } else if let Some(rest) = name.strip_prefix("right_") {
                *name = format!("left_{rest}");
            }
        }
        self
    }

    /// Number of frames (rows).
    #[must_use]
    pub fn n_frames(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.values.ncols()
    }

    /// Column names in table order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The `frames × columns` matrix.
    #[must_use]
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Position of a named column.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of a named column across all frames.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.column_index(name)
            .map(|idx| self.values.index_axis(Axis(1), idx))
    }

    /// The first `n` frames (all frames if the table is shorter).
    #[must_use]
    pub fn head(&self, n: usize) -> Self {
        let n = n.min(self.n_frames());
        Self {
            columns: self.columns.clone(),
            values: self.values.slice(s![..n, ..]).to_owned(),
        }
    }

    /// Append one frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame width differs from the table width.
    pub fn push_frame(&mut self, frame: &[f64]) -> Result<()> {
        self.values
            .push_row(ArrayView1::from(frame))
            .map_err(|_| {
                MotionError::invalid_input(format!(
                    "frame has {} values, expected {}",
                    frame.len(),
                    self.n_columns()
                ))
            })
    }
}

/// Cell tokens read as a missing value, compared case-insensitively.
const MISSING_TOKENS: [&str; 6] = ["nan", "na", "n/a", "null", "none", "#n/a"];

fn parse_cell(cell: &str, row: usize, column: &str) -> Result<f64> {
    if cell.is_empty()
        || MISSING_TOKENS
            .iter()
            .any(|token| cell.eq_ignore_ascii_case(token))
    {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>().map_err(|_| {
        MotionError::invalid_input(format!(
            "non-numeric value '{cell}' in column '{column}' at row {row}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_parsing() {
        let csv = "nose_y,nose_x,extra\n0.5,0.25,1\n0.75,,2\n";
        let table = KeypointTable::from_csv_str(csv).unwrap();

        assert_eq!(table.n_frames(), 2);
        assert_eq!(table.columns(), &["nose_y", "nose_x", "extra"]);
        let nose_x = table.column("nose_x").unwrap();
        assert_eq!(nose_x[0], 0.25);
        assert!(nose_x[1].is_nan());
    }

    #[test]
    fn test_csv_missing_value_tokens() {
        let csv = "a,b,c,d,e\nNA,N/A,null,NaN,0.5\nn/a,NULL,None,#N/A,\n";
        let table = KeypointTable::from_csv_str(csv).unwrap();

        assert_eq!(table.n_frames(), 2);
        assert_eq!(table.column("e").unwrap()[0], 0.5);
        let missing = table.values().iter().filter(|v| v.is_nan()).count();
        assert_eq!(missing, 9);
    }

    #[test]
    fn test_csv_skips_blank_lines() {
        let csv = "a,b\n1,2\n\n3,4\n";
        let table = KeypointTable::from_csv_str(csv).unwrap();
        assert_eq!(table.n_frames(), 2);
    }

    #[test]
    fn test_csv_rejects_text_cells() {
        let csv = "a,b\n1,oops\n";
        let err = KeypointTable::from_csv_str(csv).unwrap_err();
        assert!(matches!(err, MotionError::InvalidInput(_)));
    }

    #[test]
    fn test_csv_rejects_ragged_rows() {
        let csv = "a,b\n1,2,3\n";
        assert!(matches!(
            KeypointTable::from_csv_str(csv),
            Err(MotionError::Csv(_))
        ));
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let result = KeypointTable::from_rows(["a", "a"], &[vec![1.0, 2.0]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_side_swap() {
        let table = KeypointTable::from_rows(
            ["left_hip_x", "right_hip_x", "nose_x"],
            &[vec![1.0, 2.0, 3.0]],
        )
        .unwrap()
        .with_sides_swapped();

        assert_eq!(table.columns(), &["right_hip_x", "left_hip_x", "nose_x"]);
        assert_eq!(table.column("left_hip_x").unwrap()[0], 2.0);
    }

    #[test]
    fn test_head_and_push() {
        let mut table = KeypointTable::empty(vec!["a".into(), "b".into()]);
        for i in 0..5 {
            table.push_frame(&[f64::from(i), 0.0]).unwrap();
        }
        assert!(table.push_frame(&[1.0]).is_err());

        let head = table.head(3);
        assert_eq!(head.n_frames(), 3);
        assert_eq!(table.head(100).n_frames(), 5);
        assert_eq!(head.column("a").unwrap()[2], 2.0);
    }
}
