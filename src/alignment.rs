//! Dynamic time warping between joint trajectories.
//!
//! The aligner finds the cheapest monotonic path through the pairwise cost
//! matrix of two sequences, from `(0, 0)` to `(n - 1, m - 1)`, where each step
//! advances the reference, the live sequence, or both. Step cost is the
//! Euclidean distance between the two time steps.
//!
//! Sequences may differ in length but every time step must have the same
//! dimensionality. Time is `O(n·m)`; the distance alone needs `O(m)` memory.

use crate::error::{MotionError, Result};

/// How step costs combine along the warping path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CostAccumulation {
    /// Sum of Euclidean step costs.
    #[default]
    Sum,
    /// Square root of the sum of squared step costs.
    RootSumSquares,
}

/// Dynamic-time-warping distance calculator.
///
/// # Example
///
/// ```
/// use rehab_motion::TrajectoryAligner;
///
/// let reference = [[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]];
/// let aligner = TrajectoryAligner::new();
/// assert_eq!(aligner.align(&reference, &reference)?, 0.0);
/// # Ok::<(), rehab_motion::MotionError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TrajectoryAligner {
    accumulation: CostAccumulation,
}

impl TrajectoryAligner {
    /// Aligner summing Euclidean step costs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how step costs accumulate.
    #[must_use]
    pub const fn with_accumulation(mut self, accumulation: CostAccumulation) -> Self {
        self.accumulation = accumulation;
        self
    }

    /// DTW distance between two multi-dimensional sequences.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::InvalidInput`] if either sequence is empty or
    /// the time steps differ in dimensionality.
    pub fn align<P: AsRef<[f64]>>(&self, reference: &[P], live: &[P]) -> Result<f64> {
        validate(reference, live)?;

        let m = live.len();
        let mut prev = vec![f64::INFINITY; m];
        let mut curr = vec![f64::INFINITY; m];

        for (i, r) in reference.iter().enumerate() {
            for (j, l) in live.iter().enumerate() {
                let cost = self.step_cost(r.as_ref(), l.as_ref());
                let best = match (i, j) {
                    (0, 0) => 0.0,
                    (0, _) => curr[j - 1],
                    (_, 0) => prev[j],
                    _ => prev[j - 1].min(prev[j]).min(curr[j - 1]),
                };
                curr[j] = cost + best;
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        Ok(self.finish(prev[m - 1]))
    }

    /// DTW distance between two scalar series.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::InvalidInput`] if either series is empty.
    pub fn align_series(&self, reference: &[f64], live: &[f64]) -> Result<f64> {
        let reference: Vec<[f64; 1]> = reference.iter().map(|&v| [v]).collect();
        let live: Vec<[f64; 1]> = live.iter().map(|&v| [v]).collect();
        self.align(&reference, &live)
    }

    /// Optimal warping path as `(reference_index, live_index)` pairs.
    ///
    /// Ties prefer the diagonal step.
    ///
    /// # Errors
    ///
    /// Same conditions as [`align`](Self::align).
    pub fn warping_path<P: AsRef<[f64]>>(
        &self,
        reference: &[P],
        live: &[P],
    ) -> Result<Vec<(usize, usize)>> {
        validate(reference, live)?;

        let (n, m) = (reference.len(), live.len());
        let mut acc = vec![vec![f64::INFINITY; m]; n];
        for i in 0..n {
            for j in 0..m {
                let cost = self.step_cost(reference[i].as_ref(), live[j].as_ref());
                let best = match (i, j) {
                    (0, 0) => 0.0,
                    (0, _) => acc[0][j - 1],
                    (_, 0) => acc[i - 1][0],
                    _ => acc[i - 1][j - 1].min(acc[i - 1][j]).min(acc[i][j - 1]),
                };
                acc[i][j] = cost + best;
            }
        }

        let (mut i, mut j) = (n - 1, m - 1);
        let mut path = vec![(i, j)];
        while (i, j) != (0, 0) {
            (i, j) = match (i, j) {
                (0, _) => (0, j - 1),
                (_, 0) => (i - 1, 0),
                _ => {
                    let diag = acc[i - 1][j - 1];
                    if diag <= acc[i - 1][j] && diag <= acc[i][j - 1] {
                        (i - 1, j - 1)
                    } else if acc[i - 1][j] <= acc[i][j - 1] {
                        (i - 1, j)
                    } else {
                        (i, j - 1)
                    }
                }
            };
            path.push((i, j));
        }
        path.reverse();
        Ok(path)
    }

    fn step_cost(&self, a: &[f64], b: &[f64]) -> f64 {
        let squared: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
        match self.accumulation {
            CostAccumulation::Sum => squared.sqrt(),
            CostAccumulation::RootSumSquares => squared,
        }
    }

    fn finish(&self, total: f64) -> f64 {
        match self.accumulation {
            CostAccumulation::Sum => total,
            CostAccumulation::RootSumSquares => total.sqrt(),
        }
    }
}

/// DTW distance with the default aligner.
///
/// # Errors
///
/// See [`TrajectoryAligner::align`].
pub fn dtw_distance<P: AsRef<[f64]>>(reference: &[P], live: &[P]) -> Result<f64> {
    TrajectoryAligner::new().align(reference, live)
}

fn validate<P: AsRef<[f64]>>(reference: &[P], live: &[P]) -> Result<()> {
    let Some(first) = reference.first() else {
        return Err(MotionError::invalid_input("reference sequence is empty"));
    };
    if live.is_empty() {
        return Err(MotionError::invalid_input("live sequence is empty"));
    }

    let dim = first.as_ref().len();
    if let Some((idx, step)) = reference
        .iter()
        .chain(live)
        .enumerate()
        .find(|(_, step)| step.as_ref().len() != dim)
    {
        let (which, at) = if idx < reference.len() {
            ("reference", idx)
        } else {
            ("live", idx - reference.len())
        };
        return Err(MotionError::invalid_input(format!(
            "{which} step {at} has {} values, expected {dim}",
            step.as_ref().len()
        )));
    }
    Ok(())
}
