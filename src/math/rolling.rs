//! Trailing moving averages.
//!
//! Output `i` is the mean of inputs `i + 1 - window ..= i`. The first
//! `window - 1` outputs are `NaN` (not enough history), and any `NaN` inside
//! a window makes that output `NaN`.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

/// Trailing moving average of a single series.
///
/// # Example
///
/// ```
/// use rehab_motion::math::rolling_mean;
///
/// let smoothed = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 2);
/// assert!(smoothed[0].is_nan());
/// assert_eq!(&smoothed[1..], &[1.5, 2.5, 3.5]);
/// ```
#[must_use]
pub fn rolling_mean(series: &[f64], window: usize) -> Vec<f64> {
    rolling_mean_view(ArrayView1::from(series), window)
}

fn rolling_mean_view(series: ArrayView1<'_, f64>, window: usize) -> Vec<f64> {
    let n = series.len();
    let mut out = vec![f64::NAN; n];
    if window == 0 {
        return out;
    }

    let mut sum = 0.0;
    let mut nan_count = 0usize;
    for i in 0..n {
        let entering = series[i];
        if entering.is_nan() {
            nan_count += 1;
        } else {
            sum += entering;
        }

        if i >= window {
            let leaving = series[i - window];
            if leaving.is_nan() {
                nan_count -= 1;
            } else {
                sum -= leaving;
            }
        }

        if i + 1 >= window && nan_count == 0 {
            out[i] = sum / window as f64;
        }
    }
    out
}

/// Trailing moving average applied independently to every column.
#[must_use]
pub fn rolling_mean_columns(values: &ArrayView2<'_, f64>, window: usize) -> Array2<f64> {
    let mut out = Array2::from_elem(values.raw_dim(), f64::NAN);
    for (src, mut dst) in values
        .axis_iter(Axis(1))
        .zip(out.axis_iter_mut(Axis(1)))
    {
        for (cell, value) in dst.iter_mut().zip(rolling_mean_view(src, window)) {
            *cell = value;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_warm_up_is_undefined() {
        let series: Vec<f64> = (0..20).map(f64::from).collect();
        let smoothed = rolling_mean(&series, 10);

        assert!(smoothed[..9].iter().all(|v| v.is_nan()));
        assert_relative_eq!(smoothed[9], 4.5, epsilon = 1e-12);
        assert_relative_eq!(smoothed[19], 14.5, epsilon = 1e-12);
    }

    #[test]
    fn test_window_of_one_is_identity() {
        let series = [3.0, -1.0, 7.5];
        assert_eq!(rolling_mean(&series, 1), series.to_vec());
    }

    #[test]
    fn test_nan_poisons_its_windows_only() {
        let series = [1.0, f64::NAN, 3.0, 4.0, 5.0];
        let smoothed = rolling_mean(&series, 2);

        assert!(smoothed[0].is_nan());
        assert!(smoothed[1].is_nan());
        assert!(smoothed[2].is_nan());
        assert_relative_eq!(smoothed[3], 3.5, epsilon = 1e-12);
        assert_relative_eq!(smoothed[4], 4.5, epsilon = 1e-12);
    }

    #[test]
    fn test_short_series() {
        let smoothed = rolling_mean(&[1.0, 2.0], 5);
        assert!(smoothed.iter().all(|v| v.is_nan()));
        assert!(rolling_mean(&[], 3).is_empty());
    }

    #[test]
    fn test_columns_are_independent() {
        let values = array![[1.0, 10.0], [3.0, 20.0], [5.0, 30.0]];
        let smoothed = rolling_mean_columns(&values.view(), 2);

        assert!(smoothed[[0, 0]].is_nan() && smoothed[[0, 1]].is_nan());
        assert_relative_eq!(smoothed[[1, 0]], 2.0);
        assert_relative_eq!(smoothed[[2, 1]], 25.0);
    }
}
