//! Per-frame joint geometry.
//!
//! Angles and distances between tracked joints, computed frame by frame over
//! a whole sequence. Points are `(x, y)` image coordinates; `NaN`
//! coordinates propagate to `NaN` results.

use nalgebra::{distance, Point2};
use ndarray::ArrayView2;

use crate::canonical::CanonicalSchema;
use crate::joint::{Coordinate, Joint};

/// Angle at vertex `b` between rays `b→a` and `b→c`, in degrees.
///
/// The raw difference of the two ray headings is folded into `[0, 180]`.
///
/// # Example
///
/// ```
/// use nalgebra::Point2;
/// use rehab_motion::geometry::angle;
///
/// let a = Point2::new(1.0, 0.0);
/// let b = Point2::new(0.0, 0.0);
/// let c = Point2::new(0.0, 1.0);
/// assert!((angle(&a, &b, &c) - 90.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn angle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    let to_c = (c.y - b.y).atan2(c.x - b.x);
    let to_a = (a.y - b.y).atan2(a.x - b.x);
    let magnitude = (to_c - to_a).to_degrees().abs();
    if magnitude > 180.0 {
        360.0 - magnitude
    } else {
        magnitude
    }
}

/// [`angle`] applied frame by frame.
///
/// The output is as long as the shortest input.
#[must_use]
pub fn angle_series(a: &[Point2<f64>], b: &[Point2<f64>], c: &[Point2<f64>]) -> Vec<f64> {
    a.iter()
        .zip(b)
        .zip(c)
        .map(|((a, b), c)| angle(a, b, c))
        .collect()
}

/// Planar distance between two point sequences, frame by frame.
#[must_use]
pub fn distance_series(p: &[Point2<f64>], q: &[Point2<f64>]) -> Vec<f64> {
    p.iter().zip(q).map(|(p, q)| distance(p, q)).collect()
}

/// Midpoint of two point sequences, frame by frame.
#[must_use]
pub fn midpoint_series(p: &[Point2<f64>], q: &[Point2<f64>]) -> Vec<Point2<f64>> {
    p.iter().zip(q).map(|(p, q)| nalgebra::center(p, q)).collect()
}

/// Extract one joint's `(x, y)` track from canonical values.
///
/// `values` must be laid out in canonical column order.
#[must_use]
pub fn joint_track(values: &ArrayView2<'_, f64>, joint: Joint) -> Vec<Point2<f64>> {
    let xs = values.column(CanonicalSchema::position(joint, Coordinate::X));
    let ys = values.column(CanonicalSchema::position(joint, Coordinate::Y));
    xs.iter().zip(ys.iter()).map(|(&x, &y)| Point2::new(x, y)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_right_angle() {
        let a = Point2::new(0.0, 1.0);
        let b = Point2::new(0.0, 0.0);
        let c = Point2::new(1.0, 0.0);
        assert_relative_eq!(angle(&a, &b, &c), 90.0, epsilon = 1e-10);
        assert_relative_eq!(angle(&c, &b, &a), 90.0, epsilon = 1e-10);
    }

    #[test]
    fn test_straight_and_folded() {
        let b = Point2::new(0.0, 0.0);
        let a = Point2::new(-1.0, 0.0);
        let c = Point2::new(1.0, 0.0);
        assert_relative_eq!(angle(&a, &b, &c), 180.0, epsilon = 1e-10);

        // Headings of -135° and +135° differ by 270°, folded to 90°.
        let a = Point2::new(-1.0, -1.0);
        let c = Point2::new(-1.0, 1.0);
        assert_relative_eq!(angle(&a, &b, &c), 90.0, epsilon = 1e-10);
    }

    #[test]
    fn test_angle_always_in_range() {
        let mut seed = 17u64;
        let mut next = || {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            ((seed >> 11) as f64 / (1u64 << 53) as f64) * 20.0 - 10.0
        };
        for _ in 0..1000 {
            let a = Point2::new(next(), next());
            let b = Point2::new(next(), next());
            let c = Point2::new(next(), next());
            let value = angle(&a, &b, &c);
            assert!((0.0..=180.0).contains(&value), "angle out of range: {value}");
        }
    }

    #[test]
    fn test_nan_propagates() {
        let a = Point2::new(f64::NAN, 0.0);
        let b = Point2::new(0.0, 0.0);
        let c = Point2::new(1.0, 0.0);
        assert!(angle(&a, &b, &c).is_nan());
    }

    #[test]
    fn test_self_distance_zero() {
        let p = vec![Point2::new(0.3, 0.7), Point2::new(-2.0, 5.5)];
        assert!(distance_series(&p, &p).iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_distance_and_midpoint() {
        let p = vec![Point2::new(0.0, 0.0)];
        let q = vec![Point2::new(3.0, 4.0)];
        assert_relative_eq!(distance_series(&p, &q)[0], 5.0, epsilon = 1e-12);
        assert_eq!(midpoint_series(&p, &q)[0], Point2::new(1.5, 2.0));
    }

    #[test]
    fn test_series_lengths() {
        let p = vec![Point2::new(1.0, 0.0); 4];
        let q = vec![Point2::new(0.0, 0.0); 4];
        let r = vec![Point2::new(0.0, 1.0); 4];
        let angles = angle_series(&p, &q, &r);
        assert_eq!(angles.len(), 4);
        assert!(angles.iter().all(|&a| (a - 90.0).abs() < 1e-10));
    }
}
