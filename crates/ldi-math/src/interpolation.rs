//! Linear interpolation over sorted point data.

use crate::error::{MathError, MathResult};

/// Linear interpolation between data points.
///
/// Inside the data range consecutive points are connected with straight
/// lines. Outside the range behavior depends on the query method:
/// [`interpolate`] rejects out-of-range points, while
/// [`interpolate_clamped`] holds the boundary value flat, which is the
/// conventional treatment for rate curves queried beyond their last tenor.
///
/// # Example
///
/// ```rust
/// use ldi_math::interpolation::LinearInterpolator;
///
/// let interp = LinearInterpolator::new(vec![1.0, 5.0], vec![0.02, 0.03]).unwrap();
/// assert!((interp.interpolate(3.0).unwrap() - 0.025).abs() < 1e-12);
/// assert!((interp.interpolate_clamped(10.0) - 0.03).abs() < 1e-12);
/// ```
///
/// [`interpolate`]: LinearInterpolator::interpolate
/// [`interpolate_clamped`]: LinearInterpolator::interpolate_clamped
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl LinearInterpolator {
    /// Creates a new linear interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 2 points, if lengths differ,
    /// if any coordinate is non-finite, or if the x values are not strictly
    /// increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        if xs.len() < 2 {
            return Err(MathError::insufficient_data(2, xs.len()));
        }
        if xs.len() != ys.len() {
            return Err(MathError::dimension_mismatch("xs", xs.len(), "ys", ys.len()));
        }
        for (i, (&x, &y)) in xs.iter().zip(&ys).enumerate() {
            if !x.is_finite() || !y.is_finite() {
                return Err(MathError::non_finite(format!("interpolation point {i}")));
            }
        }
        for i in 1..xs.len() {
            if xs[i] <= xs[i - 1] {
                return Err(MathError::invalid_input(
                    "x values must be strictly increasing",
                ));
            }
        }

        Ok(Self { xs, ys })
    }

    /// Returns the smallest x in the data range.
    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.xs[0]
    }

    /// Returns the largest x in the data range.
    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }

    /// Interpolates at `x`, rejecting points outside the data range.
    pub fn interpolate(&self, x: f64) -> MathResult<f64> {
        if x < self.min_x() || x > self.max_x() {
            return Err(MathError::ExtrapolationNotAllowed {
                x,
                min: self.min_x(),
                max: self.max_x(),
            });
        }
        Ok(self.value_in_range(x))
    }

    /// Interpolates at `x`, clamping to the nearest boundary value outside
    /// the data range (flat extrapolation). Total over all finite `x`.
    #[must_use]
    pub fn interpolate_clamped(&self, x: f64) -> f64 {
        if x <= self.min_x() {
            return self.ys[0];
        }
        if x >= self.max_x() {
            return self.ys[self.ys.len() - 1];
        }
        self.value_in_range(x)
    }

    /// Linear interpolation for x within [min_x, max_x].
    fn value_in_range(&self, x: f64) -> f64 {
        // partition_point returns the first index with xs[i] > x, so the
        // segment is [i-1, i]; clamp for x at the boundaries.
        let hi = self
            .xs
            .partition_point(|&probe| probe <= x)
            .clamp(1, self.xs.len() - 1);
        let lo = hi - 1;

        let t = (x - self.xs[lo]) / (self.xs[hi] - self.xs[lo]);
        self.ys[lo] + t * (self.ys[hi] - self.ys[lo])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_interpolation_at_nodes_and_midpoints() {
        let interp = LinearInterpolator::new(vec![0.0, 1.0, 2.0], vec![0.0, 2.0, 4.0]).unwrap();

        assert_relative_eq!(interp.interpolate(0.0).unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(interp.interpolate(1.0).unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(interp.interpolate(2.0).unwrap(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(interp.interpolate(0.5).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(interp.interpolate(1.5).unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let interp = LinearInterpolator::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();

        assert!(interp.interpolate(-0.5).is_err());
        assert!(interp.interpolate(1.5).is_err());
    }

    #[test]
    fn test_clamped_extrapolation() {
        let interp = LinearInterpolator::new(vec![1.0, 5.0], vec![0.02, 0.03]).unwrap();

        assert_relative_eq!(interp.interpolate_clamped(0.5), 0.02, epsilon = 1e-12);
        assert_relative_eq!(interp.interpolate_clamped(10.0), 0.03, epsilon = 1e-12);
        assert_relative_eq!(interp.interpolate_clamped(3.0), 0.025, epsilon = 1e-12);
    }

    #[test]
    fn test_insufficient_points() {
        assert!(LinearInterpolator::new(vec![0.0], vec![1.0]).is_err());
    }

    #[test]
    fn test_length_mismatch() {
        assert!(LinearInterpolator::new(vec![0.0, 1.0, 2.0], vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn test_unsorted_rejected() {
        assert!(LinearInterpolator::new(vec![1.0, 0.0, 2.0], vec![1.0, 0.0, 2.0]).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(LinearInterpolator::new(vec![0.0, f64::NAN], vec![1.0, 2.0]).is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Interpolated values never leave the convex hull of the data.
            #[test]
            fn clamped_values_stay_within_data_bounds(
                increments in proptest::collection::vec((0.1_f64..5.0, -10.0_f64..10.0), 2..10),
                x in -20.0_f64..100.0,
            ) {
                let mut t = 0.0;
                let mut xs = Vec::with_capacity(increments.len());
                let mut ys = Vec::with_capacity(increments.len());
                for (dt, y) in increments {
                    t += dt;
                    xs.push(t);
                    ys.push(y);
                }
                let lowest = ys.iter().copied().fold(f64::INFINITY, f64::min);
                let highest = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);

                let interp = LinearInterpolator::new(xs, ys).unwrap();
                let y = interp.interpolate_clamped(x);
                prop_assert!(y >= lowest - 1e-9);
                prop_assert!(y <= highest + 1e-9);
            }
        }
    }
}
