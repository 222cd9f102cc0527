//! Yield curve implementation.

use ldi_core::DiscountCurve;
use ldi_math::interpolation::LinearInterpolator;

use crate::error::{CurveError, CurveResult};

/// A yield curve defined by discrete (time, rate) points.
///
/// Rates are linearly interpolated inside the grid and held flat outside it,
/// so [`rate_at`] is total over `[0, ∞)`. Discount factors use annual
/// compounding, `df(t) = (1 + r(t))^(-t)`.
///
/// The curve is an immutable value object: a parallel shift produces a new
/// instance and never mutates the original.
///
/// # Example
///
/// ```rust
/// use ldi_curves::YieldCurve;
///
/// let curve = YieldCurve::new(vec![1.0, 2.0, 5.0, 10.0], vec![0.02, 0.025, 0.03, 0.035]).unwrap();
/// assert!((curve.rate_at(3.0) - 0.02666666666666667).abs() < 1e-12);
/// assert!(curve.discount_factor(5.0) < 1.0);
///
/// let bumped = curve.shifted(0.01);
/// assert!((bumped.rate_at(1.0) - 0.03).abs() < 1e-12);
/// ```
///
/// [`rate_at`]: YieldCurve::rate_at
#[derive(Debug, Clone)]
pub struct YieldCurve {
    times: Vec<f64>,
    rates: Vec<f64>,
    interp: LinearInterpolator,
}

impl YieldCurve {
    /// Creates a new yield curve from (time, rate) points.
    ///
    /// # Errors
    ///
    /// Returns a [`CurveError`] if fewer than two points are given, if the
    /// lengths differ, if any value is non-finite, or if the times are not
    /// strictly ascending and positive.
    pub fn new(times: Vec<f64>, rates: Vec<f64>) -> CurveResult<Self> {
        if times.len() != rates.len() {
            return Err(CurveError::LengthMismatch {
                times: times.len(),
                rates: rates.len(),
            });
        }
        if times.len() < 2 {
            return Err(CurveError::insufficient_points(2, times.len()));
        }
        for (index, &value) in times.iter().enumerate() {
            if !value.is_finite() {
                return Err(CurveError::NonFiniteValue {
                    field: "times",
                    index,
                    value,
                });
            }
            if value <= 0.0 {
                return Err(CurveError::NonPositiveTime { index, value });
            }
            if index > 0 && value <= times[index - 1] {
                return Err(CurveError::non_ascending_times(
                    index,
                    times[index - 1],
                    value,
                ));
            }
        }
        for (index, &value) in rates.iter().enumerate() {
            if !value.is_finite() {
                return Err(CurveError::NonFiniteValue {
                    field: "rates",
                    index,
                    value,
                });
            }
        }

        let interp = LinearInterpolator::new(times.clone(), rates.clone())
            .expect("grid validated above");

        Ok(Self {
            times,
            rates,
            interp,
        })
    }

    /// Returns the interpolated rate at time `t` (years).
    ///
    /// Linear inside the grid, flat (clamped to the nearest endpoint)
    /// outside it.
    #[must_use]
    pub fn rate_at(&self, t: f64) -> f64 {
        self.interp.interpolate_clamped(t)
    }

    /// Returns the annual-compounding discount factor for time `t`.
    #[must_use]
    pub fn discount_factor(&self, t: f64) -> f64 {
        (1.0 + self.rate_at(t)).powf(-t)
    }

    /// Returns a new curve with every rate moved by `delta` (parallel shift).
    ///
    /// The time grid is unchanged; `shifted(0.0)` reproduces the original
    /// curve's rates exactly.
    #[must_use]
    pub fn shifted(&self, delta: f64) -> Self {
        let rates: Vec<f64> = self.rates.iter().map(|r| r + delta).collect();
        let interp = LinearInterpolator::new(self.times.clone(), rates.clone())
            .expect("grid validated at construction");
        Self {
            times: self.times.clone(),
            rates,
            interp,
        }
    }

    /// Returns the time grid.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Returns the rates at the grid points.
    #[must_use]
    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    /// Returns the number of grid points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always false: construction requires at least two points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

impl DiscountCurve for YieldCurve {
    fn rate_at(&self, t: f64) -> f64 {
        YieldCurve::rate_at(self, t)
    }

    fn discount_factor(&self, t: f64) -> f64 {
        YieldCurve::discount_factor(self, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_curve() -> YieldCurve {
        YieldCurve::new(vec![1.0, 5.0], vec![0.02, 0.03]).unwrap()
    }

    #[test]
    fn test_interpolation() {
        let curve = sample_curve();
        assert_relative_eq!(curve.rate_at(1.0), 0.02, epsilon = 1e-12);
        assert_relative_eq!(curve.rate_at(5.0), 0.03, epsilon = 1e-12);
        assert_relative_eq!(curve.rate_at(3.0), 0.025, epsilon = 1e-12);
    }

    #[test]
    fn test_flat_extrapolation() {
        let curve = sample_curve();
        assert_relative_eq!(curve.rate_at(0.5), 0.02, epsilon = 1e-12);
        assert_relative_eq!(curve.rate_at(10.0), 0.03, epsilon = 1e-12);
    }

    #[test]
    fn test_discount_factor_annual_compounding() {
        let curve = sample_curve();
        assert_relative_eq!(
            curve.discount_factor(1.0),
            1.0 / 1.02,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            curve.discount_factor(5.0),
            1.03_f64.powi(-5),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_discount_factor_monotone_decreasing() {
        let curve = sample_curve();
        let mut prev = curve.discount_factor(0.25);
        for i in 1..60 {
            let t = 0.25 * f64::from(i + 1);
            let df = curve.discount_factor(t);
            assert!(df < prev, "df not strictly decreasing at t={t}");
            prev = df;
        }
    }

    #[test]
    fn test_zero_shift_is_identity() {
        let curve = sample_curve();
        let same = curve.shifted(0.0);
        for &t in &[0.5, 1.0, 2.5, 3.0, 5.0, 8.0] {
            assert_relative_eq!(same.rate_at(t), curve.rate_at(t), epsilon = 1e-15);
        }
    }

    #[test]
    fn test_parallel_shift() {
        let curve = YieldCurve::new(vec![1.0, 2.0, 5.0], vec![0.02, 0.025, 0.03]).unwrap();
        let bumped = curve.shifted(0.01);

        assert_relative_eq!(bumped.rate_at(1.0), 0.03, epsilon = 1e-12);
        assert_relative_eq!(bumped.rate_at(2.0), 0.035, epsilon = 1e-12);
        assert_relative_eq!(bumped.rate_at(5.0), 0.04, epsilon = 1e-12);
        // Original untouched.
        assert_relative_eq!(curve.rate_at(1.0), 0.02, epsilon = 1e-12);
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            YieldCurve::new(vec![1.0, 2.0, 5.0], vec![0.02, 0.025]),
            Err(CurveError::LengthMismatch { .. })
        ));
        assert!(matches!(
            YieldCurve::new(vec![1.0], vec![0.02]),
            Err(CurveError::InsufficientPoints { .. })
        ));
        assert!(matches!(
            YieldCurve::new(vec![1.0, 5.0, 2.0], vec![0.02, 0.03, 0.025]),
            Err(CurveError::NonAscendingTimes { .. })
        ));
        assert!(matches!(
            YieldCurve::new(vec![-1.0, 2.0], vec![0.02, 0.025]),
            Err(CurveError::NonPositiveTime { .. })
        ));
        assert!(matches!(
            YieldCurve::new(vec![1.0, f64::NAN], vec![0.02, 0.025]),
            Err(CurveError::NonFiniteValue { .. })
        ));
    }
}
