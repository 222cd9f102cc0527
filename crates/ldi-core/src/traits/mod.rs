//! Core traits for the LDI workspace.
//!
//! Two abstractions connect the crates:
//!
//! - [`DiscountCurve`]: anything that can supply an interpolated rate, and
//!   through it a discount factor, for a time in years
//! - [`CashFlows`]: anything that can derive its own payment schedule
//!
//! Valuation code is generic over both, so instruments and curve
//! implementations never depend on each other directly.

use crate::types::CashFlowSchedule;

/// A term structure of interest rates queried by time in years.
///
/// The single compounding convention of the engine lives in the default
/// [`discount_factor`] implementation: annual compounding,
/// `df(t) = (1 + r(t))^(-t)`. Implementations normally only provide
/// [`rate_at`].
///
/// Both methods are total over `t >= 0`; implementations extrapolate rather
/// than fail outside their grid.
///
/// [`rate_at`]: DiscountCurve::rate_at
/// [`discount_factor`]: DiscountCurve::discount_factor
pub trait DiscountCurve: Send + Sync {
    /// Returns the interpolated rate at time `t` (years).
    fn rate_at(&self, t: f64) -> f64;

    /// Returns the discount factor for time `t` under annual compounding.
    ///
    /// For pathological rate levels (`1 + r <= 0`) the result can be
    /// non-finite; valuation layers surface that as a degenerate valuation
    /// rather than masking it here.
    fn discount_factor(&self, t: f64) -> f64 {
        (1.0 + self.rate_at(t)).powf(-t)
    }
}

/// Anything that can derive a cash-flow schedule for itself.
///
/// Implemented by instruments (bonds, liabilities). Schedules are derived on
/// demand and never cached on the instrument, since the same instrument is
/// valued under many curves within one scenario run.
pub trait CashFlows {
    /// Returns the instrument's cash-flow schedule, ordered by time.
    fn cash_flows(&self) -> CashFlowSchedule;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct FlatCurve(f64);

    impl DiscountCurve for FlatCurve {
        fn rate_at(&self, _t: f64) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_annual_compounding_default() {
        let curve = FlatCurve(0.05);
        assert_relative_eq!(curve.discount_factor(0.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            curve.discount_factor(2.0),
            1.0 / (1.05 * 1.05),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_discount_factor_decreasing() {
        let curve = FlatCurve(0.03);
        let mut prev = curve.discount_factor(0.5);
        for i in 1..40 {
            let t = 0.5 + f64::from(i) * 0.5;
            let df = curve.discount_factor(t);
            assert!(df < prev, "df must strictly decrease, failed at t={t}");
            prev = df;
        }
    }
}
