//! Present value, duration, and convexity.
//!
//! Pure functions over (cash-flow source, discount curve) pairs. Metrics are
//! recomputed on demand rather than cached on the instrument, since the same
//! instrument is valued under many curves (base and shifted) in one run.

use ldi_core::{CashFlowSchedule, CashFlows, DiscountCurve};
use serde::{Deserialize, Serialize};

use crate::bond::Bond;
use crate::error::{InstrumentError, InstrumentResult};

/// Valuation metrics for a cash-flow schedule under a curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// Present value: `Σ c_i · df(t_i)`.
    pub present_value: f64,
    /// Macaulay duration: PV-weighted average time to payment.
    pub duration: f64,
    /// Convexity: PV-weighted average squared time to payment.
    pub convexity: f64,
}

/// Computes present value, duration, and convexity for a schedule.
///
/// # Errors
///
/// Returns [`InstrumentError::DegenerateValuation`] when the present value is
/// non-finite or not strictly positive, where duration and convexity are
/// undefined.
pub fn schedule_valuation(
    schedule: &CashFlowSchedule,
    curve: &impl DiscountCurve,
) -> InstrumentResult<Valuation> {
    let mut pv = 0.0;
    let mut weighted_time = 0.0;
    let mut weighted_time_sq = 0.0;

    for cf in schedule {
        let discounted = cf.amount() * curve.discount_factor(cf.time());
        pv += discounted;
        weighted_time += cf.time() * discounted;
        weighted_time_sq += cf.time() * cf.time() * discounted;
    }

    check_present_value(pv)?;
    Ok(Valuation {
        present_value: pv,
        duration: weighted_time / pv,
        convexity: weighted_time_sq / pv,
    })
}

/// Computes the present value of a schedule.
///
/// # Errors
///
/// Same degeneracy conditions as [`schedule_valuation`].
pub fn schedule_present_value(
    schedule: &CashFlowSchedule,
    curve: &impl DiscountCurve,
) -> InstrumentResult<f64> {
    let mut pv = 0.0;
    for cf in schedule {
        pv += cf.amount() * curve.discount_factor(cf.time());
    }
    check_present_value(pv)?;
    Ok(pv)
}

/// Computes valuation metrics for any cash-flow source.
pub fn valuation<T: CashFlows>(
    instrument: &T,
    curve: &impl DiscountCurve,
) -> InstrumentResult<Valuation> {
    schedule_valuation(&instrument.cash_flows(), curve)
}

/// Computes the present value of any cash-flow source.
pub fn present_value<T: CashFlows>(
    instrument: &T,
    curve: &impl DiscountCurve,
) -> InstrumentResult<f64> {
    schedule_present_value(&instrument.cash_flows(), curve)
}

/// Returns the bond's per-unit value: the externally supplied market price
/// when present, the model present value otherwise.
pub fn bond_price(bond: &Bond, curve: &impl DiscountCurve) -> InstrumentResult<f64> {
    match bond.price() {
        Some(price) => Ok(price),
        None => present_value(bond, curve),
    }
}

fn check_present_value(pv: f64) -> InstrumentResult<()> {
    if !pv.is_finite() {
        return Err(InstrumentError::degenerate(format!(
            "present value is not finite ({pv})"
        )));
    }
    if pv <= 0.0 {
        return Err(InstrumentError::degenerate(format!(
            "present value {pv} is not strictly positive; duration and convexity are undefined"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liability::Liability;
    use approx::assert_relative_eq;
    use ldi_curves::YieldCurve;

    fn flat(rate: f64) -> YieldCurve {
        YieldCurve::new(vec![1.0, 30.0], vec![rate, rate]).unwrap()
    }

    #[test]
    fn test_single_flow_duration_equals_time() {
        let liability = Liability::new(5.0, 2_000.0).unwrap();
        let metrics = valuation(&liability, &flat(0.03)).unwrap();

        assert_relative_eq!(metrics.present_value, 2_000.0 * 1.03_f64.powi(-5), epsilon = 1e-9);
        assert_relative_eq!(metrics.duration, 5.0, epsilon = 1e-9);
        assert_relative_eq!(metrics.convexity, 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_coupon_bond_duration_equals_maturity() {
        let bond = Bond::new(4.0, 0.0, 1_000.0).unwrap();
        let metrics = valuation(&bond, &flat(0.05)).unwrap();

        assert_relative_eq!(metrics.duration, 4.0, epsilon = 1e-9);
        assert_relative_eq!(metrics.convexity, 16.0, epsilon = 1e-9);
    }

    #[test]
    fn test_coupon_bond_valuation() {
        let bond = Bond::new(2.0, 0.03, 1_000.0).unwrap();
        let curve = YieldCurve::new(vec![1.0, 2.0], vec![0.02, 0.025]).unwrap();
        let metrics = valuation(&bond, &curve).unwrap();

        let pv1 = 30.0 / 1.02;
        let pv2 = 1_030.0 / (1.025 * 1.025);
        assert_relative_eq!(metrics.present_value, pv1 + pv2, epsilon = 1e-9);
        assert_relative_eq!(
            metrics.duration,
            (pv1 + 2.0 * pv2) / (pv1 + pv2),
            epsilon = 1e-9
        );
        // Coupon bond duration sits strictly below maturity.
        assert!(metrics.duration < 2.0);
    }

    #[test]
    fn test_bond_price_override() {
        let curve = flat(0.03);
        let plain = Bond::new(5.0, 0.04, 1_000.0).unwrap();
        let quoted = plain.with_price(995.0).unwrap();

        let model = bond_price(&plain, &curve).unwrap();
        assert_relative_eq!(model, present_value(&plain, &curve).unwrap(), epsilon = 1e-12);
        assert_relative_eq!(bond_price(&quoted, &curve).unwrap(), 995.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_zero_pv() {
        // Astronomical rates drive every discount factor to underflow.
        let curve = flat(1e300);
        let liability = Liability::new(5.0, 2_000.0).unwrap();

        let err = present_value(&liability, &curve).unwrap_err();
        assert!(matches!(err, InstrumentError::DegenerateValuation { .. }));
    }

    #[test]
    fn test_degenerate_nan_pv() {
        // Rates below -100% make (1 + r) negative; a fractional exponent then
        // yields NaN.
        let curve = flat(-1.5);
        let liability = Liability::new(2.5, 2_000.0).unwrap();

        let err = valuation(&liability, &curve).unwrap_err();
        assert!(matches!(err, InstrumentError::DegenerateValuation { .. }));
    }

    #[test]
    fn test_degenerate_negative_pv() {
        // Odd integer time with (1 + r) < 0 gives a finite but negative
        // discount factor.
        let curve = flat(-1.5);
        let liability = Liability::new(3.0, 2_000.0).unwrap();

        let err = valuation(&liability, &curve).unwrap_err();
        assert!(matches!(err, InstrumentError::DegenerateValuation { .. }));
    }

    #[test]
    fn test_empty_schedule_degenerate() {
        let schedule = CashFlowSchedule::new();
        assert!(schedule_valuation(&schedule, &flat(0.03)).is_err());
    }
}
