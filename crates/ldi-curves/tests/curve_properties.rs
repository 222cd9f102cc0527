//! Property-based tests for yield curves.

use ldi_curves::YieldCurve;
use proptest::prelude::*;

/// Arbitrary valid curve: strictly ascending positive times built from
/// positive increments, rates in a plausible positive band.
fn arb_curve() -> impl Strategy<Value = YieldCurve> {
    proptest::collection::vec((0.1_f64..2.0, 0.001_f64..0.15), 2..8).prop_map(|pairs| {
        let mut t = 0.0;
        let mut times = Vec::with_capacity(pairs.len());
        let mut rates = Vec::with_capacity(pairs.len());
        for (dt, rate) in pairs {
            t += dt;
            times.push(t);
            rates.push(rate);
        }
        YieldCurve::new(times, rates).unwrap()
    })
}

proptest! {
    #[test]
    fn discount_factors_stay_in_unit_interval(curve in arb_curve(), t in 0.01_f64..40.0) {
        let df = curve.discount_factor(t);
        prop_assert!(df > 0.0);
        prop_assert!(df <= 1.0);
    }

    #[test]
    fn interpolated_rates_stay_within_grid_bounds(curve in arb_curve(), t in 0.0_f64..40.0) {
        let lowest = curve.rates().iter().copied().fold(f64::INFINITY, f64::min);
        let highest = curve.rates().iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let rate = curve.rate_at(t);
        prop_assert!(rate >= lowest - 1e-12);
        prop_assert!(rate <= highest + 1e-12);
    }

    #[test]
    fn parallel_shift_moves_grid_rates_exactly(curve in arb_curve(), delta in -0.01_f64..0.05) {
        let shifted = curve.shifted(delta);
        for (&t, &rate) in curve.times().iter().zip(curve.rates()) {
            prop_assert!((shifted.rate_at(t) - (rate + delta)).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_shift_reproduces_original_rates(curve in arb_curve(), t in 0.0_f64..40.0) {
        let same = curve.shifted(0.0);
        prop_assert_eq!(same.rate_at(t), curve.rate_at(t));
    }
}
