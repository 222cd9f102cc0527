//! Fixed-coupon bond instrument.

use ldi_core::{CashFlow, CashFlowSchedule, CashFlows};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{InstrumentError, InstrumentResult};

/// A default-free fixed-coupon bond with annual coupons.
///
/// Immutable once constructed. The cash-flow schedule is derived on demand:
///
/// - maturity under one year: a single payment at maturity of
///   `face_value * (1 + coupon_rate * maturity)` (prorated coupon)
/// - whole-year maturity: coupons of `coupon_rate * face_value` at each year,
///   with the final payment combining the last coupon and the redemption
/// - fractional maturity over one year: whole-year coupons up to the last
///   whole year, then a final payment at maturity of the redemption plus the
///   coupon prorated over the stub period
///
/// An optional market `price` can be attached; where a per-unit present value
/// is consumed (the optimizer's funding and duration constraints) it
/// overrides the model-derived value. Schedule-based revaluation under
/// shifted curves always works from the cash flows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    maturity: f64,
    coupon_rate: f64,
    face_value: f64,
    price: Option<f64>,
}

impl Bond {
    /// Creates a new bond.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field when `maturity`
    /// or `face_value` is not strictly positive and finite, or when
    /// `coupon_rate` is negative or non-finite.
    pub fn new(maturity: f64, coupon_rate: f64, face_value: f64) -> InstrumentResult<Self> {
        if !maturity.is_finite() || maturity <= 0.0 {
            return Err(InstrumentError::validation(
                "maturity",
                format!("must be positive and finite, got {maturity}"),
            ));
        }
        if !coupon_rate.is_finite() || coupon_rate < 0.0 {
            return Err(InstrumentError::validation(
                "coupon_rate",
                format!("must be non-negative and finite, got {coupon_rate}"),
            ));
        }
        if !face_value.is_finite() || face_value <= 0.0 {
            return Err(InstrumentError::validation(
                "face_value",
                format!("must be positive and finite, got {face_value}"),
            ));
        }
        Ok(Self {
            maturity,
            coupon_rate,
            face_value,
            price: None,
        })
    }

    /// Attaches an externally supplied market price.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `price` is not strictly positive and
    /// finite.
    pub fn with_price(mut self, price: f64) -> InstrumentResult<Self> {
        if !price.is_finite() || price <= 0.0 {
            return Err(InstrumentError::validation(
                "price",
                format!("must be positive and finite, got {price}"),
            ));
        }
        self.price = Some(price);
        Ok(self)
    }

    /// Returns the maturity in years.
    #[must_use]
    pub fn maturity(&self) -> f64 {
        self.maturity
    }

    /// Returns the annual coupon rate.
    #[must_use]
    pub fn coupon_rate(&self) -> f64 {
        self.coupon_rate
    }

    /// Returns the face value.
    #[must_use]
    pub fn face_value(&self) -> f64 {
        self.face_value
    }

    /// Returns the externally supplied market price, if any.
    #[must_use]
    pub fn price(&self) -> Option<f64> {
        self.price
    }
}

impl CashFlows for Bond {
    fn cash_flows(&self) -> CashFlowSchedule {
        if self.maturity < 1.0 {
            let mut schedule = CashFlowSchedule::with_capacity(1);
            schedule.push(CashFlow::new(
                self.maturity,
                self.face_value * (1.0 + self.coupon_rate * self.maturity),
            ));
            return schedule;
        }

        let coupon = self.face_value * self.coupon_rate;
        let whole_years = self.maturity.floor();
        let stub = self.maturity - whole_years;
        let last_whole = whole_years as u32;

        let mut schedule = CashFlowSchedule::with_capacity(last_whole as usize + 1);
        for year in 1..=last_whole {
            let t = f64::from(year);
            if stub == 0.0 && year == last_whole {
                schedule.push(CashFlow::new(t, coupon + self.face_value));
            } else {
                schedule.push(CashFlow::new(t, coupon));
            }
        }
        if stub > 0.0 {
            schedule.push(CashFlow::new(
                self.maturity,
                self.face_value * (1.0 + self.coupon_rate * stub),
            ));
        }
        schedule
    }
}

impl fmt::Display for Bond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bond({}Y, {:.2}%, FV {:.0})",
            self.maturity,
            self.coupon_rate * 100.0,
            self.face_value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_valid_bond() {
        let bond = Bond::new(10.0, 0.05, 1_000.0).unwrap();
        assert_eq!(bond.maturity(), 10.0);
        assert_eq!(bond.coupon_rate(), 0.05);
        assert_eq!(bond.face_value(), 1_000.0);
        assert!(bond.price().is_none());
    }

    #[test]
    fn test_zero_coupon_allowed() {
        assert!(Bond::new(10.0, 0.0, 1_000.0).is_ok());
    }

    #[test]
    fn test_negative_coupon_fails() {
        let err = Bond::new(10.0, -0.01, 1_000.0).unwrap_err();
        assert!(matches!(
            err,
            InstrumentError::Validation {
                field: "coupon_rate",
                ..
            }
        ));
    }

    #[test]
    fn test_price_override() {
        let bond = Bond::new(10.0, 0.05, 1_000.0)
            .unwrap()
            .with_price(980.0)
            .unwrap();
        assert_eq!(bond.price(), Some(980.0));

        assert!(Bond::new(10.0, 0.05, 1_000.0)
            .unwrap()
            .with_price(0.0)
            .is_err());
    }

    #[test]
    fn test_whole_year_schedule() {
        let bond = Bond::new(3.0, 0.04, 1_000.0).unwrap();
        let flows = bond.cash_flows();
        let expected = [(1.0, 40.0), (2.0, 40.0), (3.0, 1_040.0)];

        assert_eq!(flows.len(), expected.len());
        for (cf, &(t, amount)) in flows.iter().zip(&expected) {
            assert_relative_eq!(cf.time(), t, epsilon = 1e-12);
            assert_relative_eq!(cf.amount(), amount, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_short_maturity_schedule() {
        let bond = Bond::new(0.5, 0.04, 1_000.0).unwrap();
        let flows = bond.cash_flows();

        assert_eq!(flows.len(), 1);
        assert_relative_eq!(flows.as_slice()[0].time(), 0.5, epsilon = 1e-12);
        // Half a year of 4% coupon, prorated.
        assert_relative_eq!(flows.as_slice()[0].amount(), 1_020.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fractional_maturity_schedule() {
        let bond = Bond::new(2.5, 0.04, 1_000.0).unwrap();
        let flows = bond.cash_flows();
        let expected = [(1.0, 40.0), (2.0, 40.0), (2.5, 1_020.0)];

        assert_eq!(flows.len(), expected.len());
        for (cf, &(t, amount)) in flows.iter().zip(&expected) {
            assert_relative_eq!(cf.time(), t, epsilon = 1e-12);
            assert_relative_eq!(cf.amount(), amount, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_one_year_bond_single_payment() {
        let bond = Bond::new(1.0, 0.03, 1_000.0).unwrap();
        let flows = bond.cash_flows();

        assert_eq!(flows.len(), 1);
        assert_relative_eq!(flows.as_slice()[0].amount(), 1_030.0, epsilon = 1e-9);
    }
}
