//! Liability instrument.

use ldi_core::{CashFlow, CashFlowSchedule, CashFlows};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{InstrumentError, InstrumentResult};

/// A single future obligation: an amount due at a time in years.
///
/// Immutable once constructed. Its cash-flow schedule is the single flow
/// `(time, amount)`, which makes its Macaulay duration equal to its time by
/// definition.
///
/// # Example
///
/// ```rust
/// use ldi_instruments::Liability;
///
/// let claim = Liability::new(5.0, 2_000_000.0).unwrap();
/// assert_eq!(claim.time(), 5.0);
/// assert!(Liability::new(-1.0, 100.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Liability {
    time: f64,
    amount: f64,
}

impl Liability {
    /// Creates a new liability.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field when `time` or
    /// `amount` is not strictly positive and finite.
    pub fn new(time: f64, amount: f64) -> InstrumentResult<Self> {
        if !time.is_finite() || time <= 0.0 {
            return Err(InstrumentError::validation(
                "time",
                format!("must be positive and finite, got {time}"),
            ));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(InstrumentError::validation(
                "amount",
                format!("must be positive and finite, got {amount}"),
            ));
        }
        Ok(Self { time, amount })
    }

    /// Returns the time to payment in years.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Returns the payment amount.
    #[must_use]
    pub fn amount(&self) -> f64 {
        self.amount
    }
}

impl CashFlows for Liability {
    fn cash_flows(&self) -> CashFlowSchedule {
        let mut schedule = CashFlowSchedule::with_capacity(1);
        schedule.push(CashFlow::new(self.time, self.amount));
        schedule
    }
}

impl fmt::Display for Liability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Liability({}Y, {:.0})", self.time, self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_liability() {
        let liability = Liability::new(5.0, 1_000_000.0).unwrap();
        assert_eq!(liability.time(), 5.0);
        assert_eq!(liability.amount(), 1_000_000.0);
    }

    #[test]
    fn test_negative_time_fails() {
        let err = Liability::new(-1.0, 1_000_000.0).unwrap_err();
        assert!(matches!(
            err,
            InstrumentError::Validation { field: "time", .. }
        ));
    }

    #[test]
    fn test_zero_amount_fails() {
        let err = Liability::new(5.0, 0.0).unwrap_err();
        assert!(matches!(
            err,
            InstrumentError::Validation { field: "amount", .. }
        ));
    }

    #[test]
    fn test_single_cash_flow() {
        let liability = Liability::new(5.0, 2_000.0).unwrap();
        let schedule = liability.cash_flows();
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.as_slice()[0].time(), 5.0);
        assert_eq!(schedule.as_slice()[0].amount(), 2_000.0);
    }
}
