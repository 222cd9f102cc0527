//! Cash flow types for valuation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single undated-calendar cash flow: an amount paid at a time measured in
/// years from the valuation date.
///
/// Times are year fractions rather than calendar dates; the engine works in a
/// single currency and a single annual-frequency convention, so the pair
/// `(time, amount)` is the complete description of a payment.
///
/// # Example
///
/// ```rust
/// use ldi_core::types::CashFlow;
///
/// let cf = CashFlow::new(5.0, 1_000.0);
/// assert_eq!(cf.time(), 5.0);
/// assert_eq!(cf.amount(), 1_000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    /// Time to payment in years from the valuation date.
    time: f64,
    /// Payment amount in currency units.
    amount: f64,
}

impl CashFlow {
    /// Creates a new cash flow.
    #[must_use]
    pub fn new(time: f64, amount: f64) -> Self {
        Self { time, amount }
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

impl fmt::Display for CashFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}Y", self.amount, self.time)
    }
}

/// An ordered schedule of cash flows.
///
/// Construction does not enforce ordering; call [`sort_by_time`] when the
/// source cannot guarantee it. Valuation is order-independent.
///
/// [`sort_by_time`]: CashFlowSchedule::sort_by_time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSchedule {
    flows: Vec<CashFlow>,
}

impl CashFlowSchedule {
    /// Creates a new empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self { flows: Vec::new() }
    }

    /// Creates a schedule with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            flows: Vec::with_capacity(capacity),
        }
    }

    /// Adds a cash flow to the schedule.
    pub fn push(&mut self, cf: CashFlow) {
        self.flows.push(cf);
    }

    /// Returns the cash flows as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[CashFlow] {
        &self.flows
    }

    /// Returns the number of cash flows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    /// Returns true if there are no cash flows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Returns an iterator over the cash flows.
    pub fn iter(&self) -> impl Iterator<Item = &CashFlow> {
        self.flows.iter()
    }

    /// Returns the undiscounted total of all cash flows.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.flows.iter().map(CashFlow::amount).sum()
    }

    /// Sorts cash flows by payment time.
    pub fn sort_by_time(&mut self) {
        self.flows
            .sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(std::cmp::Ordering::Equal));
    }
}

impl IntoIterator for CashFlowSchedule {
    type Item = CashFlow;
    type IntoIter = std::vec::IntoIter<CashFlow>;

    fn into_iter(self) -> Self::IntoIter {
        self.flows.into_iter()
    }
}

impl<'a> IntoIterator for &'a CashFlowSchedule {
    type Item = &'a CashFlow;
    type IntoIter = std::slice::Iter<'a, CashFlow>;

    fn into_iter(self) -> Self::IntoIter {
        self.flows.iter()
    }
}

impl FromIterator<CashFlow> for CashFlowSchedule {
    fn from_iter<I: IntoIterator<Item = CashFlow>>(iter: I) -> Self {
        Self {
            flows: iter.into_iter().collect(),
        }
    }
}
