//! Core value types.

mod cashflow;

pub use cashflow::{CashFlow, CashFlowSchedule};
