//! Error types for instruments and valuation.

use thiserror::Error;

/// A specialized Result type for instrument operations.
pub type InstrumentResult<T> = Result<T, InstrumentError>;

/// Errors raised by instrument construction and valuation.
#[derive(Error, Debug, Clone)]
pub enum InstrumentError {
    /// A construction input violates its constraint.
    ///
    /// Raised immediately at construction, naming the offending field; the
    /// value is never silently corrected.
    #[error("invalid {field}: {constraint}")]
    Validation {
        /// The offending field.
        field: &'static str,
        /// The constraint that was violated.
        constraint: String,
    },

    /// A cash-flow schedule discounts to a present value for which duration
    /// and convexity are undefined (zero, negative, or non-finite).
    ///
    /// Callers must treat this as a precondition failure of the inputs, not
    /// as an optimization failure.
    #[error("degenerate valuation: {reason}")]
    DegenerateValuation {
        /// Description of the degeneracy.
        reason: String,
    },
}

impl InstrumentError {
    /// Creates a validation error for `field`.
    #[must_use]
    pub fn validation(field: &'static str, constraint: impl Into<String>) -> Self {
        Self::Validation {
            field,
            constraint: constraint.into(),
        }
    }

    /// Creates a degenerate valuation error.
    #[must_use]
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateValuation {
            reason: reason.into(),
        }
    }
}
