//! Error types for portfolio construction and analysis.

use ldi_instruments::InstrumentError;
use ldi_math::MathError;
use thiserror::Error;

/// Result type for portfolio operations.
pub type PortfolioResult<T> = Result<T, PortfolioError>;

/// Errors that can occur during portfolio operations.
///
/// Solver non-convergence is not represented here: it is reported as data on
/// the result (`success: false` with a message) so that callers can fall
/// back to the baseline portfolio.
#[derive(Error, Debug, Clone)]
pub enum PortfolioError {
    /// The liability set is empty.
    #[error("no liabilities supplied")]
    NoLiabilities,

    /// The bond universe is empty.
    #[error("no bonds supplied")]
    NoBonds,

    /// The quantity vector does not line up with the bond universe.
    #[error("quantity vector length {quantities} does not match bond count {bonds}")]
    QuantityMismatch {
        /// Number of quantities supplied.
        quantities: usize,
        /// Number of bonds supplied.
        bonds: usize,
    },

    /// An instrument failed validation or valuation.
    #[error(transparent)]
    Instrument(#[from] InstrumentError),

    /// The numerical layer rejected the problem as structurally malformed.
    #[error(transparent)]
    Math(#[from] MathError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PortfolioError::QuantityMismatch {
            quantities: 2,
            bonds: 3,
        };
        assert!(err.to_string().contains("2"));
        assert!(err.to_string().contains("3"));
    }

    #[test]
    fn test_instrument_error_wraps_transparently() {
        let inner = InstrumentError::degenerate("present value is zero");
        let err = PortfolioError::from(inner.clone());
        assert_eq!(err.to_string(), inner.to_string());
    }
}
