//! Error types for curve construction.

use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Errors raised when a curve is constructed from malformed inputs.
///
/// Construction fails fast: nothing is silently corrected or reordered, and
/// every variant names the offending constraint.
#[derive(Error, Debug, Clone)]
pub enum CurveError {
    /// Times and rates differ in length.
    #[error("times ({times}) and rates ({rates}) must have the same length")]
    LengthMismatch {
        /// Number of time points.
        times: usize,
        /// Number of rates.
        rates: usize,
    },

    /// Too few points to define a curve.
    #[error("curve needs at least {required} points, got {actual}")]
    InsufficientPoints {
        /// Minimum required points.
        required: usize,
        /// Actual number of points.
        actual: usize,
    },

    /// Times are not strictly ascending.
    #[error("times must be strictly ascending: times[{index}] = {value} after {previous}")]
    NonAscendingTimes {
        /// Index of the offending time.
        index: usize,
        /// The preceding time value.
        previous: f64,
        /// The offending time value.
        value: f64,
    },

    /// A time point is zero or negative.
    #[error("times must be positive: times[{index}] = {value}")]
    NonPositiveTime {
        /// Index of the offending time.
        index: usize,
        /// The offending time value.
        value: f64,
    },

    /// A time or rate is NaN or infinite.
    #[error("{field}[{index}] is not finite: {value}")]
    NonFiniteValue {
        /// Which input array contains the value.
        field: &'static str,
        /// Index of the offending value.
        index: usize,
        /// The offending value.
        value: f64,
    },
}

impl CurveError {
    /// Creates an insufficient points error.
    #[must_use]
    pub fn insufficient_points(required: usize, actual: usize) -> Self {
        Self::InsufficientPoints { required, actual }
    }

    /// Creates a non-ascending times error.
    #[must_use]
    pub fn non_ascending_times(index: usize, previous: f64, value: f64) -> Self {
        Self::NonAscendingTimes {
            index,
            previous,
            value,
        }
    }
}
