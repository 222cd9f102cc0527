//! # LDI Curves
//!
//! Term structure of interest rates for the LDI liability-hedging workspace.
//!
//! A [`YieldCurve`] is an immutable grid of (time, rate) points with linear
//! interpolation inside the grid and flat extrapolation outside it. Discount
//! factors use annual compounding throughout the engine. Parallel shifts
//! produce new curves, which is what the sensitivity layer relies on to
//! revalue both sides of a hedge under rate shocks.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod curve;
pub mod error;

pub use curve::YieldCurve;
pub use error::{CurveError, CurveResult};
