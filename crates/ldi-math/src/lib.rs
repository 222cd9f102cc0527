//! # LDI Math
//!
//! Numerical utilities for the LDI liability-hedging workspace.
//!
//! Two capabilities live here:
//!
//! - **Interpolation**: linear interpolation with optional flat (clamped)
//!   extrapolation, the building block for rate curves
//! - **Optimization**: a constrained minimizer behind a narrow interface
//!   (objective, tagged constraint list, bounds, initial guess, explicit
//!   config), used for duration-matched portfolio construction
//!
//! Everything is pure computation over caller-supplied data: no global
//! state, no I/O, and all tolerances are explicit per-call configuration.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

pub mod error;
pub mod interpolation;
pub mod optimization;

pub use error::{MathError, MathResult};
