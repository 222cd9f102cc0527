//! Constrained minimization.
//!
//! This module provides the numerical core behind portfolio construction: a
//! minimizer for smooth objectives under a tagged list of equality and
//! inequality constraints plus lower bounds on the variables.
//!
//! The solver is deliberately a narrow, pluggable capability: callers hand in
//! an objective closure, [`Constraint`] values, bounds, an initial guess and
//! an explicit [`OptimizationConfig`], and get back an
//! [`OptimizationResult`] with a convergence flag. Swapping the underlying
//! method never touches call sites, and new constraint kinds slot into the
//! tagged list without solver-side special cases.
//!
//! Non-convergence is reported as data (`converged: false` with a diagnostic
//! message), never as an error: iterative failure is an expected, recoverable
//! outcome for the callers of this module.

mod solver;

pub use solver::minimize;

use std::fmt;

/// The kind of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// `c(x) = 0` at the solution.
    Equality,
    /// `c(x) >= 0` at the solution.
    Inequality,
}

/// A single constraint: a kind tag plus an evaluator.
///
/// Inequality constraints follow the `c(x) >= 0` convention.
pub struct Constraint<'a> {
    kind: ConstraintKind,
    evaluator: Box<dyn Fn(&[f64]) -> f64 + 'a>,
}

impl<'a> Constraint<'a> {
    /// Creates an equality constraint `c(x) = 0`.
    pub fn equality(evaluator: impl Fn(&[f64]) -> f64 + 'a) -> Self {
        Self {
            kind: ConstraintKind::Equality,
            evaluator: Box::new(evaluator),
        }
    }

    /// Creates an inequality constraint `c(x) >= 0`.
    pub fn inequality(evaluator: impl Fn(&[f64]) -> f64 + 'a) -> Self {
        Self {
            kind: ConstraintKind::Inequality,
            evaluator: Box::new(evaluator),
        }
    }

    /// Returns the constraint kind.
    #[must_use]
    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    /// Evaluates the constraint at `x`.
    #[must_use]
    pub fn value(&self, x: &[f64]) -> f64 {
        (self.evaluator)(x)
    }

    /// Returns the feasibility violation at `x` (zero when satisfied).
    #[must_use]
    pub fn violation(&self, x: &[f64]) -> f64 {
        let value = self.value(x);
        match self.kind {
            ConstraintKind::Equality => value.abs(),
            ConstraintKind::Inequality => (-value).max(0.0),
        }
    }
}

impl fmt::Debug for Constraint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint").field("kind", &self.kind).finish()
    }
}

/// Configuration for the constrained minimizer.
///
/// Tolerances and iteration caps are explicit per-call inputs rather than
/// module-level state, so concurrent solves with different settings cannot
/// interfere.
#[derive(Debug, Clone, Copy)]
pub struct OptimizationConfig {
    /// Stationarity tolerance for the inner (bound-constrained) solve,
    /// measured on the projected gradient.
    pub tolerance: f64,
    /// Maximum acceptable constraint violation at the solution.
    pub constraint_tolerance: f64,
    /// Maximum number of outer (multiplier-update) iterations.
    pub max_iterations: u32,
    /// Maximum number of iterations per inner solve.
    pub max_inner_iterations: u32,
    /// Relative step for finite-difference gradients.
    pub gradient_step: f64,
    /// Relative step for finite-difference Hessians.
    pub hessian_step: f64,
    /// Starting penalty weight.
    pub initial_penalty: f64,
    /// Multiplicative penalty growth applied when feasibility stalls.
    pub penalty_growth: f64,
    /// Penalty weight ceiling.
    pub max_penalty: f64,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            constraint_tolerance: 1e-6,
            max_iterations: 40,
            max_inner_iterations: 100,
            gradient_step: 1e-7,
            hessian_step: 1e-4,
            initial_penalty: 10.0,
            penalty_growth: 10.0,
            max_penalty: 1e7,
        }
    }
}

impl OptimizationConfig {
    /// Creates a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stationarity tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the constraint violation tolerance.
    #[must_use]
    pub fn with_constraint_tolerance(mut self, tolerance: f64) -> Self {
        self.constraint_tolerance = tolerance;
        self
    }

    /// Sets the outer iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Result of a constrained minimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Final point (best found, whether or not converged).
    pub parameters: Vec<f64>,
    /// Objective value at the final point.
    pub objective_value: f64,
    /// Outer iterations used.
    pub iterations: u32,
    /// Whether the run satisfied both feasibility and stationarity.
    pub converged: bool,
    /// Maximum constraint violation at the final point.
    pub constraint_violation: f64,
    /// Diagnostic message when `converged` is false.
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_violation() {
        let eq = Constraint::equality(|x: &[f64]| x[0] - 1.0);
        assert_eq!(eq.violation(&[3.0]), 2.0);
        assert_eq!(eq.violation(&[1.0]), 0.0);

        let ineq = Constraint::inequality(|x: &[f64]| x[0] - 1.0);
        assert_eq!(ineq.violation(&[3.0]), 0.0);
        assert_eq!(ineq.violation(&[0.0]), 1.0);
    }

    #[test]
    fn test_config_builders() {
        let config = OptimizationConfig::new()
            .with_tolerance(1e-9)
            .with_max_iterations(5);
        assert_eq!(config.tolerance, 1e-9);
        assert_eq!(config.max_iterations, 5);
    }
}
