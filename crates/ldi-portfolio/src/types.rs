//! Configuration and result types for portfolio construction.

use ldi_instruments::Bond;
use ldi_math::optimization::OptimizationConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for the hedging optimizer.
///
/// Solver tolerances and the materiality threshold are per-call inputs;
/// concurrent scenario runs with different settings cannot interfere.
#[derive(Debug, Clone, Copy)]
pub struct OptimizerConfig {
    /// Settings handed to the constrained minimizer.
    pub solver: OptimizationConfig,
    /// Quantities below this threshold are treated as zero noise and
    /// excluded from the allocation list (the raw vector keeps them).
    pub materiality: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            solver: OptimizationConfig::default(),
            materiality: 0.01,
        }
    }
}

impl OptimizerConfig {
    /// Creates a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the solver configuration.
    #[must_use]
    pub fn with_solver(mut self, solver: OptimizationConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Sets the materiality threshold for the allocation list.
    #[must_use]
    pub fn with_materiality(mut self, materiality: f64) -> Self {
        self.materiality = materiality;
        self
    }
}

/// How a portfolio was constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Constrained optimization matching duration under a funding constraint.
    DurationMatching,
    /// Naive maturity-bucketing baseline.
    MaturityBucketing,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::DurationMatching => "duration matching",
            Strategy::MaturityBucketing => "maturity bucketing",
        };
        write!(f, "{name}")
    }
}

/// A material position in the resulting portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// The bond held.
    pub bond: Bond,
    /// Units held.
    pub quantity: f64,
}

/// Outcome of a portfolio construction run.
///
/// A plain data record consumable by any reporting layer. `success: false`
/// means the solver did not converge; the raw quantities are still reported
/// for diagnostics, and callers typically fall back to the baseline
/// portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HedgeResult {
    /// Raw quantity vector, one entry per bond in the universe.
    pub quantities: Vec<f64>,
    /// Whether the construction satisfied its constraints.
    pub success: bool,
    /// Diagnostic message when `success` is false.
    pub message: Option<String>,
    /// Present value of the liability set.
    pub liability_pv: f64,
    /// PV-weighted duration of the liability set.
    pub liability_duration: f64,
    /// Present value of the constructed portfolio.
    pub portfolio_pv: f64,
    /// PV-weighted duration of the constructed portfolio.
    pub portfolio_duration: f64,
    /// Positions above the materiality threshold.
    pub allocations: Vec<Allocation>,
    /// How the portfolio was constructed.
    pub strategy: Strategy,
}

impl HedgeResult {
    /// Duration mismatch between portfolio and liabilities, in years.
    #[must_use]
    pub fn duration_gap(&self) -> f64 {
        self.portfolio_duration - self.liability_duration
    }

    /// Funding surplus of the portfolio over the liabilities.
    #[must_use]
    pub fn funding_surplus(&self) -> f64 {
        self.portfolio_pv - self.liability_pv
    }
}

/// Configuration for the sensitivity analyzer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensitivityConfig {
    /// Enable parallel processing (requires the 'parallel' feature).
    pub parallel: bool,
    /// Minimum shift count to trigger parallel processing.
    /// Below this threshold, sequential is faster due to thread overhead.
    pub parallel_threshold: usize,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 32,
        }
    }
}

impl SensitivityConfig {
    /// Creates a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config that always uses sequential processing.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Sets whether to use parallel processing.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Sets the threshold for parallel processing.
    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Returns true if parallel processing should be used for `count` items.
    #[must_use]
    pub fn should_parallelize(&self, count: usize) -> bool {
        cfg!(feature = "parallel") && self.parallel && count >= self.parallel_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimizer_config_default() {
        let config = OptimizerConfig::default();
        assert_eq!(config.materiality, 0.01);
    }

    #[test]
    fn test_sensitivity_config() {
        let config = SensitivityConfig::sequential();
        assert!(!config.parallel);
        assert!(!config.should_parallelize(1_000));

        let config = SensitivityConfig::default().with_threshold(4);
        assert_eq!(config.parallel_threshold, 4);
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::DurationMatching.to_string(), "duration matching");
        assert_eq!(Strategy::MaturityBucketing.to_string(), "maturity bucketing");
    }
}
