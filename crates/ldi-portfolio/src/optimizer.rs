//! Hedging portfolio construction.
//!
//! Two strategies over the same inputs (liability set, bond universe, yield
//! curve):
//!
//! - [`HedgingOptimizer::duration_matching`]: constrained optimization.
//!   Quantities minimize a concentration penalty subject to funding and
//!   duration-matching constraints.
//! - [`HedgingOptimizer::create_initial_portfolio`]: a deterministic,
//!   optimization-free maturity-bucketing baseline, used for comparison and
//!   as the fallback when the solve does not converge.

use ldi_curves::YieldCurve;
use ldi_instruments::valuation::valuation;
use ldi_instruments::{Bond, Liability};
use ldi_math::optimization::{minimize, Constraint, OptimizationResult};
use log::debug;
use std::collections::BTreeMap;

use crate::error::{PortfolioError, PortfolioResult};
use crate::types::{Allocation, HedgeResult, OptimizerConfig, Strategy};

/// Width of the maturity buckets used by the baseline portfolio.
const BUCKET_YEARS: f64 = 2.0;

/// Constructs hedging portfolios for a liability set from a bond universe.
///
/// Operates on read-only references and never mutates its inputs; every
/// result is a fresh value.
///
/// # Example
///
/// ```rust
/// use ldi_curves::YieldCurve;
/// use ldi_instruments::{Bond, Liability};
/// use ldi_portfolio::optimizer::HedgingOptimizer;
///
/// let liabilities = vec![
///     Liability::new(1.0, 1_000.0)?,
///     Liability::new(5.0, 2_000.0)?,
/// ];
/// let bonds = vec![
///     Bond::new(2.0, 0.03, 1_000.0)?,
///     Bond::new(5.0, 0.035, 1_000.0)?,
/// ];
/// let curve = YieldCurve::new(
///     vec![1.0, 2.0, 5.0, 10.0],
///     vec![0.02, 0.025, 0.03, 0.035],
/// )?;
///
/// let result = HedgingOptimizer::new(&liabilities, &bonds, &curve)?
///     .duration_matching()?;
/// assert!(result.success);
/// assert!(result.duration_gap().abs() < 1e-4);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct HedgingOptimizer<'a> {
    liabilities: &'a [Liability],
    bonds: &'a [Bond],
    curve: &'a YieldCurve,
    config: OptimizerConfig,
}

impl<'a> HedgingOptimizer<'a> {
    /// Creates an optimizer over the given market data.
    ///
    /// # Errors
    ///
    /// Fails fast when the liability set or the bond universe is empty.
    pub fn new(
        liabilities: &'a [Liability],
        bonds: &'a [Bond],
        curve: &'a YieldCurve,
    ) -> PortfolioResult<Self> {
        if liabilities.is_empty() {
            return Err(PortfolioError::NoLiabilities);
        }
        if bonds.is_empty() {
            return Err(PortfolioError::NoBonds);
        }
        Ok(Self {
            liabilities,
            bonds,
            curve,
            config: OptimizerConfig::default(),
        })
    }

    /// Replaces the optimizer configuration.
    #[must_use]
    pub fn with_config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Solves for nonnegative bond quantities that fund the liabilities and
    /// match their duration, spreading the allocation by minimizing the sum
    /// of squared quantities.
    ///
    /// Solver non-convergence is reported as `success: false` with a
    /// diagnostic message on the result, never as an error; callers decide
    /// whether to fall back to [`create_initial_portfolio`].
    ///
    /// # Errors
    ///
    /// Propagates degenerate valuations of the inputs (precondition
    /// failures), not solver outcomes.
    ///
    /// [`create_initial_portfolio`]: HedgingOptimizer::create_initial_portfolio
    pub fn duration_matching(&self) -> PortfolioResult<HedgeResult> {
        let (liability_pv, liability_duration) = self.liability_metrics()?;
        let (bond_pvs, bond_durations) = self.bond_metrics()?;
        debug!(
            "duration matching: liability pv {liability_pv:.4}, duration {liability_duration:.4}, \
             {} bonds",
            self.bonds.len()
        );

        // Both constraints are scaled by the liability PV so their residuals
        // are relative magnitudes regardless of portfolio size.
        let funding =
            Constraint::inequality(|x: &[f64]| dot(x, &bond_pvs) / liability_pv - 1.0);
        // Duration equality multiplied through by portfolio PV, which turns
        // the ratio constraint into a linear one. Exact only when the
        // portfolio PV is nonzero; that is guarded after the solve.
        let duration_gaps: Vec<f64> = bond_durations
            .iter()
            .map(|d| d - liability_duration)
            .collect();
        let duration = Constraint::equality(|x: &[f64]| {
            x.iter()
                .zip(bond_pvs.iter().zip(&duration_gaps))
                .map(|(q, (pv, gap))| q * pv * gap)
                .sum::<f64>()
                / liability_pv
        });
        let constraints = [funding, duration];

        let lower = vec![0.0; self.bonds.len()];
        let x0 = self.initial_guess(liability_pv, liability_duration, &bond_pvs, &bond_durations);

        let outcome = minimize(
            |x: &[f64]| x.iter().map(|q| q * q).sum(),
            &constraints,
            &lower,
            &x0,
            &self.config.solver,
        )?;

        Ok(self.assemble(
            outcome,
            liability_pv,
            liability_duration,
            &bond_pvs,
            &bond_durations,
        ))
    }

    /// Builds a deterministic baseline portfolio by maturity bucketing.
    ///
    /// Liabilities are grouped into 2-year maturity buckets; each bucket is
    /// funded by the bond(s) nearest its PV-weighted mean time (ties share
    /// evenly), and the whole portfolio is rescaled so its PV funds the
    /// liability PV exactly. Deterministic, optimization-free, always
    /// `success: true`.
    ///
    /// # Errors
    ///
    /// Propagates degenerate valuations of the inputs.
    pub fn create_initial_portfolio(&self) -> PortfolioResult<HedgeResult> {
        let (liability_pv, liability_duration) = self.liability_metrics()?;
        let (bond_pvs, bond_durations) = self.bond_metrics()?;

        // Per-bucket PV and PV-weighted time.
        let mut buckets: BTreeMap<i64, (f64, f64)> = BTreeMap::new();
        for liability in self.liabilities {
            let metrics = valuation(liability, self.curve)?;
            let key = (liability.time() / BUCKET_YEARS).floor() as i64;
            let entry = buckets.entry(key).or_insert((0.0, 0.0));
            entry.0 += metrics.present_value;
            entry.1 += metrics.present_value * liability.time();
        }

        let mut quantities = vec![0.0; self.bonds.len()];
        for (bucket_pv, weighted_time) in buckets.values() {
            let target_maturity = weighted_time / bucket_pv;
            let nearest = self
                .bonds
                .iter()
                .map(|b| (b.maturity() - target_maturity).abs())
                .fold(f64::INFINITY, f64::min);
            let selected: Vec<usize> = self
                .bonds
                .iter()
                .enumerate()
                .filter(|(_, b)| (b.maturity() - target_maturity).abs() - nearest <= 1e-9)
                .map(|(j, _)| j)
                .collect();

            let share = bucket_pv / selected.len() as f64;
            for &j in &selected {
                quantities[j] += share / bond_pvs[j];
            }
        }

        // Rescale so the total funds the liabilities exactly.
        let current_pv = dot(&quantities, &bond_pvs);
        if current_pv > 0.0 {
            let factor = liability_pv / current_pv;
            for q in &mut quantities {
                *q *= factor;
            }
        }

        let portfolio_pv = dot(&quantities, &bond_pvs);
        let portfolio_duration =
            weighted_duration(&quantities, &bond_pvs, &bond_durations, portfolio_pv);

        Ok(HedgeResult {
            allocations: self.allocations(&quantities),
            quantities,
            success: true,
            message: None,
            liability_pv,
            liability_duration,
            portfolio_pv,
            portfolio_duration,
            strategy: Strategy::MaturityBucketing,
        })
    }

    /// Total liability PV and PV-weighted liability duration.
    fn liability_metrics(&self) -> PortfolioResult<(f64, f64)> {
        let mut pv = 0.0;
        let mut weighted_time = 0.0;
        for liability in self.liabilities {
            let metrics = valuation(liability, self.curve)?;
            pv += metrics.present_value;
            weighted_time += metrics.duration * metrics.present_value;
        }
        // Every term is strictly positive, so pv is too.
        Ok((pv, weighted_time / pv))
    }

    /// Per-bond unit value (market price override honored) and Macaulay
    /// duration.
    fn bond_metrics(&self) -> PortfolioResult<(Vec<f64>, Vec<f64>)> {
        let mut pvs = Vec::with_capacity(self.bonds.len());
        let mut durations = Vec::with_capacity(self.bonds.len());
        for bond in self.bonds {
            let metrics = valuation(bond, self.curve)?;
            pvs.push(bond.price().unwrap_or(metrics.present_value));
            durations.push(metrics.duration);
        }
        Ok((pvs, durations))
    }

    /// Starting point for the solve: split the liability PV across the pair
    /// of bonds whose durations bracket the liability duration, or across
    /// the whole universe when no bracket exists.
    fn initial_guess(
        &self,
        liability_pv: f64,
        liability_duration: f64,
        bond_pvs: &[f64],
        bond_durations: &[f64],
    ) -> Vec<f64> {
        let mut below: Option<usize> = None;
        let mut above: Option<usize> = None;
        for (j, &d) in bond_durations.iter().enumerate() {
            if d <= liability_duration {
                if below.map_or(true, |b| d > bond_durations[b]) {
                    below = Some(j);
                }
            } else if above.map_or(true, |a| d < bond_durations[a]) {
                above = Some(j);
            }
        }

        let n = self.bonds.len();
        let mut x0 = vec![0.0; n];
        match (below, above) {
            (Some(b), Some(a)) => {
                x0[b] = 0.5 * liability_pv / bond_pvs[b];
                x0[a] = 0.5 * liability_pv / bond_pvs[a];
            }
            _ => {
                for (q, &pv) in x0.iter_mut().zip(bond_pvs) {
                    *q = liability_pv / (n as f64 * pv);
                }
            }
        }
        x0
    }

    /// Turns a solver outcome into a `HedgeResult`.
    fn assemble(
        &self,
        outcome: OptimizationResult,
        liability_pv: f64,
        liability_duration: f64,
        bond_pvs: &[f64],
        bond_durations: &[f64],
    ) -> HedgeResult {
        let mut quantities = outcome.parameters;
        let mut success = outcome.converged;
        let mut message = outcome.message;

        let mut portfolio_pv = dot(&quantities, bond_pvs);
        if success {
            if portfolio_pv > 0.0 {
                // Scaling the whole vector leaves the PV-weighted duration
                // unchanged, so marginal funding shortfalls from the solve
                // can be closed exactly.
                if portfolio_pv < liability_pv {
                    let factor = liability_pv / portfolio_pv;
                    for q in &mut quantities {
                        *q *= factor;
                    }
                    portfolio_pv = dot(&quantities, bond_pvs);
                }
            } else {
                success = false;
                message = Some("optimized portfolio has non-positive present value".to_string());
            }
        }

        let portfolio_duration =
            weighted_duration(&quantities, bond_pvs, bond_durations, portfolio_pv);

        HedgeResult {
            allocations: self.allocations(&quantities),
            quantities,
            success,
            message,
            liability_pv,
            liability_duration,
            portfolio_pv,
            portfolio_duration,
            strategy: Strategy::DurationMatching,
        }
    }

    /// Positions above the materiality threshold.
    fn allocations(&self, quantities: &[f64]) -> Vec<Allocation> {
        self.bonds
            .iter()
            .zip(quantities)
            .filter(|(_, &q)| q >= self.config.materiality)
            .map(|(bond, &q)| Allocation {
                bond: *bond,
                quantity: q,
            })
            .collect()
    }
}

/// Solves a duration-matched portfolio for the given market data.
///
/// Convenience wrapper over [`HedgingOptimizer`] with default configuration.
pub fn duration_matching(
    liabilities: &[Liability],
    bonds: &[Bond],
    curve: &YieldCurve,
) -> PortfolioResult<HedgeResult> {
    HedgingOptimizer::new(liabilities, bonds, curve)?.duration_matching()
}

/// Builds the maturity-bucketing baseline portfolio for the given market data.
///
/// Convenience wrapper over [`HedgingOptimizer`] with default configuration.
pub fn create_initial_portfolio(
    liabilities: &[Liability],
    bonds: &[Bond],
    curve: &YieldCurve,
) -> PortfolioResult<HedgeResult> {
    HedgingOptimizer::new(liabilities, bonds, curve)?.create_initial_portfolio()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn weighted_duration(
    quantities: &[f64],
    bond_pvs: &[f64],
    bond_durations: &[f64],
    portfolio_pv: f64,
) -> f64 {
    if portfolio_pv <= 0.0 {
        return 0.0;
    }
    quantities
        .iter()
        .zip(bond_pvs.iter().zip(bond_durations))
        .map(|(q, (pv, d))| q * pv * d)
        .sum::<f64>()
        / portfolio_pv
}
