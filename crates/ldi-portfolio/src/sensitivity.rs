//! Sensitivity analysis under parallel yield shifts.
//!
//! Re-values the liability set and the hedging portfolio from their cash-flow
//! schedules under a family of shifted curves, producing one record per shift
//! (ordered by shift ascending) plus summary statistics. Identical inputs
//! always yield identical output; no state carries across calls.
//!
//! A shift whose revaluation degenerates (for example a downward shock that
//! pushes rates through -100%) produces a record carrying a message instead
//! of metrics; it never aborts the rest of the sweep.

use ldi_curves::YieldCurve;
use ldi_instruments::valuation::{present_value, valuation};
use ldi_instruments::{Bond, InstrumentError, InstrumentResult, Liability, Valuation};
use serde::{Deserialize, Serialize};

use crate::error::{PortfolioError, PortfolioResult};
use crate::parallel::maybe_parallel_map;
use crate::types::SensitivityConfig;

/// Builds a symmetric, evenly spaced shift grid over `[-span, span]`.
///
/// The conventional sweep is `shift_grid(0.02, 9)`: nine points across ±200
/// basis points.
#[must_use]
pub fn shift_grid(span: f64, count: usize) -> Vec<f64> {
    if count < 2 {
        return vec![0.0];
    }
    let steps = (count - 1) as f64;
    (0..count)
        .map(|i| -span + 2.0 * span * (i as f64) / steps)
        .collect()
}

/// Valuations of both sides under the unshifted curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BaseMetrics {
    /// Aggregate liability valuation.
    pub liability: Valuation,
    /// Aggregate portfolio valuation.
    pub portfolio: Valuation,
    /// Portfolio PV over liability PV before any shock.
    pub hedge_ratio: f64,
}

/// Metrics for one successfully evaluated shift.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShiftMetrics {
    /// Liability PV under the shifted curve.
    pub liability_pv: f64,
    /// Portfolio PV under the shifted curve.
    pub portfolio_pv: f64,
    /// Portfolio PV over liability PV under the shifted curve.
    pub hedge_ratio: f64,
    /// Difference in percentage PV change between portfolio and liabilities.
    pub tracking_error: f64,
    /// Exact percentage PV change of the liabilities.
    pub liability_change: f64,
    /// Exact percentage PV change of the portfolio.
    pub portfolio_change: f64,
    /// Duration/convexity estimate of the liability change:
    /// `-D·δ + 0.5·C·δ²`.
    pub liability_change_estimate: f64,
    /// Duration/convexity estimate of the portfolio change.
    pub portfolio_change_estimate: f64,
}

/// One entry of the sweep: either metrics or a message saying why the shift
/// could not be evaluated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftRecord {
    /// The parallel shift applied, in rate units (0.01 = 100bp).
    pub shift: f64,
    /// Metrics, present when the revaluation succeeded.
    pub metrics: Option<ShiftMetrics>,
    /// Failure description when the revaluation degenerated.
    pub message: Option<String>,
}

impl ShiftRecord {
    /// Returns true when the shift was evaluated successfully.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.metrics.is_some()
    }
}

/// Summary statistics over the valid records of a sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SensitivitySummary {
    /// Largest absolute tracking error across valid shifts.
    pub max_abs_tracking_error: f64,
    /// Mean absolute tracking error across valid shifts.
    pub mean_abs_tracking_error: f64,
    /// Hedge ratio furthest from 1.0 across valid shifts.
    pub worst_hedge_ratio: f64,
    /// Number of shifts that evaluated successfully.
    pub valid_records: usize,
}

/// Full output of a sensitivity sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityReport {
    /// Valuations under the unshifted curve.
    pub base: BaseMetrics,
    /// Per-shift records, ordered by shift ascending.
    pub records: Vec<ShiftRecord>,
    /// Summary statistics over the valid records.
    pub summary: SensitivitySummary,
}

/// Evaluates the hedge under a family of parallel yield shifts.
///
/// Shifts are evaluated independently (optionally in parallel) against
/// curves built with [`YieldCurve::shifted`]; records come back ordered by
/// shift ascending regardless of input order.
///
/// # Errors
///
/// Fails fast on empty inputs, a quantity/bond length mismatch, or a
/// degenerate valuation under the *unshifted* curve (a precondition
/// failure). Degeneracy under a shifted curve is reported per record.
pub fn sensitivity_analysis(
    liabilities: &[Liability],
    bonds: &[Bond],
    quantities: &[f64],
    curve: &YieldCurve,
    shifts: &[f64],
    config: &SensitivityConfig,
) -> PortfolioResult<SensitivityReport> {
    if liabilities.is_empty() {
        return Err(PortfolioError::NoLiabilities);
    }
    if bonds.is_empty() {
        return Err(PortfolioError::NoBonds);
    }
    if quantities.len() != bonds.len() {
        return Err(PortfolioError::QuantityMismatch {
            quantities: quantities.len(),
            bonds: bonds.len(),
        });
    }

    let liability_base = aggregate_liabilities(liabilities, curve)?;
    let portfolio_base = aggregate_portfolio(bonds, quantities, curve)?;
    let base = BaseMetrics {
        liability: liability_base,
        portfolio: portfolio_base,
        hedge_ratio: portfolio_base.present_value / liability_base.present_value,
    };

    let mut ordered = shifts.to_vec();
    ordered.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let records = maybe_parallel_map(&ordered, config, |&shift| {
        evaluate_shift(liabilities, bonds, quantities, curve, &base, shift)
    });

    let summary = summarize(&records);
    Ok(SensitivityReport {
        base,
        records,
        summary,
    })
}

/// PV-weighted aggregate valuation of the liability set.
fn aggregate_liabilities(
    liabilities: &[Liability],
    curve: &YieldCurve,
) -> InstrumentResult<Valuation> {
    let mut pv = 0.0;
    let mut weighted_duration = 0.0;
    let mut weighted_convexity = 0.0;
    for liability in liabilities {
        let metrics = valuation(liability, curve)?;
        pv += metrics.present_value;
        weighted_duration += metrics.duration * metrics.present_value;
        weighted_convexity += metrics.convexity * metrics.present_value;
    }
    Ok(Valuation {
        present_value: pv,
        duration: weighted_duration / pv,
        convexity: weighted_convexity / pv,
    })
}

/// PV-weighted aggregate valuation of the held portfolio.
///
/// Zero-quantity bonds are skipped, so a bond that would degenerate under
/// the curve cannot poison a portfolio that does not hold it.
fn aggregate_portfolio(
    bonds: &[Bond],
    quantities: &[f64],
    curve: &YieldCurve,
) -> InstrumentResult<Valuation> {
    let mut pv = 0.0;
    let mut weighted_duration = 0.0;
    let mut weighted_convexity = 0.0;
    for (bond, &quantity) in bonds.iter().zip(quantities) {
        if quantity == 0.0 {
            continue;
        }
        let metrics = valuation(bond, curve)?;
        let held = quantity * metrics.present_value;
        pv += held;
        weighted_duration += metrics.duration * held;
        weighted_convexity += metrics.convexity * held;
    }
    if !pv.is_finite() || pv <= 0.0 {
        return Err(InstrumentError::degenerate(format!(
            "portfolio present value {pv} is not strictly positive"
        )));
    }
    Ok(Valuation {
        present_value: pv,
        duration: weighted_duration / pv,
        convexity: weighted_convexity / pv,
    })
}

fn evaluate_shift(
    liabilities: &[Liability],
    bonds: &[Bond],
    quantities: &[f64],
    curve: &YieldCurve,
    base: &BaseMetrics,
    shift: f64,
) -> ShiftRecord {
    if !shift.is_finite() {
        return ShiftRecord {
            shift,
            metrics: None,
            message: Some("shift is not finite".to_string()),
        };
    }

    let shifted = curve.shifted(shift);
    let liability_pv = match liabilities
        .iter()
        .try_fold(0.0, |acc, liability| -> InstrumentResult<f64> {
            Ok(acc + present_value(liability, &shifted)?)
        }) {
        Ok(pv) => pv,
        Err(err) => return invalid_record(shift, &err),
    };
    let portfolio_pv = match portfolio_present_value(bonds, quantities, &shifted) {
        Ok(pv) => pv,
        Err(err) => return invalid_record(shift, &err),
    };

    let liability_change = liability_pv / base.liability.present_value - 1.0;
    let portfolio_change = portfolio_pv / base.portfolio.present_value - 1.0;

    ShiftRecord {
        shift,
        metrics: Some(ShiftMetrics {
            liability_pv,
            portfolio_pv,
            hedge_ratio: portfolio_pv / liability_pv,
            tracking_error: portfolio_change - liability_change,
            liability_change,
            portfolio_change,
            liability_change_estimate: change_estimate(&base.liability, shift),
            portfolio_change_estimate: change_estimate(&base.portfolio, shift),
        }),
        message: None,
    }
}

fn portfolio_present_value(
    bonds: &[Bond],
    quantities: &[f64],
    curve: &YieldCurve,
) -> InstrumentResult<f64> {
    let mut pv = 0.0;
    for (bond, &quantity) in bonds.iter().zip(quantities) {
        if quantity == 0.0 {
            continue;
        }
        pv += quantity * present_value(bond, curve)?;
    }
    if !pv.is_finite() || pv <= 0.0 {
        return Err(InstrumentError::degenerate(format!(
            "portfolio present value {pv} is not strictly positive"
        )));
    }
    Ok(pv)
}

/// Second-order percentage change estimate: `-D·δ + 0.5·C·δ²`.
fn change_estimate(base: &Valuation, shift: f64) -> f64 {
    -base.duration * shift + 0.5 * base.convexity * shift * shift
}

fn invalid_record(shift: f64, err: &InstrumentError) -> ShiftRecord {
    ShiftRecord {
        shift,
        metrics: None,
        message: Some(err.to_string()),
    }
}

fn summarize(records: &[ShiftRecord]) -> SensitivitySummary {
    let mut max_abs = 0.0_f64;
    let mut sum_abs = 0.0_f64;
    let mut worst_ratio = f64::NAN;
    let mut worst_deviation = -1.0_f64;
    let mut valid = 0_usize;

    for record in records {
        if let Some(metrics) = &record.metrics {
            valid += 1;
            let abs_te = metrics.tracking_error.abs();
            max_abs = max_abs.max(abs_te);
            sum_abs += abs_te;
            let deviation = (metrics.hedge_ratio - 1.0).abs();
            if deviation > worst_deviation {
                worst_deviation = deviation;
                worst_ratio = metrics.hedge_ratio;
            }
        }
    }

    if valid == 0 {
        return SensitivitySummary {
            max_abs_tracking_error: f64::NAN,
            mean_abs_tracking_error: f64::NAN,
            worst_hedge_ratio: f64::NAN,
            valid_records: 0,
        };
    }

    SensitivitySummary {
        max_abs_tracking_error: max_abs,
        mean_abs_tracking_error: sum_abs / valid as f64,
        worst_hedge_ratio: worst_ratio,
        valid_records: valid,
    }
}
