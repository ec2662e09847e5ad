//! Cost-bounded rebalancing solver.
//!
//! Solves
//!
//! ```text
//! minimize    sum((w[i] - target[i])^2)
//! subject to  sum(w) = 1
//!             w[i] >= 0
//!             rate * sum(|w[i] - current[i]|) * total_value <= limit
//! ```
//!
//! If the target weights already fit the budget they are returned as-is: the
//! objective is strictly convex with its minimum at the targets, so no search
//! can do better.
//!
//! Otherwise the cost constraint is priced with a multiplier `lambda`. For a
//! fixed `lambda` every holding's subproblem has a closed form (a soft
//! threshold of the target around the current weight, clipped at zero), and
//! the budget equality is met by bisecting its own multiplier. Movement away
//! from the current weights never grows as `lambda` grows, and at
//! `lambda = 2 * max|target - current|` the allocation is exactly the current
//! one, so the search bisects `lambda` from that seed toward the smallest
//! value whose allocation fits the budget.
//!
//! The objective of the infeasible side of the bracket is a lower bound on
//! the optimum and the feasible side an upper bound; the search stops when
//! the two differ by at most `tolerance`.

use log::{debug, info, trace};
use serde::Serialize;

use crate::error::{Constraint, Error, Result, ValidationError};
use crate::portfolio::{CostModel, Portfolio};

/// Default cap on outer search iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 500;

/// Iterations of the inner bisection on the budget multiplier.
const INNER_ITERATIONS: usize = 200;

/// Parameters for one rebalancing run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolverParams {
    /// Maximum total trading cost in dollars.
    pub trading_cost_limit: f64,
    /// Fraction of notional charged per trade, in (0, 1).
    pub trading_rate: f64,
    /// Convergence and feasibility slack. `0.0` searches to machine precision.
    pub tolerance: f64,
    /// Cap on search iterations before giving up.
    pub max_iterations: usize,
}

impl SolverParams {
    pub fn new(trading_cost_limit: f64, trading_rate: f64, tolerance: f64) -> Self {
        Self {
            trading_cost_limit,
            trading_rate,
            tolerance,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Check parameter ranges. A negative limit is not rejected here; it is
    /// reported as infeasible by [`solve`].
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        CostModel::new(self.trading_rate)?;
        if !self.trading_cost_limit.is_finite() {
            return Err(ValidationError::Parameter(format!(
                "trading_cost_limit must be finite, got {}",
                self.trading_cost_limit
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ValidationError::Parameter(format!(
                "tolerance must be >= 0 and finite, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(ValidationError::Parameter(
                "max_iterations must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// The cost model implied by `trading_rate`.
    pub fn cost_model(&self) -> CostModel {
        CostModel {
            rate: self.trading_rate,
        }
    }
}

/// Result of a rebalancing run.
#[derive(Debug, Clone, Serialize)]
pub struct RebalanceOutcome {
    /// New weight per holding, aligned with the portfolio's holdings.
    pub weights: Vec<f64>,
    /// Squared deviation of `weights` from the targets.
    pub objective: f64,
    /// Trading cost of moving from current weights to `weights`.
    pub trading_cost: f64,
    /// Trading cost of moving straight to the targets.
    pub naive_cost: f64,
    /// Whether `naive_cost` exceeded the limit (and a search ran).
    pub exceeds_limit: bool,
    /// Outer search iterations performed; 0 when the targets were returned.
    pub iterations: usize,
}

impl RebalanceOutcome {
    /// True when the target weights were returned without searching.
    pub fn used_targets(&self) -> bool {
        !self.exceeds_limit
    }
}

/// Sum of squared deviations from the targets.
pub fn objective(weights: &[f64], targets: &[f64]) -> f64 {
    weights
        .iter()
        .zip(targets)
        .map(|(w, t)| {
            let d = w - t;
            d * d
        })
        .sum()
}

/// Find the allocation closest to the targets whose trading cost fits the limit.
///
/// # Errors
///
/// - [`Error::Validation`] for out-of-range parameters.
/// - [`Error::Infeasible`] when the limit is negative, since even holding the
///   current weights costs zero.
/// - [`Error::Convergence`] when `max_iterations` runs out first. The best
///   budget-feasible allocation found so far is attached.
pub fn solve(portfolio: &Portfolio, params: &SolverParams) -> Result<RebalanceOutcome> {
    params.validate()?;

    let rate = params.trading_rate;
    let limit = params.trading_cost_limit;
    let targets = portfolio.target_weights();
    let naive_cost = portfolio.naive_rebalance_cost(rate);

    if naive_cost <= limit {
        info!("target weights fit the budget: cost {naive_cost:.4} <= limit {limit:.4}");
        return Ok(RebalanceOutcome {
            weights: targets.to_vec(),
            objective: 0.0,
            trading_cost: naive_cost,
            naive_cost,
            exceeds_limit: false,
            iterations: 0,
        });
    }

    if limit < 0.0 {
        return Err(Error::Infeasible {
            constraint: Constraint::TradingCost,
            detail: format!("limit {limit} is negative; holding current weights costs 0"),
        });
    }

    info!("target weights exceed the budget: cost {naive_cost:.4} > limit {limit:.4}");

    let budget = limit / (rate * portfolio.total_value());
    let found = search(portfolio.current_weights(), targets, budget, params)?;

    let weights = finalize(found.weights, params.tolerance);
    let trading_cost = portfolio.implied_trade_cost(&weights, rate)?;
    let objective = objective(&weights, targets);
    info!(
        "optimized after {} iterations: objective {objective:.6e}, cost {trading_cost:.4}",
        found.iterations
    );

    Ok(RebalanceOutcome {
        weights,
        objective,
        trading_cost,
        naive_cost,
        exceeds_limit: true,
        iterations: found.iterations,
    })
}

struct Search {
    weights: Vec<f64>,
    iterations: usize,
}

/// Bisect the cost multiplier until the objective bracket closes to `tolerance`.
///
/// `budget` is the allowed `sum(|w - current|)`.
fn search(current: &[f64], targets: &[f64], budget: f64, params: &SolverParams) -> Result<Search> {
    let max_gap = current
        .iter()
        .zip(targets)
        .map(|(c, t)| (t - c).abs())
        .fold(0.0_f64, f64::max);

    // lambda = 0 reproduces the targets (infeasible); lambda = hi the current weights.
    let mut lo = 0.0_f64;
    let mut hi = 2.0 * max_gap;
    let mut f_lo = 0.0_f64;
    let mut best = current.to_vec();
    let mut f_best = objective(&best, targets);

    for iteration in 1..=params.max_iterations {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            debug!("multiplier bracket collapsed at {hi:e} after {iteration} iterations");
            return Ok(Search {
                weights: best,
                iterations: iteration,
            });
        }

        let w = allocation(current, targets, mid);
        let moved = l1_distance(&w, current);
        let f = objective(&w, targets);

        if moved <= budget {
            hi = mid;
            best = w;
            f_best = f;
        } else {
            lo = mid;
            f_lo = f;
        }

        let gap = f_best - f_lo;
        trace!(
            "iteration {iteration}: lambda in [{lo:e}, {hi:e}], moved {moved:.6e}, gap {gap:.3e}"
        );
        if gap <= params.tolerance {
            debug!("objective bracket {gap:e} within tolerance after {iteration} iterations");
            return Ok(Search {
                weights: best,
                iterations: iteration,
            });
        }
    }

    Err(Error::Convergence {
        weights: best,
        objective: f_best,
        iterations: params.max_iterations,
    })
}

/// Minimizer of the cost-priced objective over the simplex for a fixed `lambda`.
fn allocation(current: &[f64], targets: &[f64], lambda: f64) -> Vec<f64> {
    let kappa = 0.5 * lambda;
    let t_max = targets.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let t_min = targets.iter().copied().fold(f64::INFINITY, f64::min);

    // Sum of weights is non-increasing in the shift; these bounds give 0 and >= n.
    let mut lo = t_min - kappa - 1.0;
    let mut hi = t_max + kappa;

    for _ in 0..INNER_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        let sum: f64 = current
            .iter()
            .zip(targets)
            .map(|(&c, &t)| shifted_weight(c, t, mid, kappa))
            .sum();
        if sum > 1.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let shift = 0.5 * (lo + hi);
    current
        .iter()
        .zip(targets)
        .map(|(&c, &t)| shifted_weight(c, t, shift, kappa))
        .collect()
}

/// `argmin_{w >= 0} (w - (t - shift))^2 + 2 * kappa * |w - c|`
#[inline]
fn shifted_weight(c: f64, t: f64, shift: f64, kappa: f64) -> f64 {
    (c + soft_threshold(t - shift - c, kappa)).max(0.0)
}

#[inline]
fn soft_threshold(x: f64, kappa: f64) -> f64 {
    if x > kappa {
        x - kappa
    } else if x < -kappa {
        x + kappa
    } else {
        0.0
    }
}

fn l1_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

/// Snap floating-point dust below zero to exactly zero.
fn finalize(mut weights: Vec<f64>, tolerance: f64) -> Vec<f64> {
    for w in &mut weights {
        if *w < 0.0 {
            debug_assert!(*w >= -tolerance.max(1e-12), "weight {w} below zero");
            *w = 0.0;
        }
    }
    weights
}
