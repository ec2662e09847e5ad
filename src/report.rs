//! Rebalancing report: what the portfolio looks like now, what jumping to the
//! targets would cost, and the allocation chosen.

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::portfolio::{Portfolio, Trade};
use crate::solver::{RebalanceOutcome, SolverParams};

/// A holding's inputs alongside its current weight.
#[derive(Debug, Clone, Serialize)]
pub struct HoldingRow {
    pub ticker: String,
    pub shares: f64,
    pub price: f64,
    pub value: f64,
    pub current_weight: f64,
    pub target_weight: f64,
}

/// Final weight for one holding.
#[derive(Debug, Clone, Serialize)]
pub struct Allocation {
    pub ticker: String,
    pub weight: f64,
}

/// The optimized allocation, present only when a search ran.
#[derive(Debug, Clone, Serialize)]
pub struct Optimized {
    pub weights: Vec<f64>,
    pub trades: Vec<Trade>,
    pub trading_cost: f64,
    pub objective: f64,
    pub iterations: usize,
    /// False when the iteration cap was hit; the weights are then the best
    /// budget-feasible allocation found, not the optimum.
    pub converged: bool,
}

/// Full report of one rebalancing run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub total_value: f64,
    pub holdings: Vec<HoldingRow>,
    pub trading_rate: f64,
    pub trading_cost_limit: f64,
    /// Trades for moving straight to the targets.
    pub target_trades: Vec<Trade>,
    pub naive_cost: f64,
    pub exceeds_limit: bool,
    pub optimized: Option<Optimized>,
    pub allocation: Vec<Allocation>,
}

impl Report {
    /// Build a report from a solver outcome.
    pub fn new(
        portfolio: &Portfolio,
        params: &SolverParams,
        outcome: &RebalanceOutcome,
    ) -> Result<Self> {
        let optimized = if outcome.exceeds_limit {
            Some(Optimized {
                weights: outcome.weights.clone(),
                trades: portfolio.trades(&outcome.weights, &params.cost_model())?,
                trading_cost: outcome.trading_cost,
                objective: outcome.objective,
                iterations: outcome.iterations,
                converged: true,
            })
        } else {
            None
        };
        Self::build(portfolio, params, outcome.naive_cost, optimized, &outcome.weights)
    }

    /// Build a report for a search that hit its iteration cap.
    pub fn non_converged(
        portfolio: &Portfolio,
        params: &SolverParams,
        weights: &[f64],
        objective: f64,
        iterations: usize,
    ) -> Result<Self> {
        let naive_cost = portfolio.naive_rebalance_cost(params.trading_rate);
        let optimized = Optimized {
            weights: weights.to_vec(),
            trades: portfolio.trades(weights, &params.cost_model())?,
            trading_cost: portfolio.implied_trade_cost(weights, params.trading_rate)?,
            objective,
            iterations,
            converged: false,
        };
        Self::build(portfolio, params, naive_cost, Some(optimized), weights)
    }

    fn build(
        portfolio: &Portfolio,
        params: &SolverParams,
        naive_cost: f64,
        optimized: Option<Optimized>,
        final_weights: &[f64],
    ) -> Result<Self> {
        let holdings = portfolio
            .holdings()
            .iter()
            .zip(portfolio.current_weights())
            .map(|(h, &current_weight)| HoldingRow {
                ticker: h.ticker.clone(),
                shares: h.shares,
                price: h.price,
                value: h.value(),
                current_weight,
                target_weight: h.target_weight,
            })
            .collect();

        let allocation = portfolio
            .holdings()
            .iter()
            .zip(final_weights)
            .map(|(h, &weight)| Allocation {
                ticker: h.ticker.clone(),
                weight,
            })
            .collect();

        Ok(Self {
            total_value: portfolio.total_value(),
            holdings,
            trading_rate: params.trading_rate,
            trading_cost_limit: params.trading_cost_limit,
            target_trades: portfolio.trades(portfolio.target_weights(), &params.cost_model())?,
            naive_cost,
            exceeds_limit: naive_cost > params.trading_cost_limit,
            optimized,
            allocation,
        })
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text rendering with `precision` decimal places for weights.
    pub fn text(&self, precision: usize) -> TextReport<'_> {
        TextReport {
            report: self,
            precision,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.text(6), f)
    }
}

/// Display adapter returned by [`Report::text`].
pub struct TextReport<'a> {
    report: &'a Report,
    precision: usize,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.report;
        let p = self.precision;

        writeln!(f, "PORTFOLIO (total value ${:.2}):", r.total_value)?;
        writeln!(
            f,
            "  {:<10} {:>12} {:>12} {:>14} {:>10} {:>10}",
            "TICKER", "SHARES", "PRICE", "VALUE", "CURRENT", "TARGET"
        )?;
        for h in &r.holdings {
            writeln!(
                f,
                "  {:<10} {:>12.2} {:>12.2} {:>14.2} {:>10.p$} {:>10.p$}",
                h.ticker, h.shares, h.price, h.value, h.current_weight, h.target_weight
            )?;
        }

        writeln!(f)?;
        writeln!(f, "TRADES TO TARGET (rate {}):", r.trading_rate)?;
        write_trades(f, &r.target_trades, p)?;
        writeln!(f, "  Trading cost:  ${:.2}", r.naive_cost)?;
        writeln!(f, "  Cost limit:    ${:.2}", r.trading_cost_limit)?;

        writeln!(f)?;
        match &r.optimized {
            None => writeln!(f, "TRADING COST IS WITHIN LIMIT: holding target weights")?,
            Some(opt) => {
                if opt.converged {
                    writeln!(f, "TRADING COST EXCEEDS LIMIT: optimized allocation")?;
                } else {
                    writeln!(
                        f,
                        "TRADING COST EXCEEDS LIMIT: search NOT CONVERGED, best allocation found"
                    )?;
                }
                write_trades(f, &opt.trades, p)?;
                writeln!(f, "  Trading cost:  ${:.2}", opt.trading_cost)?;
                writeln!(f, "  Deviation:     {:.3e}", opt.objective)?;
                writeln!(f, "  Iterations:    {}", opt.iterations)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "ALLOCATION:")?;
        for a in &r.allocation {
            writeln!(f, "  {:<10} {:.p$}", a.ticker, a.weight)?;
        }
        Ok(())
    }
}

fn write_trades(f: &mut fmt::Formatter<'_>, trades: &[Trade], p: usize) -> fmt::Result {
    for t in trades {
        writeln!(
            f,
            "  {:<10} {:<4} {:>12.4} sh {:>14.2} $  fee {:>10.2}  ({:.p$} -> {:.p$})",
            t.ticker,
            t.direction,
            t.shares.abs(),
            t.notional(),
            t.cost,
            t.current_weight,
            t.new_weight
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holdings::Holding;
    use crate::solver::solve;

    fn portfolio() -> Portfolio {
        Portfolio::load(vec![
            Holding::new("A", 100.0, 10.0, 0.5),
            Holding::new("B", 0.0, 20.0, 0.5),
        ])
        .unwrap()
    }

    #[test]
    fn within_limit_has_no_optimized_section() {
        let p = portfolio();
        let params = SolverParams::new(100.0, 0.03, 1e-9);
        let outcome = solve(&p, &params).unwrap();
        let report = Report::new(&p, &params, &outcome).unwrap();
        assert!(!report.exceeds_limit);
        assert!(report.optimized.is_none());
        assert_eq!(report.allocation[1].weight, 0.5);
        assert!(report.to_string().contains("WITHIN LIMIT"));
    }

    #[test]
    fn exceeding_limit_reports_optimized_trades() {
        let p = portfolio();
        let params = SolverParams::new(15.0, 0.03, 1e-12);
        let outcome = solve(&p, &params).unwrap();
        let report = Report::new(&p, &params, &outcome).unwrap();
        assert!(report.exceeds_limit);
        let opt = report.optimized.as_ref().unwrap();
        assert!(opt.converged);
        assert_eq!(opt.trades.len(), 2);
        let text = report.text(4).to_string();
        assert!(text.contains("EXCEEDS LIMIT"));
        assert!(text.contains("0.7500"));
    }

    #[test]
    fn non_converged_is_labeled() {
        let p = portfolio();
        let params = SolverParams::new(15.0, 0.03, 1e-12);
        let report = Report::non_converged(&p, &params, &[0.9, 0.1], 0.32, 3).unwrap();
        assert!(!report.optimized.as_ref().unwrap().converged);
        assert!(report.to_string().contains("NOT CONVERGED"));
    }

    #[test]
    fn json_has_expected_fields() {
        let p = portfolio();
        let params = SolverParams::new(15.0, 0.03, 1e-12);
        let outcome = solve(&p, &params).unwrap();
        let json = Report::new(&p, &params, &outcome).unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["exceeds_limit"], true);
        assert_eq!(value["holdings"][0]["ticker"], "A");
        assert_eq!(value["target_trades"][0]["direction"], "Sell");
        assert!(value["optimized"]["trading_cost"].as_f64().unwrap() <= 15.0 + 1e-9);
    }
}
