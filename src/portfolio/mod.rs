//! Portfolio model: current values and weights, and the trades implied by
//! moving to a candidate allocation.
//!
//! A [`Portfolio`] is built once from validated [`Holding`]s and never
//! mutated. Weights are plain `f64` fractions aligned with holding order.
//!
//! # Example
//!
//! ```
//! use rebalance_qp::holdings::Holding;
//! use rebalance_qp::portfolio::Portfolio;
//!
//! let portfolio = Portfolio::load(vec![
//!     Holding::new("A", 100.0, 10.0, 0.5), // $1000
//!     Holding::new("B", 0.0, 20.0, 0.5),   // $0
//! ])
//! .unwrap();
//!
//! assert_eq!(portfolio.current_weights(), &[1.0, 0.0]);
//! // 3% on $500 sold plus $500 bought
//! assert!((portfolio.naive_rebalance_cost(0.03) - 30.0).abs() < 1e-9);
//! ```

pub mod cost_model;
pub mod trade;

pub use cost_model::CostModel;
pub use trade::{Direction, Trade};

use rustc_hash::FxHashMap;

use crate::error::ValidationError;
use crate::holdings::Holding;

/// Absolute tolerance on the sum of target weights.
pub const TARGET_SUM_TOLERANCE: f64 = 1e-6;

/// An ordered, immutable set of holdings with derived values and weights.
#[derive(Clone, Debug)]
pub struct Portfolio {
    holdings: Vec<Holding>,
    /// Ticker -> position in `holdings`
    index: FxHashMap<String, usize>,
    total_value: f64,
    current: Vec<f64>,
    targets: Vec<f64>,
}

impl Portfolio {
    /// Validate holdings and derive current weights.
    ///
    /// Target weights must sum to 1 within [`TARGET_SUM_TOLERANCE`].
    pub fn load(holdings: Vec<Holding>) -> Result<Self, ValidationError> {
        Self::load_with_tolerance(holdings, TARGET_SUM_TOLERANCE)
    }

    /// Like [`load`](Self::load) with a caller-chosen target-sum tolerance.
    pub fn load_with_tolerance(
        holdings: Vec<Holding>,
        sum_tolerance: f64,
    ) -> Result<Self, ValidationError> {
        if holdings.is_empty() {
            return Err(ValidationError::EmptyPortfolio);
        }

        let mut index = FxHashMap::default();
        for (i, h) in holdings.iter().enumerate() {
            validate_holding(h)?;
            if index.insert(h.ticker.clone(), i).is_some() {
                return Err(ValidationError::DuplicateTicker(h.ticker.clone()));
            }
        }

        let target_sum: f64 = holdings.iter().map(|h| h.target_weight).sum();
        if (target_sum - 1.0).abs() > sum_tolerance {
            return Err(ValidationError::TargetSum { sum: target_sum });
        }

        let total_value: f64 = holdings.iter().map(Holding::value).sum();
        if !total_value.is_finite() || total_value <= 0.0 {
            return Err(ValidationError::ZeroValue);
        }

        let current = holdings.iter().map(|h| h.value() / total_value).collect();
        let targets = holdings.iter().map(|h| h.target_weight).collect();

        Ok(Self {
            holdings,
            index,
            total_value,
            current,
            targets,
        })
    }

    // === Queries ===

    /// Holdings in input order.
    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    /// Number of holdings.
    #[inline]
    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    /// Always false for a loaded portfolio; present for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Total portfolio value: sum of shares * price.
    #[inline]
    pub fn total_value(&self) -> f64 {
        self.total_value
    }

    /// Current weight of each holding (value / total), aligned with holdings.
    pub fn current_weights(&self) -> &[f64] {
        &self.current
    }

    /// Target weight of each holding, aligned with holdings.
    pub fn target_weights(&self) -> &[f64] {
        &self.targets
    }

    /// Current weights keyed by ticker.
    pub fn current_weight_map(&self) -> FxHashMap<String, f64> {
        self.holdings
            .iter()
            .zip(&self.current)
            .map(|(h, w)| (h.ticker.clone(), *w))
            .collect()
    }

    /// Current weight for a ticker, if held.
    pub fn current_weight(&self, ticker: &str) -> Option<f64> {
        self.index.get(ticker).map(|&i| self.current[i])
    }

    /// Total dollar cost of moving every holding to `candidate` in one pass.
    ///
    /// `trading_rate * sum(|candidate[i] - current[i]|) * total_value`. Each
    /// leg is charged on its own, whatever its direction.
    pub fn implied_trade_cost(
        &self,
        candidate: &[f64],
        trading_rate: f64,
    ) -> Result<f64, ValidationError> {
        self.check_len(candidate)?;
        Ok(trading_rate * self.movement(candidate) * self.total_value)
    }

    /// Cost of jumping straight to the target weights with no optimization.
    pub fn naive_rebalance_cost(&self, trading_rate: f64) -> f64 {
        trading_rate * self.movement(&self.targets) * self.total_value
    }

    /// Per-holding trades for moving to `candidate`.
    pub fn trades(
        &self,
        candidate: &[f64],
        cost_model: &CostModel,
    ) -> Result<Vec<Trade>, ValidationError> {
        self.check_len(candidate)?;
        let trades = self
            .holdings
            .iter()
            .zip(&self.current)
            .zip(candidate)
            .map(|((h, &current_weight), &new_weight)| {
                let amount = (new_weight - current_weight) * self.total_value;
                Trade {
                    ticker: h.ticker.clone(),
                    direction: trade::direction_of(amount),
                    current_weight,
                    new_weight,
                    amount,
                    shares: amount / h.price,
                    cost: cost_model.compute_cost(amount),
                }
            })
            .collect();
        Ok(trades)
    }

    // === Internal ===

    /// Sum of absolute weight changes, `sum(|w[i] - current[i]|)`.
    pub(crate) fn movement(&self, weights: &[f64]) -> f64 {
        weights
            .iter()
            .zip(&self.current)
            .map(|(w, c)| (w - c).abs())
            .sum()
    }

    fn check_len(&self, candidate: &[f64]) -> Result<(), ValidationError> {
        if candidate.len() != self.holdings.len() {
            return Err(ValidationError::LengthMismatch {
                expected: self.holdings.len(),
                got: candidate.len(),
            });
        }
        Ok(())
    }
}

fn validate_holding(h: &Holding) -> Result<(), ValidationError> {
    if h.ticker.is_empty() {
        return Err(ValidationError::EmptyTicker);
    }
    if !h.price.is_finite() || h.price <= 0.0 {
        return Err(ValidationError::NonPositivePrice {
            ticker: h.ticker.clone(),
            price: h.price,
        });
    }
    if !h.shares.is_finite() || h.shares < 0.0 {
        return Err(ValidationError::NegativeShares {
            ticker: h.ticker.clone(),
            shares: h.shares,
        });
    }
    if !h.target_weight.is_finite() || !(0.0..=1.0).contains(&h.target_weight) {
        return Err(ValidationError::TargetOutOfRange {
            ticker: h.ticker.clone(),
            weight: h.target_weight,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_stock() -> Vec<Holding> {
        vec![
            Holding::new("A", 100.0, 10.0, 0.5),
            Holding::new("B", 0.0, 20.0, 0.5),
        ]
    }

    fn three_stock() -> Vec<Holding> {
        vec![
            Holding::new("A", 5000.0, 63.0, 0.4),
            Holding::new("B", 1000.0, 57.0, 0.3),
            Holding::new("C", 2000.0, 42.0, 0.3),
        ]
    }

    #[test]
    fn current_weights_from_values() {
        let p = Portfolio::load(three_stock()).unwrap();
        let total = 5000.0 * 63.0 + 1000.0 * 57.0 + 2000.0 * 42.0;
        assert_eq!(p.total_value(), total);
        assert!((p.current_weights()[0] - 315_000.0 / total).abs() < 1e-15);
        let sum: f64 = p.current_weights().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn weight_lookup_by_ticker() {
        let p = Portfolio::load(two_stock()).unwrap();
        assert_eq!(p.current_weight("A"), Some(1.0));
        assert_eq!(p.current_weight("B"), Some(0.0));
        assert_eq!(p.current_weight("Z"), None);
        assert_eq!(p.current_weight_map().len(), 2);
    }

    #[test]
    fn naive_cost_charges_both_legs() {
        let p = Portfolio::load(two_stock()).unwrap();
        // 0.03 * (|0.5 - 1.0| + |0.5 - 0.0|) * 1000
        assert!((p.naive_rebalance_cost(0.03) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn implied_cost_at_current_is_zero() {
        let p = Portfolio::load(three_stock()).unwrap();
        let current = p.current_weights().to_vec();
        assert_eq!(p.implied_trade_cost(&current, 0.03).unwrap(), 0.0);
    }

    #[test]
    fn implied_cost_rejects_wrong_length() {
        let p = Portfolio::load(two_stock()).unwrap();
        assert_eq!(
            p.implied_trade_cost(&[1.0], 0.03),
            Err(ValidationError::LengthMismatch {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn trades_are_signed() {
        let p = Portfolio::load(two_stock()).unwrap();
        let trades = p.trades(&[0.75, 0.25], &CostModel::new(0.03).unwrap()).unwrap();
        assert_eq!(trades[0].direction, Direction::Sell);
        assert!((trades[0].amount + 250.0).abs() < 1e-9);
        assert!((trades[0].shares + 25.0).abs() < 1e-9);
        assert_eq!(trades[1].direction, Direction::Buy);
        assert!((trades[1].shares - 12.5).abs() < 1e-9);
        let cost: f64 = trades.iter().map(|t| t.cost).sum();
        assert!((cost - 15.0).abs() < 1e-9);
    }

    #[test]
    fn zero_target_weight_is_valid() {
        let holdings = vec![
            Holding::new("A", 10.0, 10.0, 1.0),
            Holding::new("B", 10.0, 10.0, 0.0),
        ];
        assert!(Portfolio::load(holdings).is_ok());
    }

    #[test]
    fn reject_empty() {
        assert_eq!(
            Portfolio::load(Vec::new()).unwrap_err(),
            ValidationError::EmptyPortfolio
        );
    }

    #[test]
    fn reject_non_positive_price() {
        let mut h = two_stock();
        h[1].price = 0.0;
        assert!(matches!(
            Portfolio::load(h),
            Err(ValidationError::NonPositivePrice { .. })
        ));
    }

    #[test]
    fn reject_negative_shares() {
        let mut h = two_stock();
        h[0].shares = -1.0;
        assert!(matches!(
            Portfolio::load(h),
            Err(ValidationError::NegativeShares { .. })
        ));
    }

    #[test]
    fn reject_negative_target() {
        let mut h = two_stock();
        h[0].target_weight = -0.5;
        h[1].target_weight = 1.5;
        assert!(matches!(
            Portfolio::load(h),
            Err(ValidationError::TargetOutOfRange { .. })
        ));
    }

    #[test]
    fn reject_target_sum() {
        let mut h = two_stock();
        h[1].target_weight = 0.49;
        assert!(matches!(
            Portfolio::load(h),
            Err(ValidationError::TargetSum { .. })
        ));
    }

    #[test]
    fn target_sum_within_tolerance() {
        let mut h = two_stock();
        h[1].target_weight = 0.5 + 5e-7;
        assert!(Portfolio::load(h).is_ok());
    }

    #[test]
    fn reject_zero_value() {
        let h = vec![
            Holding::new("A", 0.0, 10.0, 0.5),
            Holding::new("B", 0.0, 20.0, 0.5),
        ];
        assert_eq!(Portfolio::load(h).unwrap_err(), ValidationError::ZeroValue);
    }

    #[test]
    fn reject_duplicate_ticker() {
        let h = vec![
            Holding::new("A", 1.0, 10.0, 0.5),
            Holding::new("A", 1.0, 20.0, 0.5),
        ];
        assert_eq!(
            Portfolio::load(h).unwrap_err(),
            ValidationError::DuplicateTicker("A".into())
        );
    }

    #[test]
    fn reject_empty_ticker() {
        let h = vec![Holding::new("", 1.0, 10.0, 1.0)];
        assert_eq!(Portfolio::load(h).unwrap_err(), ValidationError::EmptyTicker);
    }
}
