//! Transaction cost modeling.

use crate::error::ValidationError;

/// Proportional trading cost: every dollar bought or sold is charged `rate`.
///
/// Buys and sells are charged the same way and never net against each other.
///
/// ```
/// use rebalance_qp::portfolio::CostModel;
///
/// let model = CostModel::new(0.03).unwrap();
/// // 3% on $500 of notional in either direction
/// assert!((model.compute_cost(500.0) - 15.0).abs() < 1e-12);
/// assert_eq!(model.compute_cost(-500.0), model.compute_cost(500.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CostModel {
    /// Fraction of notional charged per trade (0.03 = 3%).
    pub rate: f64,
}

impl CostModel {
    /// Build a cost model, rejecting rates outside (0, 1).
    pub fn new(rate: f64) -> Result<Self, ValidationError> {
        if !rate.is_finite() || rate <= 0.0 || rate >= 1.0 {
            return Err(ValidationError::Parameter(format!(
                "trading_rate must be in (0, 1), got {rate}"
            )));
        }
        Ok(Self { rate })
    }

    /// A zero-cost model (no fees).
    pub fn zero() -> Self {
        Self { rate: 0.0 }
    }

    /// Cost of trading the given dollar notional. Always non-negative.
    #[inline]
    pub fn compute_cost(&self, notional: f64) -> f64 {
        notional.abs() * self.rate
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::zero()
    }
}
