//! Per-holding trades implied by a candidate allocation.

use serde::Serialize;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
            Direction::Hold => "HOLD",
        };
        f.pad(s)
    }
}

/// The move for one holding from its current weight to a candidate weight.
///
/// Derived on demand, never stored on the portfolio.
#[derive(Debug, Clone, Serialize)]
pub struct Trade {
    pub ticker: String,
    pub direction: Direction,
    pub current_weight: f64,
    pub new_weight: f64,
    /// Signed dollar amount: positive = buy, negative = sell.
    pub amount: f64,
    /// Signed share count at the current price.
    pub shares: f64,
    /// Trading cost charged on `|amount|`.
    pub cost: f64,
}

impl Trade {
    /// Absolute dollar amount moved.
    #[inline]
    pub fn notional(&self) -> f64 {
        self.amount.abs()
    }
}

pub(crate) fn direction_of(amount: f64) -> Direction {
    if amount > 0.0 {
        Direction::Buy
    } else if amount < 0.0 {
        Direction::Sell
    } else {
        Direction::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_from_sign() {
        assert_eq!(direction_of(12.5), Direction::Buy);
        assert_eq!(direction_of(-0.1), Direction::Sell);
        assert_eq!(direction_of(0.0), Direction::Hold);
    }

    #[test]
    fn direction_display() {
        assert_eq!(Direction::Buy.to_string(), "BUY");
        assert_eq!(Direction::Sell.to_string(), "SELL");
        assert_eq!(Direction::Hold.to_string(), "HOLD");
    }
}
