//! Portfolio CSV loading.
//!
//! One row per holding. The header names the columns; order does not matter
//! and unknown columns are ignored.
//!
//! | Column          | Aliases          | Example |
//! |-----------------|------------------|---------|
//! | `ticker`        | `stock_name`     | `AAPL`  |
//! | `shares`        | `units_held`     | `5000`  |
//! | `price`         | `t1_stock_price` | `63.0`  |
//! | `target_weight` |                  | `0.4`   |
//!
//! Rows are returned as parsed. Range checks live in
//! [`Portfolio::load`](crate::portfolio::Portfolio::load).

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single input row: what is held today and where it should end up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    #[serde(alias = "stock_name", alias = "symbol")]
    pub ticker: String,
    #[serde(alias = "units_held")]
    pub shares: f64,
    #[serde(alias = "t1_stock_price")]
    pub price: f64,
    pub target_weight: f64,
}

impl Holding {
    pub fn new(ticker: &str, shares: f64, price: f64, target_weight: f64) -> Self {
        Self {
            ticker: ticker.to_string(),
            shares,
            price,
            target_weight,
        }
    }

    /// Current dollar value of the position.
    #[inline]
    pub fn value(&self) -> f64 {
        self.shares * self.price
    }
}

/// Load holdings from a CSV file.
pub fn load_csv(path: &Path) -> Result<Vec<Holding>> {
    let file = std::fs::File::open(path).map_err(|e| Error::PortfolioRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let holdings = read_csv(file)?;
    log::debug!("loaded {} holdings from {}", holdings.len(), path.display());
    Ok(holdings)
}

/// Parse holdings from any CSV reader (useful for testing).
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Holding>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut holdings = Vec::new();
    for rec in rdr.deserialize::<Holding>() {
        holdings.push(rec?);
    }
    Ok(holdings)
}

/// Parse holdings from CSV text.
pub fn from_csv_str(text: &str) -> Result<Vec<Holding>> {
    read_csv(text.as_bytes())
}
