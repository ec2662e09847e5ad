//! Error types for portfolio loading and rebalancing.

use std::fmt;
use std::path::PathBuf;

/// Reasons a portfolio or solver input is rejected before any search runs.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationError {
    /// The holding set is empty.
    EmptyPortfolio,
    /// A holding has an empty ticker.
    EmptyTicker,
    /// The same ticker appears twice.
    DuplicateTicker(String),
    /// Price must be finite and greater than zero.
    NonPositivePrice { ticker: String, price: f64 },
    /// Shares must be finite and non-negative.
    NegativeShares { ticker: String, shares: f64 },
    /// Target weight must be finite and in [0, 1].
    TargetOutOfRange { ticker: String, weight: f64 },
    /// Target weights must sum to 1.
    TargetSum { sum: f64 },
    /// Total portfolio value must be positive.
    ZeroValue,
    /// A candidate allocation has the wrong number of weights.
    LengthMismatch { expected: usize, got: usize },
    /// A solver parameter is out of range.
    Parameter(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyPortfolio => write!(f, "portfolio has no holdings"),
            ValidationError::EmptyTicker => write!(f, "holding has an empty ticker"),
            ValidationError::DuplicateTicker(t) => write!(f, "duplicate ticker: {t}"),
            ValidationError::NonPositivePrice { ticker, price } => {
                write!(f, "price for {ticker} must be > 0, got {price}")
            }
            ValidationError::NegativeShares { ticker, shares } => {
                write!(f, "shares for {ticker} must be >= 0, got {shares}")
            }
            ValidationError::TargetOutOfRange { ticker, weight } => {
                write!(f, "target weight for {ticker} must be in [0, 1], got {weight}")
            }
            ValidationError::TargetSum { sum } => {
                write!(f, "target weights must sum to 1.0, got {sum}")
            }
            ValidationError::ZeroValue => write!(f, "total portfolio value must be > 0"),
            ValidationError::LengthMismatch { expected, got } => {
                write!(f, "expected {expected} weights, got {got}")
            }
            ValidationError::Parameter(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// The constraint a rejected problem cannot satisfy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constraint {
    FullyInvested,
    NoShorting,
    TradingCost,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::FullyInvested => write!(f, "weights sum to 1"),
            Constraint::NoShorting => write!(f, "weights non-negative"),
            Constraint::TradingCost => write!(f, "trading cost within limit"),
        }
    }
}

fn format_weights(weights: &[f64]) -> String {
    let parts: Vec<String> = weights.iter().map(|w| format!("{w:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

/// All errors that can occur while loading inputs or rebalancing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("infeasible: no allocation satisfies \"{constraint}\" ({detail})")]
    Infeasible {
        constraint: Constraint,
        detail: String,
    },

    #[error(
        "solver did not converge after {iterations} iterations; best (non-optimal) weights {} with objective {objective:.6e}",
        format_weights(.weights)
    )]
    Convergence {
        weights: Vec<f64>,
        objective: f64,
        iterations: usize,
    },

    #[error("failed to read portfolio file {path}: {source}")]
    PortfolioRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse portfolio CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
