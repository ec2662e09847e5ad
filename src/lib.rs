//! # rebalance-qp
//!
//! Cost-bounded portfolio rebalancing.
//!
//! Given current holdings and target weights, find the fully invested,
//! long-only allocation closest to the targets (in squared deviation) whose
//! total trading cost stays within a budget.
//!
//! ## Quick Start
//!
//! ```
//! use rebalance_qp::holdings::Holding;
//! use rebalance_qp::portfolio::Portfolio;
//! use rebalance_qp::solver::{solve, SolverParams};
//!
//! // $1000 all in A; targets are 50/50
//! let portfolio = Portfolio::load(vec![
//!     Holding::new("A", 100.0, 10.0, 0.5),
//!     Holding::new("B", 0.0, 20.0, 0.5),
//! ])
//! .unwrap();
//!
//! // Going straight to the targets costs $30 at 3%
//! let generous = solve(&portfolio, &SolverParams::new(30.0, 0.03, 1e-9)).unwrap();
//! assert!(generous.used_targets());
//! assert_eq!(generous.weights, vec![0.5, 0.5]);
//!
//! // With $15 the best we can do is move half way
//! let tight = solve(&portfolio, &SolverParams::new(15.0, 0.03, 1e-12)).unwrap();
//! assert!(tight.exceeds_limit);
//! assert!((tight.weights[0] - 0.75).abs() < 1e-6);
//! assert!(tight.trading_cost <= 15.0 + 1e-9);
//! ```
//!
//! ## Errors
//!
//! | Error | When |
//! |-------|------|
//! | [`Error::Validation`] | Bad holdings or parameters, raised before any search |
//! | [`Error::Infeasible`] | No allocation meets every constraint (negative budget) |
//! | [`Error::Convergence`] | Iteration cap hit; carries the best allocation found |

pub mod config;
pub mod error;
pub mod holdings;
pub mod portfolio;
pub mod report;
pub mod solver;

// Re-export public API
pub use config::Config;
pub use error::{Constraint, Error, Result, ValidationError};
pub use holdings::Holding;
pub use portfolio::{CostModel, Direction, Portfolio, Trade};
pub use report::Report;
pub use solver::{RebalanceOutcome, SolverParams, solve};
