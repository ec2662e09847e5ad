//! CLI entry point for the cost-bounded rebalancer.
//!
//! Usage:
//!   rebalance <COST_LIMIT> <TRADING_RATE> <TOLERANCE> <PORTFOLIO_CSV>
//!   rebalance 7500 0.03 0.0001 portfolio.csv --json

use std::path::PathBuf;
use std::process;

use clap::Parser;

use rebalance_qp::config::{Config, OutputFormat};
use rebalance_qp::error::Error;
use rebalance_qp::holdings;
use rebalance_qp::portfolio::Portfolio;
use rebalance_qp::report::Report;
use rebalance_qp::solver::{self, SolverParams};

#[derive(Parser)]
#[command(name = "rebalance")]
#[command(about = "Rebalance toward target weights within a trading-cost budget")]
#[command(version)]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// Maximum total trading cost in dollars
    cost_limit: f64,

    /// Fraction of notional charged per trade (0.03 = 3%)
    trading_rate: f64,

    /// Solver tolerance (0 searches to machine precision)
    tolerance: f64,

    /// Portfolio CSV with ticker, shares, price, target_weight columns
    portfolio: PathBuf,

    /// Path to config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the solver's iteration cap
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {e}");
                process::exit(1);
            }
        },
        None => Config::default(),
    };

    if let Err(e) = run(&cli, &config) {
        match &e {
            Error::Infeasible { .. } => {
                eprintln!("\nAborted: {e}");
                process::exit(2);
            }
            Error::Convergence { .. } => {
                eprintln!("\nWarning: {e}");
                process::exit(3);
            }
            _ => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
}

fn run(cli: &Cli, config: &Config) -> Result<(), Error> {
    let rows = holdings::load_csv(&cli.portfolio)?;
    let portfolio = Portfolio::load_with_tolerance(rows, config.solver.weight_sum_tolerance)?;

    let params = SolverParams::new(cli.cost_limit, cli.trading_rate, cli.tolerance)
        .with_max_iterations(cli.max_iterations.unwrap_or(config.solver.max_iterations));

    let format = if cli.json {
        OutputFormat::Json
    } else {
        config.output.format
    };

    match solver::solve(&portfolio, &params) {
        Ok(outcome) => {
            let report = Report::new(&portfolio, &params, &outcome)?;
            print_report(&report, format, config.output.precision)
        }
        Err(Error::Convergence {
            weights,
            objective,
            iterations,
        }) => {
            // Still show the best allocation, labeled as non-converged.
            let report =
                Report::non_converged(&portfolio, &params, &weights, objective, iterations)?;
            print_report(&report, format, config.output.precision)?;
            Err(Error::Convergence {
                weights,
                objective,
                iterations,
            })
        }
        Err(e) => Err(e),
    }
}

fn print_report(report: &Report, format: OutputFormat, precision: usize) -> Result<(), Error> {
    match format {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => print!("{}", report.text(precision)),
    }
    Ok(())
}
