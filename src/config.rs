//! TOML configuration loading and validation.
//!
//! Every key is optional; an empty file (or no file) yields the defaults.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::portfolio::TARGET_SUM_TOLERANCE;
use crate::solver::DEFAULT_MAX_ITERATIONS;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolverConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_weight_sum_tolerance")]
    pub weight_sum_tolerance: f64,
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}
fn default_weight_sum_tolerance() -> f64 {
    TARGET_SUM_TOLERANCE
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            weight_sum_tolerance: default_weight_sum_tolerance(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_precision")]
    pub precision: usize,
}

fn default_precision() -> usize {
    6
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            precision: default_precision(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        if self.solver.max_iterations == 0 {
            return Err(Error::Config("max_iterations must be > 0".into()));
        }
        let tol = self.solver.weight_sum_tolerance;
        if !tol.is_finite() || tol <= 0.0 || tol >= 1.0 {
            return Err(Error::Config(format!(
                "weight_sum_tolerance must be in (0, 1), got {tol}"
            )));
        }
        if self.output.precision > 15 {
            return Err(Error::Config(format!(
                "precision must be <= 15, got {}",
                self.output.precision
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_toml() -> &'static str {
        r#"
[solver]
max_iterations = 200
weight_sum_tolerance = 1e-4

[output]
format = "json"
precision = 4
"#
    }

    #[test]
    fn parse_example_config() {
        let config = Config::from_toml(example_toml()).unwrap();
        assert_eq!(config.solver.max_iterations, 200);
        assert_eq!(config.solver.weight_sum_tolerance, 1e-4);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.precision, 4);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.solver.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(config.solver.weight_sum_tolerance, TARGET_SUM_TOLERANCE);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.output.precision, 6);
    }

    #[test]
    fn partial_section_fills_defaults() {
        let config = Config::from_toml("[solver]\nmax_iterations = 10\n").unwrap();
        assert_eq!(config.solver.max_iterations, 10);
        assert_eq!(config.solver.weight_sum_tolerance, TARGET_SUM_TOLERANCE);
    }

    #[test]
    fn validate_catches_zero_iterations() {
        let err = Config::from_toml("[solver]\nmax_iterations = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn validate_catches_bad_sum_tolerance() {
        assert!(Config::from_toml("[solver]\nweight_sum_tolerance = 0.0\n").is_err());
        assert!(Config::from_toml("[solver]\nweight_sum_tolerance = -1e-6\n").is_err());
    }

    #[test]
    fn validate_catches_bad_precision() {
        assert!(Config::from_toml("[output]\nprecision = 30\n").is_err());
    }

    #[test]
    fn reject_unknown_format() {
        let err = Config::from_toml("[output]\nformat = \"xml\"\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, example_toml().as_bytes()).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.solver.max_iterations, 200);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = Config::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
