//! Regression settings, loadable from TOML

use crate::error::{RegressionError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for a regression run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    /// Degree of the least squares and single elastic-net polynomial
    pub degree: usize,
    /// Penalty strength of every elastic-net fit
    pub alpha: f64,
    /// L1 share of the single elastic-net fit
    pub l1_ratio: f64,
    /// L1 share of the degree sweep
    pub sweep_l1_ratio: f64,
    pub sweep_degrees: Vec<usize>,
    /// Sessions per year used by the trend classification
    pub trading_days: usize,
    /// Coordinate descent sweeps per elastic-net fit
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            degree: 4,
            alpha: 2.0,
            l1_ratio: 0.5,
            sweep_l1_ratio: 0.9,
            sweep_degrees: vec![2, 3, 4, 6, 8],
            trading_days: 252,
            max_iter: 1000,
            tol: 1e-4,
        }
    }
}

impl RegressionConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.degree == 0 {
            return Err(RegressionError::ParameterError(
                "degree must be at least 1".to_string(),
            ));
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(RegressionError::ParameterError(format!(
                "alpha must be non-negative, got {}",
                self.alpha
            )));
        }
        for (name, ratio) in [("l1_ratio", self.l1_ratio), ("sweep_l1_ratio", self.sweep_l1_ratio)] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(RegressionError::ParameterError(format!(
                    "{} must be between 0 and 1, got {}",
                    name, ratio
                )));
            }
        }
        if self.sweep_degrees.iter().any(|d| *d == 0) {
            return Err(RegressionError::ParameterError(
                "sweep degrees must be at least 1".to_string(),
            ));
        }
        if self.trading_days == 0 {
            return Err(RegressionError::ParameterError(
                "trading_days must be at least 1".to_string(),
            ));
        }
        if self.max_iter == 0 || self.tol.is_nan() || self.tol <= 0.0 {
            return Err(RegressionError::ParameterError(
                "max_iter and tol must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
