//! Pipeline settings, loadable from TOML

use crate::error::{ForecastError, Result};
use crate::models::arima::ArimaSpec;
use crate::models::auto_arima::AutoArimaConfig;
use price_math::decomposition::Model;
use price_math::stationarity::AdfConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for a forecast run
///
/// Every key is optional in the TOML form; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Window of the rolling mean and standard deviation
    pub rolling_window: usize,
    /// Seasonal period of the decomposition, in calendar days
    pub decomposition_period: usize,
    pub decomposition_model: Model,
    /// Leading rows left out of the training set
    pub skip_rows: usize,
    /// Share of rows before the train/test boundary
    pub train_ratio: f64,
    /// Orders of the model used for the forecast
    pub order: ArimaSpec,
    /// Significance level of the prediction intervals
    pub interval_alpha: f64,
    /// Grid size of the closing-price density estimate
    pub kde_points: usize,
    pub adf: AdfConfig,
    pub auto: AutoArimaConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            rolling_window: 12,
            decomposition_period: 30,
            decomposition_model: Model::Multiplicative,
            skip_rows: 3,
            train_ratio: 0.9,
            order: ArimaSpec::new(1, 1, 2),
            interval_alpha: 0.05,
            kde_points: 200,
            adf: AdfConfig::default(),
            auto: AutoArimaConfig::default(),
        }
    }
}

impl ForecastConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rolling_window == 0 {
            return Err(ForecastError::InvalidParameter(
                "rolling_window must be at least 1".to_string(),
            ));
        }
        if self.decomposition_period < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "decomposition_period must be at least 2, got {}",
                self.decomposition_period
            )));
        }
        if self.train_ratio.is_nan() || self.train_ratio <= 0.0 || self.train_ratio >= 1.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "train_ratio must be between 0 and 1, got {}",
                self.train_ratio
            )));
        }
        if self.interval_alpha.is_nan() || self.interval_alpha <= 0.0 || self.interval_alpha >= 1.0
        {
            return Err(ForecastError::InvalidParameter(format!(
                "interval_alpha must be between 0 and 1, got {}",
                self.interval_alpha
            )));
        }
        if self.kde_points < 2 {
            return Err(ForecastError::InvalidParameter(
                "kde_points must be at least 2".to_string(),
            ));
        }
        let auto = &self.auto;
        if auto.start_p > auto.max_p || auto.start_q > auto.max_q {
            return Err(ForecastError::InvalidParameter(format!(
                "auto start orders ({}, {}) exceed the maxima ({}, {})",
                auto.start_p, auto.start_q, auto.max_p, auto.max_q
            )));
        }
        if auto.test_alpha.is_nan() || auto.test_alpha <= 0.0 || auto.test_alpha >= 1.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "auto.test_alpha must be between 0 and 1, got {}",
                auto.test_alpha
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use price_math::stationarity::Autolag;

    #[test]
    fn test_defaults_are_valid() {
        let config = ForecastConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.order, ArimaSpec::new(1, 1, 2));
        assert_eq!(config.auto.max_p, 3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ForecastConfig::from_toml_str(
            r#"
train_ratio = 0.8
decomposition_model = "additive"

[order]
p = 2
d = 1
q = 0

[adf]
autolag = { fixed = 4 }

[auto]
max_p = 2
"#,
        )
        .unwrap();

        assert_eq!(config.train_ratio, 0.8);
        assert_eq!(config.decomposition_model, Model::Additive);
        assert_eq!(config.order, ArimaSpec::new(2, 1, 0));
        assert_eq!(config.adf.autolag, Autolag::Fixed(4));
        assert_eq!(config.auto.max_p, 2);
        assert_eq!(config.auto.max_q, 3);
        assert_eq!(config.rolling_window, 12);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            ForecastConfig::from_toml_str("train_ratio = 1.5"),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert!(matches!(
            ForecastConfig::from_toml_str("rolling_window = \"twelve\""),
            Err(ForecastError::ConfigError(_))
        ));
    }
}
