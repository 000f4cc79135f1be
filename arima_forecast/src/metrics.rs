//! Metrics for evaluating forecast performance

use crate::error::{ForecastError, Result};
use std::fmt;

fn check_lengths(actual: &[f64], forecast: &[f64]) -> Result<()> {
    if actual.len() != forecast.len() || actual.is_empty() {
        return Err(ForecastError::ValidationError(format!(
            "Forecast and actual values must have the same non-zero length, got {} and {}",
            forecast.len(),
            actual.len()
        )));
    }
    Ok(())
}

/// Mean of squared errors
pub fn mean_squared_error(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    check_lengths(actual, forecast)?;
    let total: f64 = actual
        .iter()
        .zip(forecast)
        .map(|(a, f)| (a - f).powi(2))
        .sum();
    Ok(total / actual.len() as f64)
}

/// Mean of absolute errors
pub fn mean_absolute_error(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    check_lengths(actual, forecast)?;
    let total: f64 = actual.iter().zip(forecast).map(|(a, f)| (a - f).abs()).sum();
    Ok(total / actual.len() as f64)
}

/// Square root of [`mean_squared_error`]
pub fn root_mean_squared_error(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    Ok(mean_squared_error(actual, forecast)?.sqrt())
}

/// Mean of `|actual - forecast| / |actual|`, as a fraction
///
/// A zero actual value makes the result infinite rather than an error.
pub fn mean_absolute_percentage_error(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    check_lengths(actual, forecast)?;
    let total: f64 = actual
        .iter()
        .zip(forecast)
        .map(|(a, f)| ((a - f) / a).abs())
        .sum();
    Ok(total / actual.len() as f64)
}

/// Error summary of a forecast against held-out data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastMetrics {
    /// Mean squared error
    pub mse: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Mean absolute percentage error (fraction)
    pub mape: f64,
}

impl ForecastMetrics {
    /// Compare two series on the same scale
    pub fn compare(actual: &[f64], forecast: &[f64]) -> Result<Self> {
        let mse = mean_squared_error(actual, forecast)?;
        Ok(Self {
            mse,
            mae: mean_absolute_error(actual, forecast)?,
            rmse: mse.sqrt(),
            mape: mean_absolute_percentage_error(actual, forecast)?,
        })
    }

    /// Evaluate a log-price forecast
    ///
    /// MSE, MAE and RMSE are measured on the log scale. MAPE is measured on
    /// prices, after exponentiating both series.
    pub fn evaluate(log_actual: &[f64], log_forecast: &[f64]) -> Result<Self> {
        let mse = mean_squared_error(log_actual, log_forecast)?;
        let mae = mean_absolute_error(log_actual, log_forecast)?;

        let actual: Vec<f64> = log_actual.iter().map(|v| v.exp()).collect();
        let forecast: Vec<f64> = log_forecast.iter().map(|v| v.exp()).collect();
        let mape = mean_absolute_percentage_error(&actual, &forecast)?;

        Ok(Self {
            mse,
            mae,
            rmse: mse.sqrt(),
            mape,
        })
    }
}

impl fmt::Display for ForecastMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MSE: {}", self.mse)?;
        writeln!(f, "MAE: {}", self.mae)?;
        writeln!(f, "RMSE: {}", self.rmse)?;
        write!(f, "MAPE: {}", self.mape)
    }
}
