//! Forecasting models for price series

pub mod arima;
pub mod auto_arima;

use crate::error::{ForecastError, Result};

/// Forecast result containing predicted values
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    /// Forecasted values
    values: Vec<f64>,
    /// Prediction intervals (optional)
    intervals: Option<Vec<(f64, f64)>>,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            intervals: None,
        }
    }

    /// Create a new forecast result with prediction intervals
    pub fn new_with_intervals(values: Vec<f64>, intervals: Vec<(f64, f64)>) -> Result<Self> {
        if values.len() != intervals.len() {
            return Err(ForecastError::ValidationError(format!(
                "Values length ({}) doesn't match intervals length ({})",
                values.len(),
                intervals.len()
            )));
        }

        Ok(Self {
            values,
            intervals: Some(intervals),
        })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.values.len()
    }

    /// Get the prediction intervals, if available
    pub fn intervals(&self) -> Option<&[(f64, f64)]> {
        self.intervals.as_deref()
    }

    /// Apply `f` to values and interval bounds, e.g. `f64::exp` to undo a log
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            values: self.values.iter().map(|v| f(*v)).collect(),
            intervals: self
                .intervals
                .as_ref()
                .map(|iv| iv.iter().map(|(lo, hi)| (f(*lo), f(*hi))).collect()),
        }
    }
}

/// A model specification that can be estimated on a series
pub trait ForecastModel {
    /// The estimated model
    type Fitted: FittedModel;

    /// Estimate the model on `series`
    fn fit(&self, series: &[f64]) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> String;
}

/// An estimated model able to extrapolate its series
pub trait FittedModel {
    /// Point forecasts for the next `horizon` steps
    fn forecast(&self, horizon: usize) -> Result<ForecastResult>;

    /// In-sample one-step residuals
    fn residuals(&self) -> &[f64];

    /// Akaike information criterion of the fit
    fn aic(&self) -> f64;
}

/// Apply `d` rounds of first differencing
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut current = series.to_vec();
    for _ in 0..d {
        current = current.windows(2).map(|w| w[1] - w[0]).collect();
    }
    current
}

/// Undo `d` rounds of differencing for values that follow `history`
///
/// `history` is the undifferenced series the forecasts continue.
pub fn integrate(forecast_diff: &[f64], history: &[f64], d: usize) -> Vec<f64> {
    // Last value at each differencing level 0..d
    let anchors: Vec<f64> = (0..d)
        .map(|k| difference(history, k).last().copied().unwrap_or(0.0))
        .collect();

    let mut current = forecast_diff.to_vec();
    for anchor in anchors.iter().rev() {
        let mut level = *anchor;
        current = current
            .iter()
            .map(|v| {
                level += v;
                level
            })
            .collect();
    }
    current
}
