//! Classical seasonal decomposition by moving averages

use crate::stats::nan_mean;
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// How trend, seasonal and residual combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    /// `x = trend + seasonal + resid`
    Additive,
    /// `x = trend * seasonal * resid`
    Multiplicative,
}

/// Components of a decomposed series, index-aligned with the input
///
/// Trend and residual are `None` for the half-window at each edge where the
/// centred moving average is undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub model: Model,
    pub period: usize,
    pub observed: Vec<f64>,
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub resid: Vec<Option<f64>>,
}

/// Centred moving average used as the trend estimate
///
/// Odd periods use equal weights. Even periods use a `2 x period` average,
/// i.e. weights `[0.5, 1, ..., 1, 0.5] / period`.
fn centred_trend(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let weights: Vec<f64> = if period % 2 == 0 {
        let mut w = vec![1.0 / period as f64; period + 1];
        w[0] = 0.5 / period as f64;
        w[period] = 0.5 / period as f64;
        w
    } else {
        vec![1.0 / period as f64; period]
    };
    let half = weights.len() / 2;
    let n = values.len();

    (0..n)
        .map(|i| {
            if i < half || i + half >= n {
                None
            } else {
                Some(
                    weights
                        .iter()
                        .enumerate()
                        .map(|(k, w)| w * values[i + k - half])
                        .sum(),
                )
            }
        })
        .collect()
}

/// Split `values` into trend, seasonal and residual components
pub fn seasonal_decompose(values: &[f64], model: Model, period: usize) -> Result<Decomposition> {
    if period < 2 {
        return Err(MathError::InvalidInput(
            "Seasonal period must be at least 2".to_string(),
        ));
    }
    if values.len() < 2 * period {
        return Err(MathError::InsufficientData(format!(
            "Decomposition with period {} needs {} observations, got {}",
            period,
            2 * period,
            values.len()
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "Series contains missing or infinite values".to_string(),
        ));
    }
    if model == Model::Multiplicative && values.iter().any(|&v| v <= 0.0) {
        return Err(MathError::InvalidInput(
            "Multiplicative seasonality is not appropriate for zero and negative values"
                .to_string(),
        ));
    }

    let trend = centred_trend(values, period);
    let detrended: Vec<f64> = values
        .iter()
        .zip(&trend)
        .map(|(v, t)| match (t, model) {
            (Some(t), Model::Multiplicative) => v / t,
            (Some(t), Model::Additive) => v - t,
            (None, _) => f64::NAN,
        })
        .collect();

    let mut figure: Vec<f64> = (0..period)
        .map(|phase| {
            let phase_values: Vec<f64> = detrended
                .iter()
                .skip(phase)
                .step_by(period)
                .cloned()
                .collect();
            nan_mean(&phase_values)
        })
        .collect();
    let level = nan_mean(&figure);
    match model {
        Model::Multiplicative => figure.iter_mut().for_each(|s| *s /= level),
        Model::Additive => figure.iter_mut().for_each(|s| *s -= level),
    }

    let seasonal: Vec<f64> = (0..values.len()).map(|i| figure[i % period]).collect();
    let resid = values
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((v, t), s)| {
            t.map(|t| match model {
                Model::Multiplicative => v / (t * s),
                Model::Additive => v - t - s,
            })
        })
        .collect();

    Ok(Decomposition {
        model,
        period,
        observed: values.to_vec(),
        trend,
        seasonal,
        resid,
    })
}
