//! ARIMA models for time series forecasting
//!
//! Estimation uses the conditional sum of squares: the series is differenced
//! `d` times, the first `p` differenced values are taken as given, pre-sample
//! shocks are zero, and the AR/MA coefficients (plus an optional mean of the
//! differenced series) minimise the squared one-step errors.

use super::{difference, integrate, FittedModel, ForecastModel, ForecastResult};
use crate::error::{ForecastError, Result};
use log::{debug, warn};
use price_math::optimize::{nelder_mead, NelderMeadConfig};
use price_math::stats::{mean, normal_quantile};
use serde::{Deserialize, Serialize};
use std::fmt;

const COEFFICIENT_BOUND: f64 = 0.99;

/// Model orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaSpec {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
}

impl ArimaSpec {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl fmt::Display for ArimaSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct Arima {
    spec: ArimaSpec,
    /// `None` means an intercept only when the series is not differenced
    intercept: Option<bool>,
    optimizer: NelderMeadConfig,
}

impl Arima {
    /// Create a new ARIMA model
    pub fn new(spec: ArimaSpec) -> Self {
        Self {
            spec,
            intercept: None,
            optimizer: NelderMeadConfig::default(),
        }
    }

    /// Include or drop the mean of the differenced series
    pub fn with_intercept(mut self, intercept: bool) -> Self {
        self.intercept = Some(intercept);
        self
    }

    /// Override the simplex search settings
    pub fn with_optimizer(mut self, optimizer: NelderMeadConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn spec(&self) -> ArimaSpec {
        self.spec
    }

    pub fn has_intercept(&self) -> bool {
        self.intercept.unwrap_or(self.spec.d == 0)
    }

    fn num_coefficients(&self) -> usize {
        self.spec.p + self.spec.q + usize::from(self.has_intercept())
    }
}

/// One-step errors of the recursion on the differenced series
fn css_residuals(diff: &[f64], mu: f64, ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let p = ar.len();
    let mut errors = vec![0.0; diff.len()];
    for t in p..diff.len() {
        let mut pred = mu;
        for (i, a) in ar.iter().enumerate() {
            pred += a * (diff[t - 1 - i] - mu);
        }
        for (j, b) in ma.iter().enumerate() {
            if t > j {
                pred += b * errors[t - 1 - j];
            }
        }
        errors[t] = diff[t] - pred;
    }
    errors
}

fn sum_of_squares(errors: &[f64], start: usize) -> f64 {
    errors[start..].iter().map(|e| e * e).sum()
}

/// Split a parameter vector into (mu, ar, ma)
fn unpack(params: &[f64], intercept: bool, p: usize) -> (f64, &[f64], &[f64]) {
    let offset = usize::from(intercept);
    let mu = if intercept { params[0] } else { 0.0 };
    (mu, &params[offset..offset + p], &params[offset + p..])
}

impl ForecastModel for Arima {
    type Fitted = FittedArima;

    fn fit(&self, series: &[f64]) -> Result<FittedArima> {
        let ArimaSpec { p, d, q } = self.spec;
        let intercept = self.has_intercept();
        let k = self.num_coefficients();

        if series.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ValidationError(
                "Series contains missing or infinite values".to_string(),
            ));
        }
        let needed = d + p + k + 2;
        if series.len() < needed {
            return Err(ForecastError::ValidationError(format!(
                "Insufficient data for {}. Need at least {} observations, got {}",
                self.spec,
                needed,
                series.len()
            )));
        }

        let diff = difference(series, d);
        let diff_mean = mean(&diff);

        let (params, converged) = if p == 0 && q == 0 {
            // Closed form: the CSS estimate of a constant is the sample mean
            (if intercept { vec![diff_mean] } else { Vec::new() }, true)
        } else {
            let mut initial = Vec::with_capacity(k);
            if intercept {
                initial.push(diff_mean);
            }
            initial.extend((0..p).map(|i| 0.1 / (i + 1) as f64));
            initial.extend((0..q).map(|i| 0.1 / (i + 1) as f64));

            let mut bounds = Vec::with_capacity(k);
            if intercept {
                bounds.push((f64::NEG_INFINITY, f64::INFINITY));
            }
            bounds.extend(std::iter::repeat((-COEFFICIENT_BOUND, COEFFICIENT_BOUND)).take(p + q));

            let objective = |params: &[f64]| {
                let (mu, ar, ma) = unpack(params, intercept, p);
                sum_of_squares(&css_residuals(&diff, mu, ar, ma), p)
            };

            let first = nelder_mead(&objective, &initial, Some(&bounds), &self.optimizer);
            // Restart from the optimum to escape a collapsed simplex
            let second = nelder_mead(&objective, &first.point, Some(&bounds), &self.optimizer);
            debug!(
                "{} CSS: {:.6} after {} + {} iterations",
                self.spec, second.value, first.iterations, second.iterations
            );
            (second.point, first.converged || second.converged)
        };

        if !converged {
            warn!("{} estimation did not converge", self.spec);
        }

        let (mu, ar, ma) = unpack(&params, intercept, p);
        let residuals = css_residuals(&diff, mu, ar, ma);
        let nobs = diff.len() - p;
        let css = sum_of_squares(&residuals, p);
        let sigma2 = css / nobs as f64;
        if !sigma2.is_finite() || sigma2 <= 0.0 {
            return Err(ForecastError::ForecastingError(format!(
                "{} has a degenerate residual variance ({})",
                self.spec, sigma2
            )));
        }

        let n = nobs as f64;
        let log_likelihood = -0.5 * n * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0);
        // Coefficients plus the innovation variance
        let num_params = (k + 1) as f64;

        Ok(FittedArima {
            spec: self.spec,
            intercept: intercept.then_some(mu),
            ar: ar.to_vec(),
            ma: ma.to_vec(),
            sigma2,
            log_likelihood,
            aic: -2.0 * log_likelihood + 2.0 * num_params,
            bic: -2.0 * log_likelihood + num_params * n.ln(),
            nobs,
            converged,
            history: series.to_vec(),
            diff,
            residuals,
        })
    }

    fn name(&self) -> String {
        self.spec.to_string()
    }
}

/// Trained ARIMA model
#[derive(Debug, Clone)]
pub struct FittedArima {
    spec: ArimaSpec,
    intercept: Option<f64>,
    ar: Vec<f64>,
    ma: Vec<f64>,
    sigma2: f64,
    log_likelihood: f64,
    aic: f64,
    bic: f64,
    nobs: usize,
    converged: bool,
    history: Vec<f64>,
    diff: Vec<f64>,
    residuals: Vec<f64>,
}

impl FittedArima {
    pub fn spec(&self) -> ArimaSpec {
        self.spec
    }

    /// Mean of the differenced series, when estimated
    pub fn intercept(&self) -> Option<f64> {
        self.intercept
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    /// Innovation variance estimate
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    pub fn bic(&self) -> f64 {
        self.bic
    }

    /// Observations entering the sum of squares
    pub fn nobs(&self) -> usize {
        self.nobs
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Forecasts on the differenced scale
    fn forecast_differenced(&self, horizon: usize) -> Vec<f64> {
        let mu = self.intercept.unwrap_or(0.0);
        let mut extended = self.diff.clone();
        let mut shocks = self.residuals.clone();

        for _ in 0..horizon {
            let t = extended.len();
            let mut pred = mu;
            for (i, a) in self.ar.iter().enumerate() {
                if t > i {
                    pred += a * (extended[t - 1 - i] - mu);
                }
            }
            for (j, b) in self.ma.iter().enumerate() {
                if t > j {
                    pred += b * shocks[t - 1 - j];
                }
            }
            extended.push(pred);
            // Future shocks have zero expectation
            shocks.push(0.0);
        }

        extended.split_off(self.diff.len())
    }

    /// Moving-average weights of the integrated process
    fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        // (1 - sum ar_i B^i) (1 - B)^d
        let mut poly = vec![1.0];
        poly.extend(self.ar.iter().map(|a| -a));
        for _ in 0..self.spec.d {
            let mut next = vec![0.0; poly.len() + 1];
            for (i, c) in poly.iter().enumerate() {
                next[i] += c;
                next[i + 1] -= c;
            }
            poly = next;
        }
        let phi: Vec<f64> = poly[1..].iter().map(|c| -c).collect();

        let mut psi = vec![0.0; horizon];
        for j in 0..horizon {
            if j == 0 {
                psi[0] = 1.0;
                continue;
            }
            let mut value = self.ma.get(j - 1).copied().unwrap_or(0.0);
            for i in 1..=j.min(phi.len()) {
                value += phi[i - 1] * psi[j - i];
            }
            psi[j] = value;
        }
        psi
    }

    /// Point forecasts with symmetric `1 - alpha` prediction intervals
    pub fn forecast_with_intervals(&self, horizon: usize, alpha: f64) -> Result<ForecastResult> {
        if alpha.is_nan() || alpha <= 0.0 || alpha >= 1.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Alpha must be between 0 and 1, got {}",
                alpha
            )));
        }

        let point = self.forecast(horizon)?;
        let z = normal_quantile(1.0 - alpha / 2.0);
        let mut cumulative = 0.0;
        let intervals = self
            .psi_weights(horizon)
            .iter()
            .zip(point.values())
            .map(|(psi, value)| {
                cumulative += psi * psi;
                let se = (self.sigma2 * cumulative).sqrt();
                (value - z * se, value + z * se)
            })
            .collect();

        ForecastResult::new_with_intervals(point.values().to_vec(), intervals)
    }
}

impl FittedModel for FittedArima {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        let diff_forecast = self.forecast_differenced(horizon);
        Ok(ForecastResult::new(integrate(
            &diff_forecast,
            &self.history,
            self.spec.d,
        )))
    }

    /// One-step errors on the differenced scale, after the conditioning values
    fn residuals(&self) -> &[f64] {
        &self.residuals[self.spec.p..]
    }

    fn aic(&self) -> f64 {
        self.aic
    }
}

impl fmt::Display for FittedArima {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{:^60}", format!("{} Results", self.spec))?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "{:<28}{:>32}", "Method:", "conditional sum of squares")?;
        writeln!(f, "{:<28}{:>32}", "No. Observations:", self.history.len())?;
        writeln!(f, "{:<28}{:>32}", "Effective Observations:", self.nobs)?;
        writeln!(f, "{:<28}{:>32.3}", "Log Likelihood", self.log_likelihood)?;
        writeln!(f, "{:<28}{:>32.3}", "AIC", self.aic)?;
        writeln!(f, "{:<28}{:>32.3}", "BIC", self.bic)?;
        writeln!(f, "{}", "-".repeat(60))?;
        writeln!(f, "{:<28}{:>32}", "", "coef")?;
        if let Some(mu) = self.intercept {
            writeln!(f, "{:<28}{:>32.6}", "intercept", mu)?;
        }
        for (i, a) in self.ar.iter().enumerate() {
            writeln!(f, "{:<28}{:>32.6}", format!("ar.L{}", i + 1), a)?;
        }
        for (i, b) in self.ma.iter().enumerate() {
            writeln!(f, "{:<28}{:>32.6}", format!("ma.L{}", i + 1), b)?;
        }
        writeln!(f, "{:<28}{:>32.6e}", "sigma2", self.sigma2)?;
        write!(f, "{}", rule)
    }
}
