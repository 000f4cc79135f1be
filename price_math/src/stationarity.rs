//! Augmented Dickey-Fuller unit root test
//!
//! Regression with a constant:
//!
//! `dy_t = c + beta * y_{t-1} + sum_i gamma_i * dy_{t-i} + e_t`
//!
//! The test statistic is the t value of `beta`. p-values use the MacKinnon
//! (1994) approximate regression surface and critical values the MacKinnon
//! (2010) response surface for the effective sample size.

use crate::linalg::{least_squares, LeastSquares, Matrix};
use crate::stats::normal_cdf;
use crate::{MathError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

// MacKinnon (1994), constant only, one variable
const TAU_MAX_C: f64 = 2.74;
const TAU_MIN_C: f64 = -18.83;
const TAU_STAR_C: f64 = -1.61;
const TAU_C_SMALLP: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_C_LARGEP: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

// MacKinnon (2010) response surface, constant only, one variable
const CRIT_1PCT: [f64; 4] = [-3.43035, -6.5393, -16.786, -79.433];
const CRIT_5PCT: [f64; 4] = [-2.86154, -2.8903, -4.234, -40.040];
const CRIT_10PCT: [f64; 4] = [-2.56677, -1.5384, -2.809, 0.0];

/// Lag order selection for the augmented terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Autolag {
    /// Minimise the Akaike information criterion
    Aic,
    /// Minimise the Bayesian information criterion
    Bic,
    /// Use exactly this many lags
    Fixed(usize),
}

/// Test configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdfConfig {
    /// Upper bound for lag search; defaults to `ceil(12 * (n / 100)^(1/4))`
    pub max_lag: Option<usize>,
    /// How the lag order is chosen
    pub autolag: Autolag,
}

impl Default for AdfConfig {
    fn default() -> Self {
        Self {
            max_lag: None,
            autolag: Autolag::Aic,
        }
    }
}

/// Critical values of the test statistic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

impl CriticalValues {
    /// Response surface values for a regression on `nobs` observations
    pub fn for_sample(nobs: usize) -> Self {
        let n = nobs as f64;
        let eval = |c: &[f64; 4]| c[0] + c[1] / n + c[2] / (n * n) + c[3] / (n * n * n);
        Self {
            one_pct: eval(&CRIT_1PCT),
            five_pct: eval(&CRIT_5PCT),
            ten_pct: eval(&CRIT_10PCT),
        }
    }
}

/// Outcome of an augmented Dickey-Fuller test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdfReport {
    /// t statistic of the lagged level
    pub statistic: f64,
    /// Approximate p-value
    pub p_value: f64,
    /// Number of lagged differences in the final regression
    pub used_lag: usize,
    /// Observations in the final regression
    pub nobs: usize,
    /// Critical values at 1%, 5% and 10%
    pub critical_values: CriticalValues,
    /// Best information criterion value when the lag was searched
    pub ic_best: Option<f64>,
}

impl AdfReport {
    /// Whether the unit root hypothesis is rejected at `alpha`
    pub fn is_stationary(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

impl fmt::Display for AdfReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            ("Test Statistics", self.statistic),
            ("p-value", self.p_value),
            ("No. of lags used", self.used_lag as f64),
            ("Number of observations used", self.nobs as f64),
            ("critical value (1%)", self.critical_values.one_pct),
            ("critical value (5%)", self.critical_values.five_pct),
            ("critical value (10%)", self.critical_values.ten_pct),
        ];
        for (label, value) in rows {
            writeln!(f, "{:<30}{:>16.6}", label, value)?;
        }
        Ok(())
    }
}

/// MacKinnon approximate p-value for the constant-only ADF statistic
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > TAU_MAX_C {
        return 1.0;
    }
    if statistic < TAU_MIN_C {
        return 0.0;
    }

    let coefficients: &[f64] = if statistic <= TAU_STAR_C {
        &TAU_C_SMALLP
    } else {
        &TAU_C_LARGEP
    };
    let poly = coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, c| acc * statistic + c);
    normal_cdf(poly)
}

/// Design `[1, y_{t-1}, dy_{t-1}, ..., dy_{t-lags}]` and target `dy_t`
fn adf_design(series: &[f64], diff: &[f64], lags: usize) -> Result<(Matrix, Vec<f64>)> {
    let rows = diff.len() - lags;
    let mut columns = Vec::with_capacity(lags + 2);
    columns.push(vec![1.0; rows]);
    columns.push(series[lags..lags + rows].to_vec());
    for i in 1..=lags {
        columns.push(diff[lags - i..lags - i + rows].to_vec());
    }
    let target = diff[lags..].to_vec();
    Ok((Matrix::from_columns(&columns)?, target))
}

fn criterion(fit: &LeastSquares, autolag: Autolag) -> f64 {
    match autolag {
        Autolag::Bic => fit.bic(),
        _ => fit.aic(),
    }
}

/// Run the augmented Dickey-Fuller test with a constant term
pub fn adf_test(series: &[f64], config: &AdfConfig) -> Result<AdfReport> {
    let n = series.len();
    if series.iter().any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "Series contains missing or infinite values".to_string(),
        ));
    }
    if n < 6 {
        return Err(MathError::InsufficientData(format!(
            "ADF test needs at least 6 observations, got {}",
            n
        )));
    }

    // One deterministic term (the constant)
    let cap = n / 2 - 2;
    let default_max = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let max_lag = config.max_lag.unwrap_or(default_max).min(cap);

    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let (used_lag, ic_best) = match config.autolag {
        Autolag::Fixed(lags) => {
            if lags > cap {
                return Err(MathError::InvalidInput(format!(
                    "{} lags exceed the maximum of {} for {} observations",
                    lags, cap, n
                )));
            }
            (lags, None)
        }
        autolag => {
            let (design, target) = adf_design(series, &diff, max_lag)?;
            let mut best: Option<(f64, usize)> = None;
            for lags in 0..=max_lag {
                let fit = least_squares(&design.leading_columns(lags + 2)?, &target)?;
                let ic = criterion(&fit, autolag);
                debug!("ADF lag {}: information criterion {:.4}", lags, ic);
                if best.map_or(true, |(b, _)| ic < b) {
                    best = Some((ic, lags));
                }
            }
            let (ic, lags) = best.ok_or_else(|| {
                MathError::CalculationError("No lag order could be evaluated".to_string())
            })?;
            (lags, Some(ic))
        }
    };

    let (design, target) = adf_design(series, &diff, used_lag)?;
    let fit = least_squares(&design, &target)?;
    let statistic = fit.t_values()[1];
    if !statistic.is_finite() {
        return Err(MathError::CalculationError(
            "ADF statistic is not finite".to_string(),
        ));
    }
    let nobs = fit.nobs;

    Ok(AdfReport {
        statistic,
        p_value: mackinnon_p_value(statistic),
        used_lag,
        nobs,
        critical_values: CriticalValues::for_sample(nobs),
        ic_best,
    })
}
