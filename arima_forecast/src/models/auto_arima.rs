//! Automatic non-seasonal ARIMA order selection
//!
//! The differencing order comes from repeated augmented Dickey-Fuller tests.
//! AR and MA orders are then chosen by a stepwise search that starts from a
//! handful of small models and walks to neighbouring orders while AIC
//! improves.

use super::arima::{Arima, ArimaSpec, FittedArima};
use super::{difference, FittedModel, ForecastModel};
use crate::error::{ForecastError, Result};
use log::{debug, info, warn};
use price_math::stationarity::{adf_test, AdfConfig, Autolag};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

/// Configuration for the stepwise search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoArimaConfig {
    /// Starting AR order
    pub start_p: usize,
    /// Starting MA order
    pub start_q: usize,
    /// Maximum AR order
    pub max_p: usize,
    /// Maximum MA order
    pub max_q: usize,
    /// Maximum differencing order
    pub max_d: usize,
    /// Maximum `p + q`
    pub max_order: usize,
    /// Significance level of the unit root tests
    pub test_alpha: f64,
    /// Stop after this many model fits
    pub max_fits: usize,
}

impl Default for AutoArimaConfig {
    fn default() -> Self {
        Self {
            start_p: 0,
            start_q: 0,
            max_p: 3,
            max_q: 3,
            max_d: 2,
            max_order: 5,
            test_alpha: 0.05,
            max_fits: 100,
        }
    }
}

/// One model visited by the search
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub spec: ArimaSpec,
    pub with_intercept: bool,
    /// `None` when the fit failed
    pub aic: Option<f64>,
    pub elapsed: Duration,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = format!(
            "{}(0,0,0)[0]{}",
            self.spec,
            if self.with_intercept { " intercept" } else { "" }
        );
        let aic = self.aic.unwrap_or(f64::INFINITY);
        write!(
            f,
            " {:<36}: AIC={:.3}, Time={:.2} sec",
            label,
            aic,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Outcome of the automatic selection
#[derive(Debug, Clone)]
pub struct AutoArimaResult {
    /// Selected orders
    pub spec: ArimaSpec,
    /// Whether the selected model estimates a mean/drift
    pub with_intercept: bool,
    /// AIC of the selected model
    pub aic: f64,
    /// The selected model, fitted
    pub model: FittedArima,
    /// Every model tried, in order
    pub tried: Vec<Candidate>,
    /// Wall time of the whole search
    pub elapsed: Duration,
}

impl AutoArimaResult {
    /// Trace lines as printed during the search
    pub fn trace(&self) -> String {
        let mut lines: Vec<String> = self.tried.iter().map(|c| c.to_string()).collect();
        lines.push(String::new());
        lines.push(format!(
            "Best model:  {}(0,0,0)[0]{}",
            self.spec,
            if self.with_intercept { " intercept" } else { "" }
        ));
        lines.push(format!(
            "Total fit time: {:.3} seconds",
            self.elapsed.as_secs_f64()
        ));
        lines.join("\n")
    }
}

/// Differencing order at which the ADF test rejects a unit root
///
/// Each test uses `floor((n - 1)^(1/3))` lags. Differencing stops at
/// `max_d`, or earlier if the series becomes too short to test.
pub fn select_differencing(series: &[f64], max_d: usize, alpha: f64) -> Result<usize> {
    let mut d = 0;
    while d < max_d {
        let x = difference(series, d);
        let lags = ((x.len() as f64 - 1.0).max(0.0)).cbrt().trunc() as usize;
        let config = AdfConfig {
            max_lag: None,
            autolag: Autolag::Fixed(lags),
        };
        let report = match adf_test(&x, &config) {
            Ok(report) => report,
            Err(e) => {
                warn!("Unit root test at d = {} failed: {}", d, e);
                break;
            }
        };
        debug!("ADF at d = {}: p-value {:.4}", d, report.p_value);
        if report.p_value < alpha {
            break;
        }
        d += 1;
    }
    Ok(d)
}

struct Search<'a> {
    series: &'a [f64],
    d: usize,
    config: &'a AutoArimaConfig,
    visited: HashSet<(usize, usize, bool)>,
    tried: Vec<Candidate>,
    best: Option<(f64, FittedArima, bool)>,
}

impl<'a> Search<'a> {
    fn allowed(&self, p: usize, q: usize, intercept: bool) -> bool {
        p <= self.config.max_p
            && q <= self.config.max_q
            && p + q <= self.config.max_order
            && (!intercept || self.d <= 1)
    }

    /// Fit one candidate; true when it became the new best
    fn try_model(&mut self, p: usize, q: usize, intercept: bool) -> bool {
        if !self.allowed(p, q, intercept)
            || !self.visited.insert((p, q, intercept))
            || self.tried.len() >= self.config.max_fits
        {
            return false;
        }

        let spec = ArimaSpec::new(p, self.d, q);
        let start = Instant::now();
        let fitted = Arima::new(spec).with_intercept(intercept).fit(self.series);
        let elapsed = start.elapsed();

        let aic = match fitted {
            Ok(model) => {
                let aic = model.aic();
                let improved = self.best.as_ref().map_or(true, |(b, _, _)| aic < *b);
                if improved {
                    self.best = Some((aic, model, intercept));
                }
                self.tried.push(Candidate {
                    spec,
                    with_intercept: intercept,
                    aic: Some(aic),
                    elapsed,
                });
                debug!("{}", self.tried[self.tried.len() - 1]);
                return improved;
            }
            Err(e) => {
                warn!("{} failed to fit: {}", spec, e);
                None
            }
        };

        self.tried.push(Candidate {
            spec,
            with_intercept: intercept,
            aic,
            elapsed,
        });
        false
    }
}

/// Select and fit an ARIMA model by stepwise AIC search
pub fn auto_arima(series: &[f64], config: &AutoArimaConfig) -> Result<AutoArimaResult> {
    if series.len() < 10 {
        return Err(ForecastError::ValidationError(format!(
            "Automatic ARIMA needs at least 10 observations, got {}",
            series.len()
        )));
    }
    if config.max_fits == 0 {
        return Err(ForecastError::InvalidParameter(
            "max_fits must be at least 1".to_string(),
        ));
    }

    let started = Instant::now();
    let d = select_differencing(series, config.max_d, config.test_alpha)?;
    info!("Selected differencing order d = {}", d);

    let mut search = Search {
        series,
        d,
        config,
        visited: HashSet::new(),
        tried: Vec::new(),
        best: None,
    };

    let with_constant = d <= 1;
    search.try_model(config.start_p, config.start_q, with_constant);
    search.try_model(0, 0, with_constant);
    search.try_model(1, 0, with_constant);
    search.try_model(0, 1, with_constant);
    search.try_model(0, 0, false);

    loop {
        let (p, q, intercept) = match &search.best {
            Some((_, model, intercept)) => (model.spec().p, model.spec().q, *intercept),
            None => break,
        };

        let mut moves: Vec<(isize, isize, bool)> = vec![
            (-1, 0, intercept),
            (1, 0, intercept),
            (0, -1, intercept),
            (0, 1, intercept),
            (-1, -1, intercept),
            (1, 1, intercept),
            (-1, 1, intercept),
            (1, -1, intercept),
        ];
        if d <= 1 {
            moves.push((0, 0, !intercept));
        }

        let improved = moves.into_iter().any(|(dp, dq, c)| {
            let np = p as isize + dp;
            let nq = q as isize + dq;
            np >= 0 && nq >= 0 && search.try_model(np as usize, nq as usize, c)
        });

        if !improved || search.tried.len() >= config.max_fits {
            break;
        }
    }

    let tried = search.tried;
    let (aic, model, with_intercept) = search.best.ok_or_else(|| {
        ForecastError::ForecastingError("No candidate ARIMA model could be fitted".to_string())
    })?;

    Ok(AutoArimaResult {
        spec: model.spec(),
        with_intercept,
        aic,
        model,
        tried,
        elapsed: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(n: usize, mut state: u64) -> Vec<f64> {
        (0..n)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
            })
            .collect()
    }

    fn random_walk(n: usize, seed: u64) -> Vec<f64> {
        noise(n, seed)
            .iter()
            .scan(50.0, |level, e| {
                *level += e;
                Some(*level)
            })
            .collect()
    }

    #[test]
    fn test_differencing_selected_for_random_walk() {
        let walk = random_walk(600, 41);
        let d = select_differencing(&walk, 2, 0.05).unwrap();
        assert!(d >= 1);

        let white = noise(600, 43);
        assert_eq!(select_differencing(&white, 2, 0.05).unwrap(), 0);
    }

    #[test]
    fn test_search_respects_bounds_and_records_trace() {
        let series = random_walk(400, 7);
        let config = AutoArimaConfig::default();
        let result = auto_arima(&series, &config).unwrap();

        assert!(result.spec.p <= config.max_p && result.spec.q <= config.max_q);
        assert!(result.spec.p + result.spec.q <= config.max_order);
        assert!(!result.tried.is_empty() && result.tried.len() <= config.max_fits);

        let best = result
            .tried
            .iter()
            .filter_map(|c| c.aic)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(result.aic, best);

        let trace = result.trace();
        assert!(trace.contains("(0,0,0)[0]"));
        assert!(trace.contains("Best model:"));
    }

    #[test]
    fn test_no_intercept_when_twice_differenced() {
        let series: Vec<f64> = noise(300, 3)
            .iter()
            .enumerate()
            .map(|(t, e)| 0.01 * (t * t) as f64 + e)
            .collect();
        let config = AutoArimaConfig {
            max_fits: 12,
            ..AutoArimaConfig::default()
        };
        let result = auto_arima(&series, &config).unwrap();
        if result.spec.d == 2 {
            assert!(result.tried.iter().all(|c| !c.with_intercept));
        }
        assert!(result.tried.len() <= 12);
    }

    #[test]
    fn test_candidate_display() {
        let candidate = Candidate {
            spec: ArimaSpec::new(1, 1, 2),
            with_intercept: true,
            aic: Some(-1234.5678),
            elapsed: Duration::from_millis(250),
        };
        let line = candidate.to_string();
        assert!(line.starts_with(" ARIMA(1,1,2)(0,0,0)[0] intercept"));
        assert!(line.ends_with(": AIC=-1234.568, Time=0.25 sec"));
    }

    #[test]
    fn test_rejects_short_series() {
        assert!(auto_arima(&[1.0, 2.0, 3.0], &AutoArimaConfig::default()).is_err());
    }
}
