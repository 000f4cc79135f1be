//! Regression fits of the daily average price against a day index

use crate::config::RegressionConfig;
use crate::error::{RegressionError, Result};
use chrono::NaiveDate;
use log::{debug, info};
use market_data::DailyOhlcv;
use price_math::regression::{
    fit_elastic_net, fit_linear, fit_polynomial, polynomial_features, vectorized_cost,
    ElasticNetParams, RegressionFit,
};

/// All fits of one price history
#[derive(Debug, Clone)]
pub struct RegressionAnalysis {
    pub dates: Vec<NaiveDate>,
    /// Zero-based day index `0..n`
    pub index: Vec<f64>,
    /// `(high + low) / 2` per session
    pub average: Vec<f64>,
    pub linear: RegressionFit,
    pub polynomial: RegressionFit,
    pub elastic_net: RegressionFit,
    /// One elastic-net fit per sweep degree, in configuration order
    pub sweep: Vec<RegressionFit>,
    /// Cost of the all-zero coefficient vector on `[1, t]`
    pub zero_cost: f64,
}

impl RegressionAnalysis {
    /// Fit every model to `bars`
    pub fn run(bars: &[DailyOhlcv], config: &RegressionConfig) -> Result<Self> {
        config.validate()?;
        if bars.len() < 2 {
            return Err(RegressionError::InsufficientData(format!(
                "Need at least 2 sessions, got {}",
                bars.len()
            )));
        }

        let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
        let index: Vec<f64> = (0..bars.len()).map(|i| i as f64).collect();
        let average: Vec<f64> = bars.iter().map(|b| b.average_price()).collect();
        if average.iter().any(|v| !v.is_finite()) {
            return Err(RegressionError::InvalidData(
                "Average price is not finite".to_string(),
            ));
        }

        let design = polynomial_features(&index, 1, true)?;
        let zero_cost = vectorized_cost(&design, &average, &[0.0, 0.0])?;
        debug!("Cost at zero coefficients: {}", zero_cost);

        let linear = fit_linear(&index, &average)?;
        info!("Linear trend coefficients: {:?}", linear.coefficients);

        let polynomial = fit_polynomial(&index, &average, config.degree)?;

        let params = elastic_params(config, config.l1_ratio)?;
        let elastic_net = fit_elastic_net(&index, &average, config.degree, params)?;

        let sweep_params = elastic_params(config, config.sweep_l1_ratio)?;
        let sweep = config
            .sweep_degrees
            .iter()
            .map(|degree| fit_elastic_net(&index, &average, *degree, sweep_params))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        info!("Fitted {} sweep degrees", sweep.len());

        Ok(Self {
            dates,
            index,
            average,
            linear,
            polynomial,
            elastic_net,
            sweep,
            zero_cost,
        })
    }
}

fn elastic_params(config: &RegressionConfig, l1_ratio: f64) -> Result<ElasticNetParams> {
    let mut params = ElasticNetParams::new(config.alpha, l1_ratio)?;
    params.max_iter = config.max_iter;
    params.tol = config.tol;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Days;

    fn bars(prices: &[f64]) -> Vec<DailyOhlcv> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| {
                DailyOhlcv::new(start + Days::new(i as u64), *p, p + 1.0, p - 1.0, *p, 100)
            })
            .collect()
    }

    #[test]
    fn test_linear_trend_recovered() {
        let prices: Vec<f64> = (0..50).map(|i| 10.0 + 0.5 * i as f64).collect();
        let analysis = RegressionAnalysis::run(&bars(&prices), &RegressionConfig::default()).unwrap();

        assert_relative_eq!(analysis.linear.coefficients[0], 10.0, epsilon = 1e-8);
        assert_relative_eq!(analysis.linear.coefficients[1], 0.5, epsilon = 1e-10);
        assert_eq!(analysis.average, prices);
        assert_eq!(analysis.sweep.len(), 5);
        assert_eq!(analysis.sweep[4].degree, 8);
        assert_eq!(analysis.elastic_net.fitted.len(), 50);
    }

    #[test]
    fn test_zero_cost() {
        // Average 2.0 everywhere: cost = n * 4 / (2n)
        let analysis =
            RegressionAnalysis::run(&bars(&[2.0; 10]), &RegressionConfig::default()).unwrap();
        assert_relative_eq!(analysis.zero_cost, 2.0);
    }

    #[test]
    fn test_single_session_rejected() {
        let result = RegressionAnalysis::run(&bars(&[5.0]), &RegressionConfig::default());
        assert!(matches!(result, Err(RegressionError::InsufficientData(_))));
    }
}
