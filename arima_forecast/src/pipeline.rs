//! End-to-end forecast run
//!
//! Prices are resampled to calendar days, checked for stationarity,
//! decomposed and log-transformed. An automatic order search runs on the
//! training prefix for reference; the configured order is the one fitted and
//! evaluated on the held-out tail.

use crate::config::ForecastConfig;
use crate::data::{PriceFrame, RollingStats};
use crate::error::{ForecastError, Result};
use crate::metrics::ForecastMetrics;
use crate::models::arima::{Arima, FittedArima};
use crate::models::auto_arima::{auto_arima, AutoArimaResult};
use crate::models::ForecastModel;
use log::{info, warn};
use market_data::{load_daily_csv, DailyOhlcv, YahooFinance};
use price_math::decomposition::{seasonal_decompose, Decomposition};
use price_math::stationarity::{adf_test, AdfReport};
use price_math::stats::gaussian_kde;
use std::io::Write;
use std::path::PathBuf;

/// Where the price history comes from
#[derive(Debug, Clone, PartialEq)]
pub enum PriceSource {
    /// Full daily history from Yahoo Finance
    Ticker(String),
    /// A local CSV file with at least `Date` and `Close` columns
    Csv(PathBuf),
}

impl PriceSource {
    /// Name used in titles: the ticker or the file stem
    pub fn label(&self) -> String {
        match self {
            PriceSource::Ticker(symbol) => symbol.trim().to_string(),
            PriceSource::Csv(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }

    pub fn load(&self) -> Result<Vec<DailyOhlcv>> {
        let bars = match self {
            PriceSource::Ticker(symbol) => YahooFinance::new().fetch_daily_max(symbol)?,
            PriceSource::Csv(path) => load_daily_csv(path)?,
        };
        info!("Loaded {} sessions for {}", bars.len(), self.label());
        Ok(bars)
    }
}

/// Everything computed during a run
#[derive(Debug, Clone)]
pub struct ForecastReport {
    pub label: String,
    /// Calendar-daily closes, forward-filled
    pub closes: PriceFrame,
    pub close_rolling: RollingStats,
    /// Density estimate of the closes as `(price, density)`
    pub kde: Vec<(f64, f64)>,
    pub adf: AdfReport,
    pub decomposition: Decomposition,
    pub log_closes: PriceFrame,
    pub log_rolling: RollingStats,
    /// Log closes used for estimation
    pub train: PriceFrame,
    /// Held-out log closes
    pub test: PriceFrame,
    pub auto: AutoArimaResult,
    pub fitted: FittedArima,
    /// Forecast in price units on the test dates
    pub forecast: PriceFrame,
    /// Prediction intervals in price units
    pub intervals: Vec<(f64, f64)>,
    pub metrics: ForecastMetrics,
}

/// Run the forecast on `bars`, writing the console report to `out`
pub fn run_forecast<W: Write>(
    label: &str,
    bars: &[DailyOhlcv],
    config: &ForecastConfig,
    out: &mut W,
) -> Result<ForecastReport> {
    config.validate()?;

    let closes = PriceFrame::calendar_closes(bars)?;
    info!(
        "{}: {} calendar days from {} sessions",
        label,
        closes.len(),
        bars.len()
    );

    let kde = gaussian_kde(closes.values(), config.kde_points)?;

    writeln!(out, "before stationary test")?;
    let close_rolling = closes.rolling(config.rolling_window)?;
    writeln!(out, "Results of dickey fuller test")?;
    let adf = adf_test(closes.values(), &config.adf)?;
    writeln!(out, "{}", adf)?;
    writeln!(out, "after stationary test")?;

    let decomposition = seasonal_decompose(
        closes.values(),
        config.decomposition_model,
        config.decomposition_period,
    )?;

    let log_closes = closes.log_transform()?;
    let log_rolling = log_closes.rolling(config.rolling_window)?;

    let (train, test) = log_closes.train_test_split(config.skip_rows, config.train_ratio)?;
    info!("Training on {} rows, testing on {}", train.len(), test.len());

    let auto = auto_arima(train.values(), &config.auto)?;
    writeln!(out, "{}", auto.trace())?;
    writeln!(out, "{}", auto.model)?;

    if auto.spec != config.order {
        warn!(
            "Automatic selection chose {} but the forecast uses the configured {}",
            auto.spec, config.order
        );
    }

    let fitted = Arima::new(config.order).fit(train.values())?;
    writeln!(out, "{}", fitted)?;

    let predicted = fitted.forecast_with_intervals(test.len(), config.interval_alpha)?;
    let metrics = ForecastMetrics::evaluate(test.values(), predicted.values())?;
    writeln!(out, "{}", metrics)?;

    let in_prices = predicted.map(f64::exp);
    let forecast = PriceFrame::new(test.dates().to_vec(), in_prices.values().to_vec())?;
    let intervals = in_prices
        .intervals()
        .map(|iv| iv.to_vec())
        .ok_or_else(|| ForecastError::ForecastingError("Forecast has no intervals".to_string()))?;

    Ok(ForecastReport {
        label: label.to_string(),
        closes,
        close_rolling,
        kde,
        adf,
        decomposition,
        log_closes,
        log_rolling,
        train,
        test,
        auto,
        fitted,
        forecast,
        intervals,
        metrics,
    })
}
