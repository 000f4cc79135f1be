//! # Stock Insight
//!
//! Umbrella crate for the price analysis workspace.
//!
//! - [`market_data`]: daily bars from CSV files or Yahoo Finance
//! - [`price_math`]: least squares, elastic net, ADF test, decomposition
//! - [`arima_forecast`]: ARIMA forecast of closing prices with error metrics
//! - [`trend_regression`]: trend fits and the multi-year performance verdict
//!
//! ## Example
//!
//! ```
//! use stock_insight::market_data::generator::generate_daily_data;
//! use stock_insight::trend_regression::{run_on_bars, RegressionConfig};
//!
//! let bars = generate_daily_data(300, 100.0, 0.001, 0.01, 1);
//! let mut out = Vec::new();
//! let report = run_on_bars("DEMO", &bars, &RegressionConfig::default(), &mut out).unwrap();
//! assert_eq!(report.analysis.average.len(), 300);
//! ```

pub use arima_forecast;
pub use market_data;
pub use price_math;
pub use trend_regression;

/// Version of the umbrella crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crates_are_reachable() {
        assert!(!VERSION.is_empty());
        assert_eq!(price_math::stats::mean(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(trend_regression::RegressionConfig::default().degree, 4);
        assert_eq!(arima_forecast::ForecastConfig::default().rolling_window, 12);
    }
}
