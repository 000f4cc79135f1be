//! # ARIMA Forecast
//!
//! Forecasts daily closing prices with an ARIMA model fitted to log prices and
//! reports how far the forecast lands from the held-out tail of the series.
//!
//! ## Features
//!
//! - Calendar-daily price frames with forward fill and log transforms
//! - Augmented Dickey-Fuller diagnostics and multiplicative decomposition
//! - ARIMA(p, d, q) estimation by conditional sum of squares
//! - Stepwise automatic order selection
//! - MSE, MAE, RMSE and MAPE evaluation
//! - Optional PNG charts (`plot` feature)
//!
//! ## Quick Start
//!
//! ```no_run
//! use arima_forecast::config::ForecastConfig;
//! use arima_forecast::pipeline::run_forecast;
//! use market_data::generator::generate_daily_data;
//!
//! let bars = generate_daily_data(1500, 100.0, 0.0004, 0.02, 42);
//! let mut out = std::io::stdout();
//! let report = run_forecast("SYNTH", &bars, &ForecastConfig::default(), &mut out)?;
//! println!("RMSE in log space: {}", report.metrics.rmse);
//! # Ok::<(), arima_forecast::ForecastError>(())
//! ```

#[cfg(feature = "plot")]
pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;

// Re-export commonly used types
pub use crate::config::ForecastConfig;
pub use crate::data::PriceFrame;
pub use crate::error::{ForecastError, Result};
pub use crate::metrics::ForecastMetrics;
pub use crate::models::arima::{Arima, ArimaSpec, FittedArima};
pub use crate::models::auto_arima::{auto_arima, AutoArimaConfig, AutoArimaResult};
pub use crate::models::{FittedModel, ForecastModel, ForecastResult};
pub use crate::pipeline::{run_forecast, ForecastReport, PriceSource};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
