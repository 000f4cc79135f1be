//! # Trend Regression
//!
//! `trend_regression` fits straight-line, polynomial and elastic-net trends
//! to the daily average price of a stock and classifies its multi-year
//! performance from year-over-year changes of the close.
//!
//! ## Usage Example
//!
//! ```no_run
//! use trend_regression::{run, RegressionConfig, TrendVerdict};
//!
//! let mut out = std::io::stdout();
//! let report = run("data/AAPL.csv", &RegressionConfig::default(), &mut out)?;
//!
//! if report.trend.verdict == TrendVerdict::PerformingWell {
//!     println!("Degree 4 coefficients: {:?}", report.analysis.polynomial.coefficients);
//! }
//! # Ok::<(), trend_regression::RegressionError>(())
//! ```

pub mod analysis;
#[cfg(feature = "plot")]
pub mod chart;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod trend;

pub use analysis::RegressionAnalysis;
pub use config::RegressionConfig;
pub use error::{RegressionError, Result};
pub use pipeline::{dataset_label, run, run_on_bars, RegressionReport};
pub use trend::{classify_trend, TrendReport, TrendVerdict};
