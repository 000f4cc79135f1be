//! Load a CSV, fit the trend models and classify performance

use crate::analysis::RegressionAnalysis;
use crate::config::RegressionConfig;
use crate::error::Result;
use crate::trend::{classify_trend, TrendReport};
use log::info;
use market_data::{load_daily_csv, DailyOhlcv};
use std::io::Write;
use std::path::Path;

/// Fits and verdict of one price history
#[derive(Debug, Clone)]
pub struct RegressionReport {
    /// File stem of the input, used in chart titles
    pub label: String,
    pub analysis: RegressionAnalysis,
    pub trend: TrendReport,
}

/// Name of a dataset: the file name without directory or extension
pub fn dataset_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Analyse sessions that are already loaded
pub fn run_on_bars<W: Write>(
    label: &str,
    bars: &[DailyOhlcv],
    config: &RegressionConfig,
    out: &mut W,
) -> Result<RegressionReport> {
    let analysis = RegressionAnalysis::run(bars, config)?;
    let trend = classify_trend(bars, config.trading_days)?;
    info!("{}: {:?} over {} years", label, trend.verdict, trend.num_years);

    write!(out, "{}", trend)?;

    Ok(RegressionReport {
        label: label.to_string(),
        analysis,
        trend,
    })
}

/// Analyse the daily CSV at `path`
pub fn run<P: AsRef<Path>, W: Write>(
    path: P,
    config: &RegressionConfig,
    out: &mut W,
) -> Result<RegressionReport> {
    let path = path.as_ref();
    let bars = load_daily_csv(path)?;
    info!("Loaded {} sessions from {}", bars.len(), path.display());
    run_on_bars(&dataset_label(path), &bars, config, out)
}
