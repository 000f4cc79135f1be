//! # Market Data
//!
//! `market_data` supplies the daily OHLCV (Open, High, Low, Close, Volume)
//! series consumed by the forecasting and regression pipelines.
//!
//! ## Sources
//!
//! - **CSV files** with a header row (`Date`, `High`, `Low`, `Close`, and
//!   optionally `Open` and `Volume`)
//! - **Yahoo Finance** chart history for a ticker symbol
//! - **Synthetic data** from a seeded random walk, for demos and tests
//!
//! ## Usage Example
//!
//! ```no_run
//! use market_data::{generator::generate_daily_data, resample::to_calendar_daily};
//!
//! let bars = generate_daily_data(500, 100.0, 0.0005, 0.02, 42);
//! let calendar = to_calendar_daily(&bars).unwrap();
//! println!("{} trading days over {} calendar days", bars.len(), calendar.len());
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod generator;
pub mod loader;
pub mod resample;
pub mod yahoo;

pub use loader::{load_daily_csv, read_daily_csv, write_daily_csv};
pub use resample::{forward_fill, to_calendar_daily};
pub use yahoo::YahooFinance;

/// Errors that can occur while obtaining price data
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Parse error at row {row}: {message}")]
    Parse { row: usize, message: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error [{code}]: {description}")]
    Api { code: String, description: String },

    #[error("No data returned for {0}")]
    NoData(String),
}

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Prices and volume of one trading session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcvData {
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume
    pub volume: u64,
}

impl OhlcvData {
    /// Midpoint of the session range, `(high + low) / 2`
    pub fn average_price(&self) -> f64 {
        (self.high + self.low) / 2.0
    }
}

/// Daily OHLCV data with a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyOhlcv {
    /// Date of the data point
    pub date: NaiveDate,
    /// OHLCV data
    pub data: OhlcvData,
}

impl DailyOhlcv {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            data: OhlcvData {
                open,
                high,
                low,
                close,
                volume,
            },
        }
    }

    /// Average of the day's high and low
    pub fn average_price(&self) -> f64 {
        self.data.average_price()
    }
}

/// Closing prices in series order
pub fn closes(bars: &[DailyOhlcv]) -> Vec<f64> {
    bars.iter().map(|b| b.data.close).collect()
}

/// Dates in series order
pub fn dates(bars: &[DailyOhlcv]) -> Vec<NaiveDate> {
    bars.iter().map(|b| b.date).collect()
}

/// Sort by date and reject repeated dates
pub fn sort_and_validate(bars: &mut [DailyOhlcv]) -> Result<()> {
    bars.sort_by_key(|b| b.date);
    if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(DataError::InvalidData(format!(
            "Duplicate date {}",
            pair[0].date
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_data() -> Vec<DailyOhlcv> {
        vec![
            DailyOhlcv::new(
                NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
                102.0,
                106.0,
                101.0,
                105.0,
                1200,
            ),
            DailyOhlcv::new(
                NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
                100.0,
                105.0,
                99.0,
                102.0,
                1000,
            ),
        ]
    }

    #[test]
    fn test_average_price() {
        let data = create_test_data();
        assert_eq!(data[0].average_price(), 103.5);
        assert_eq!(data[1].data.average_price(), 102.0);
    }

    #[test]
    fn test_sort_and_validate() {
        let mut data = create_test_data();
        sort_and_validate(&mut data).unwrap();
        assert_eq!(closes(&data), vec![102.0, 105.0]);
        assert!(dates(&data)[0] < dates(&data)[1]);

        let mut duplicated = vec![data[0].clone(), data[0].clone()];
        assert!(matches!(
            sort_and_validate(&mut duplicated),
            Err(DataError::InvalidData(_))
        ));
    }

    #[test]
    fn test_error_display() {
        let err = DataError::Api {
            code: "Not Found".to_string(),
            description: "No data found, symbol may be delisted".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error [Not Found]: No data found, symbol may be delisted"
        );
        assert_eq!(
            DataError::MissingColumn("High".to_string()).to_string(),
            "Missing column: High"
        );
    }
}
