//! Date-indexed price series used by the forecast pipeline

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use market_data::{forward_fill, to_calendar_daily, DailyOhlcv};
use price_math::stats::{rolling_mean, rolling_std};

/// A single price column indexed by date
#[derive(Debug, Clone, PartialEq)]
pub struct PriceFrame {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

/// Trailing mean and standard deviation of a frame
#[derive(Debug, Clone, PartialEq)]
pub struct RollingStats {
    pub window: usize,
    pub mean: Vec<Option<f64>>,
    pub std: Vec<Option<f64>>,
}

impl PriceFrame {
    /// Create a frame from aligned dates and values
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::ValidationError(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ForecastError::ValidationError(
                "Dates must be strictly increasing".to_string(),
            ));
        }

        Ok(Self { dates, values })
    }

    /// Closing prices on every calendar day, gaps forward-filled
    pub fn calendar_closes(bars: &[DailyOhlcv]) -> Result<Self> {
        let calendar = to_calendar_daily(bars)?;
        if calendar.is_empty() {
            return Err(ForecastError::ValidationError(
                "No price data to build a series from".to_string(),
            ));
        }

        let closes: Vec<Option<f64>> = calendar.iter().map(|(_, s)| s.map(|d| d.close)).collect();
        let filled = forward_fill(&closes);
        let dates = calendar.into_iter().map(|(date, _)| date).collect();
        let values = filled
            .into_iter()
            .map(|v| {
                v.ok_or_else(|| {
                    ForecastError::ValidationError("Series starts without a price".to_string())
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        Self::new(dates, values)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Natural logarithm of every value
    pub fn log_transform(&self) -> Result<Self> {
        if let Some(i) = self.values.iter().position(|v| *v <= 0.0 || !v.is_finite()) {
            return Err(ForecastError::ValidationError(format!(
                "Cannot take the log of {} on {}",
                self.values[i], self.dates[i]
            )));
        }

        Ok(Self {
            dates: self.dates.clone(),
            values: self.values.iter().map(|v| v.ln()).collect(),
        })
    }

    /// Exponential of every value
    pub fn exp_transform(&self) -> Self {
        Self {
            dates: self.dates.clone(),
            values: self.values.iter().map(|v| v.exp()).collect(),
        }
    }

    /// Rolling mean and sample standard deviation
    pub fn rolling(&self, window: usize) -> Result<RollingStats> {
        Ok(RollingStats {
            window,
            mean: rolling_mean(&self.values, window)?,
            std: rolling_std(&self.values, window)?,
        })
    }

    /// Rows `start..end`
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.len());
        let start = start.min(end);
        Self {
            dates: self.dates[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
        }
    }

    /// Split into training rows `skip..floor(n * ratio)` and test rows after
    pub fn train_test_split(&self, skip: usize, ratio: f64) -> Result<(Self, Self)> {
        if ratio.is_nan() || ratio <= 0.0 || ratio >= 1.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Train ratio must be between 0 and 1, got {}",
                ratio
            )));
        }

        let split = (self.len() as f64 * ratio).floor() as usize;
        if skip >= split {
            return Err(ForecastError::ValidationError(format!(
                "Training set is empty: {} rows skipped of {} before the split",
                skip, split
            )));
        }
        if split >= self.len() {
            return Err(ForecastError::ValidationError(
                "Test set is empty".to_string(),
            ));
        }

        Ok((self.slice(skip, split), self.slice(split, self.len())))
    }
}
