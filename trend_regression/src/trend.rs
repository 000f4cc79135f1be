//! Multi-year performance classification
//!
//! The trailing `trading_days * years` sessions are reduced to the
//! `trading_days`-period percentage change of the close. Those changes are
//! averaged per calendar year and the yearly means are summed; a positive sum
//! means the stock is performing well.

use crate::error::{RegressionError, Result};
use chrono::Datelike;
use market_data::DailyOhlcv;
use price_math::stats::{nan_mean, pct_change};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Outcome of the classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendVerdict {
    PerformingWell,
    PerformingPoorly,
}

impl TrendVerdict {
    /// Well only for a strictly positive sum
    pub fn from_sum(sum: f64) -> Self {
        if sum > 0.0 {
            TrendVerdict::PerformingWell
        } else {
            TrendVerdict::PerformingPoorly
        }
    }
}

impl fmt::Display for TrendVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendVerdict::PerformingWell => write!(f, "The stock is performing well over time."),
            TrendVerdict::PerformingPoorly => {
                write!(f, "The stock is performing poorly over time.")
            }
        }
    }
}

/// Yearly changes and the resulting verdict
#[derive(Debug, Clone, PartialEq)]
pub struct TrendReport {
    /// Calendar year of the last session minus that of the first
    pub num_years: i32,
    /// Mean percentage change per calendar year, years without data omitted
    pub yearly: Vec<(i32, f64)>,
    pub sum: f64,
    pub verdict: TrendVerdict,
}

impl fmt::Display for TrendReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Year Regression Analysis:  {:?}", self.num_years, self.sum)?;
        writeln!(f, "{}", self.verdict)?;
        writeln!(f)
    }
}

/// Classify the multi-year trend of `bars`
///
/// `bars` must be sorted by date.
pub fn classify_trend(bars: &[DailyOhlcv], trading_days: usize) -> Result<TrendReport> {
    if trading_days == 0 {
        return Err(RegressionError::ParameterError(
            "trading_days must be at least 1".to_string(),
        ));
    }
    let (first, last) = match (bars.first(), bars.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(RegressionError::InsufficientData(
                "No sessions to classify".to_string(),
            ))
        }
    };
    if bars.windows(2).any(|w| w[0].date >= w[1].date) {
        return Err(RegressionError::InvalidData(
            "Sessions must be sorted by strictly increasing date".to_string(),
        ));
    }

    let num_years = last.date.year() - first.date.year();
    let keep = (num_years.max(0) as usize).saturating_mul(trading_days);
    let recent = &bars[bars.len().saturating_sub(keep)..];

    let closes: Vec<f64> = recent.iter().map(|b| b.data.close).collect();
    let changes = pct_change(&closes, trading_days);

    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for (bar, change) in recent.iter().zip(changes) {
        by_year
            .entry(bar.date.year())
            .or_default()
            .push(change.unwrap_or(f64::NAN));
    }

    let yearly: Vec<(i32, f64)> = by_year
        .into_iter()
        .map(|(year, values)| (year, nan_mean(&values)))
        .filter(|(_, mean)| !mean.is_nan())
        .collect();
    let sum = yearly.iter().fold(0.0, |acc, (_, mean)| acc + mean);

    Ok(TrendReport {
        num_years,
        yearly,
        sum,
        verdict: TrendVerdict::from_sum(sum),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Days, NaiveDate};
    use rstest::rstest;

    fn series(days: usize, price: impl Fn(usize) -> f64) -> Vec<DailyOhlcv> {
        let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        (0..days)
            .map(|i| {
                let p = price(i);
                DailyOhlcv::new(start + Days::new(i as u64), p, p, p, p, 0)
            })
            .collect()
    }

    #[rstest]
    #[case::rising(|i: usize| 100.0 + i as f64, TrendVerdict::PerformingWell)]
    #[case::declining(|i: usize| 2000.0 - i as f64, TrendVerdict::PerformingPoorly)]
    #[case::flat(|_: usize| 50.0, TrendVerdict::PerformingPoorly)]
    fn test_verdicts(#[case] price: fn(usize) -> f64, #[case] expected: TrendVerdict) {
        // Calendar days 2018-01-01 onward; three calendar years apart
        let bars = series(1200, price);
        let report = classify_trend(&bars, 252).unwrap();

        assert_eq!(report.num_years, 3);
        assert_eq!(report.verdict, expected);
        if expected == TrendVerdict::PerformingWell {
            assert!(report.sum > 0.0);
        }
    }

    #[test]
    fn test_yearly_means() {
        // Constant growth: every 2-session change is 1.001^2 - 1
        let bars = series(800, |i| 1.001f64.powi(i as i32));
        let report = classify_trend(&bars, 2).unwrap();

        // Two years back keeps the last 4 sessions, all in 2020
        assert_eq!(report.num_years, 2);
        assert_eq!(report.yearly.len(), 1);
        assert_eq!(report.yearly[0].0, 2020);
        assert_relative_eq!(report.sum, 1.001f64.powi(2) - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_within_one_year_is_poor() {
        let bars = series(100, |i| 10.0 + i as f64);
        let report = classify_trend(&bars, 252).unwrap();

        assert_eq!(report.num_years, 0);
        assert!(report.yearly.is_empty());
        assert_eq!(report.sum, 0.0);
        assert_eq!(report.verdict, TrendVerdict::PerformingPoorly);
    }

    #[test]
    fn test_report_lines() {
        let report = TrendReport {
            num_years: 5,
            yearly: vec![(2023, 0.25)],
            sum: 0.25,
            verdict: TrendVerdict::PerformingWell,
        };
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "5 Year Regression Analysis:  0.25");
        assert_eq!(lines[1], "The stock is performing well over time.");
        assert_eq!(lines[2], "");
        assert!(text.ends_with("over time.\n\n"));
    }

    #[test]
    fn test_empty_and_unsorted() {
        assert!(classify_trend(&[], 252).is_err());
        let mut bars = series(3, |_| 1.0);
        bars.swap(0, 2);
        assert!(classify_trend(&bars, 252).is_err());
    }
}
