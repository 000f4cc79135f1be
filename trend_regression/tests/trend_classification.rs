use chrono::{Days, NaiveDate};
use market_data::{write_daily_csv, DailyOhlcv};
use std::fs::File;
use std::io::Write;
use tempfile::TempDir;
use trend_regression::{run, RegressionConfig, RegressionError, TrendVerdict};

// Helper: one session per calendar day starting 2015-01-01
fn sessions(days: usize, close: impl Fn(usize) -> f64) -> Vec<DailyOhlcv> {
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    (0..days)
        .map(|i| {
            let c = close(i);
            DailyOhlcv::new(start + Days::new(i as u64), c, c * 1.01, c * 0.99, c, 1_000)
        })
        .collect()
}

fn analyse(name: &str, bars: &[DailyOhlcv]) -> (String, trend_regression::RegressionReport) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(format!("{}.csv", name));
    write_daily_csv(File::create(&path).unwrap(), bars).unwrap();

    let mut out = Vec::new();
    let report = run(&path, &RegressionConfig::default(), &mut out).unwrap();
    (String::from_utf8(out).unwrap(), report)
}

#[test]
fn test_rising_prices_perform_well() {
    let bars = sessions(2000, |i| 20.0 + 0.05 * i as f64);
    let (text, report) = analyse("RISE", &bars);

    assert_eq!(report.label, "RISE");
    assert_eq!(report.trend.num_years, 5);
    assert!(report.trend.sum > 0.0);
    assert_eq!(report.trend.verdict, TrendVerdict::PerformingWell);
    assert!(text.starts_with("5 Year Regression Analysis:  "));
    assert!(text.ends_with("The stock is performing well over time.\n\n"));

    // Straight-line fit of a straight line
    let linear = &report.analysis.linear;
    assert!((linear.coefficients[1] - 0.05).abs() < 1e-6);
}

#[test]
fn test_declining_prices_perform_poorly() {
    let bars = sessions(2000, |i| 200.0 - 0.05 * i as f64);
    let (text, report) = analyse("FALL", &bars);

    assert!(report.trend.sum < 0.0);
    assert_eq!(report.trend.verdict, TrendVerdict::PerformingPoorly);
    assert!(text.contains("The stock is performing poorly over time."));
}

#[test]
fn test_flat_prices_perform_poorly() {
    let bars = sessions(1500, |_| 42.0);
    let (_, report) = analyse("FLAT", &bars);

    assert_eq!(report.trend.sum, 0.0);
    assert_eq!(report.trend.verdict, TrendVerdict::PerformingPoorly);
}

#[test]
fn test_fits_cover_every_session() {
    let bars = sessions(400, |i| 50.0 + (i as f64 / 30.0).sin());
    let (_, report) = analyse("WAVE", &bars);
    let analysis = &report.analysis;

    assert_eq!(analysis.polynomial.fitted.len(), 400);
    assert_eq!(analysis.elastic_net.fitted.len(), 400);
    let degrees: Vec<usize> = analysis.sweep.iter().map(|f| f.degree).collect();
    assert_eq!(degrees, vec![2, 3, 4, 6, 8]);
}

#[test]
fn test_missing_column_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.csv");
    let mut file = File::create(&path).unwrap();
    writeln!(file, "Date,High,Close").unwrap();
    writeln!(file, "2020-01-02,10.0,9.5").unwrap();

    let mut out = Vec::new();
    let result = run(&path, &RegressionConfig::default(), &mut out);
    assert!(matches!(result, Err(RegressionError::DataLoadError(_))));
    assert!(out.is_empty());
}
