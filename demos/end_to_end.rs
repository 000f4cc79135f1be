//! Both analyses on one generated history
//!
//! Run with `cargo run --example end_to_end`.

use stock_insight::arima_forecast::{run_forecast, ForecastConfig};
use stock_insight::market_data::generator::generate_daily_data;
use stock_insight::trend_regression::{run_on_bars, RegressionConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let bars = generate_daily_data(1800, 60.0, 0.0005, 0.018, 2024);
    let mut out = std::io::stdout();

    println!("=== Trend regression ===");
    let trend = run_on_bars("DEMO", &bars, &RegressionConfig::default(), &mut out)?;
    println!(
        "Linear fit: {:.4} + {:.6} t",
        trend.analysis.linear.coefficients[0], trend.analysis.linear.coefficients[1]
    );

    println!("=== ARIMA forecast ===");
    let forecast = run_forecast("DEMO", &bars, &ForecastConfig::default(), &mut out)?;
    println!(
        "Held-out days: {}, MAPE {:.2}%",
        forecast.test.len(),
        forecast.metrics.mape * 100.0
    );

    Ok(())
}
