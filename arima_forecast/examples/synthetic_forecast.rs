//! Forecast a generated price series without touching the network
//!
//! Run with `cargo run -p arima_forecast --example synthetic_forecast`.

use arima_forecast::{run_forecast, ForecastConfig, Result};
use market_data::generator::generate_daily_data;

fn main() -> Result<()> {
    env_logger::init();

    // Six years of weekday sessions with a slight upward drift
    let bars = generate_daily_data(1500, 100.0, 0.0004, 0.02, 42);

    let config = ForecastConfig::default();
    let mut out = std::io::stdout();
    let report = run_forecast("SYNTH", &bars, &config, &mut out)?;

    println!();
    println!("Automatic selection: {}", report.auto.spec);
    println!("Forecast model:      {}", report.fitted.spec());
    if let (Some(first), Some(last)) = (report.forecast.values().first(), report.forecast.values().last()) {
        println!(
            "Forecast runs from {:.2} to {:.2} over {} days",
            first,
            last,
            report.forecast.len()
        );
    }

    Ok(())
}
