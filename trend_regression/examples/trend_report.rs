//! Classify a generated price history
//!
//! Run with `cargo run -p trend_regression --example trend_report`.

use market_data::generator::generate_daily_data;
use trend_regression::{run_on_bars, RegressionConfig, Result};

fn main() -> Result<()> {
    env_logger::init();

    let config = RegressionConfig::default();
    let mut out = std::io::stdout();

    for (label, drift) in [("RISING", 0.0008), ("FALLING", -0.0008)] {
        // Five years of weekday sessions
        let bars = generate_daily_data(1300, 100.0, drift, 0.01, 7);
        let report = run_on_bars(label, &bars, &config, &mut out)?;

        let fit = &report.analysis.polynomial;
        let last = report.analysis.index.last().copied().unwrap_or_default();
        println!(
            "{}: degree {} trend ends at {:.2}, actual average {:.2}",
            label,
            fit.degree,
            fit.predict(last),
            report.analysis.average.last().copied().unwrap_or_default()
        );
        println!();
    }

    Ok(())
}
