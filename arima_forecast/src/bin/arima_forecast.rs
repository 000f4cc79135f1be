use anyhow::{bail, Context, Result};
use arima_forecast::{run_forecast, ForecastConfig, PriceSource};
use clap::Parser;
use log::info;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Forecast daily closing prices with an ARIMA model
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Ticker symbol to fetch from Yahoo Finance
    #[arg(long, conflicts_with = "csv")]
    ticker: Option<String>,

    /// Read prices from a CSV file instead of the network
    #[arg(long)]
    csv: Option<PathBuf>,

    /// TOML file overriding the default settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for PNG charts (requires the `plot` feature)
    #[arg(long)]
    plot_dir: Option<PathBuf>,
}

fn prompt_ticker() -> Result<String> {
    print!("Enter the Stock Symbol:");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let symbol = line.trim().to_string();
    if symbol.is_empty() {
        bail!("no ticker symbol given");
    }
    Ok(symbol)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ForecastConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ForecastConfig::default(),
    };

    let source = match (args.ticker, args.csv) {
        (Some(ticker), _) => PriceSource::Ticker(ticker),
        (None, Some(path)) => PriceSource::Csv(path),
        (None, None) => PriceSource::Ticker(prompt_ticker()?),
    };

    let bars = source
        .load()
        .with_context(|| format!("failed to load prices for {}", source.label()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = run_forecast(&source.label(), &bars, &config, &mut out)?;
    info!(
        "Forecast {} days from {}",
        report.forecast.len(),
        report.test.dates().first().map(|d| d.to_string()).unwrap_or_default()
    );

    if let Some(dir) = args.plot_dir {
        #[cfg(feature = "plot")]
        {
            let files = arima_forecast::chart::render_all(&report, &dir)?;
            for file in files {
                info!("Wrote {}", file.display());
            }
        }
        #[cfg(not(feature = "plot"))]
        log::warn!(
            "Charts for {} were requested but this build lacks the `plot` feature",
            dir.display()
        );
    }

    Ok(())
}
