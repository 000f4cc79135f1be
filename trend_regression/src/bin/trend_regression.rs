use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::io;
use std::path::PathBuf;
use trend_regression::{run, RegressionConfig};

/// Fit price trends to a daily CSV and classify long-run performance
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV with at least Date, High, Low and Close columns
    dataset: PathBuf,

    /// TOML file overriding the default settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for PNG charts (requires the `plot` feature)
    #[arg(long)]
    plot_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RegressionConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => RegressionConfig::default(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = run(&args.dataset, &config, &mut out)
        .with_context(|| format!("failed to analyse {}", args.dataset.display()))?;
    info!(
        "Linear slope {:.6} per session",
        report.analysis.linear.coefficients.get(1).copied().unwrap_or_default()
    );

    if let Some(dir) = args.plot_dir {
        #[cfg(feature = "plot")]
        {
            let files = trend_regression::chart::render_all(&report, &dir)?;
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
