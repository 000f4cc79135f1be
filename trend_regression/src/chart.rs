//! PNG charts of the regression fits

use crate::error::{RegressionError, Result};
use crate::pipeline::RegressionReport;
use chrono::NaiveDate;
use log::info;
use plotters::prelude::*;
use price_math::regression::RegressionFit;
use std::path::{Path, PathBuf};

const SWEEP_COLORS: [RGBColor; 5] = [
    RED,
    BLUE,
    GREEN,
    RGBColor(255, 165, 0),
    RGBColor(128, 0, 128),
];
const TRAINING: RGBColor = RGBColor(31, 119, 180);

fn plot_err<E: std::fmt::Display>(e: E) -> RegressionError {
    RegressionError::PlotError(e.to_string())
}

/// Scatter of the averages with one line per fit
fn fit_chart(
    path: &Path,
    title: &str,
    dates: &[NaiveDate],
    average: &[f64],
    fits: &[(String, RGBColor, &RegressionFit)],
) -> Result<()> {
    let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
        return Ok(());
    };
    let values = average
        .iter()
        .chain(fits.iter().flat_map(|(_, _, fit)| fit.fitted.iter()))
        .filter(|v| v.is_finite());
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(*v), hi.max(*v))
    });
    let pad = ((hi - lo) * 0.05).max(1e-9);

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(*first..*last, (lo - pad)..(hi + pad))
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Average Daily Market Value")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(
            dates
                .iter()
                .zip(average)
                .map(|(d, v)| Circle::new((*d, *v), 2, TRAINING.filled())),
        )
        .map_err(plot_err)?
        .label("Training Data")
        .legend(|(x, y)| Circle::new((x, y), 3, TRAINING.filled()));

    for (label, color, fit) in fits {
        let color = *color;
        chart
            .draw_series(LineSeries::new(
                dates.iter().copied().zip(fit.fitted.iter().copied()),
                &color,
            ))
            .map_err(plot_err)?
            .label(label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_err)?;
    root.present().map_err(plot_err)
}

/// Write the four regression charts into `dir`
pub fn render_all(report: &RegressionReport, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let analysis = &report.analysis;
    let stem = &report.label;
    let file = |name: &str| dir.join(format!("{}_{}.png", stem, name));
    let predicted = |fit| vec![("Predicted".to_string(), RED, fit)];

    let mut written = Vec::new();

    let path = file("linear");
    fit_chart(
        &path,
        &format!("{} Average Daily Stock Price (No adjustments)", stem),
        &analysis.dates,
        &analysis.average,
        &predicted(&analysis.linear),
    )?;
    written.push(path);

    let path = file("polynomial");
    fit_chart(
        &path,
        &format!(
            "{} Average Daily Stock Price (Degree {} polynomial)",
            stem, analysis.polynomial.degree
        ),
        &analysis.dates,
        &analysis.average,
        &predicted(&analysis.polynomial),
    )?;
    written.push(path);

    let path = file("elastic_net");
    fit_chart(
        &path,
        &format!(
            "{} Average Daily Stock Price (Elastic Net, Degree {})",
            stem, analysis.elastic_net.degree
        ),
        &analysis.dates,
        &analysis.average,
        &predicted(&analysis.elastic_net),
    )?;
    written.push(path);

    let path = file("elastic_net_sweep");
    let sweep: Vec<(String, RGBColor, &RegressionFit)> = analysis
        .sweep
        .iter()
        .enumerate()
        .map(|(i, fit)| {
            (
                format!("Predicted (Degree {})", fit.degree),
                SWEEP_COLORS[i % SWEEP_COLORS.len()],
                fit,
            )
        })
        .collect();
    fit_chart(
        &path,
        &format!("{} Average Daily Stock Price (Elastic Net)", stem),
        &analysis.dates,
        &analysis.average,
        &sweep,
    )?;
    written.push(path);

    info!("Wrote {} charts to {}", written.len(), dir.display());
    Ok(written)
}
