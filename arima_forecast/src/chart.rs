//! PNG charts of a forecast run

use crate::error::{ForecastError, Result};
use crate::models::FittedModel;
use crate::pipeline::ForecastReport;
use chrono::NaiveDate;
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

const SIZE: (u32, u32) = (1000, 600);
const ORANGE: RGBColor = RGBColor(255, 140, 0);
const GREEN_LINE: RGBColor = RGBColor(0, 128, 0);
const BAND: RGBColor = RGBColor(255, 200, 130);

fn plot_err<E: std::fmt::Display>(e: E) -> ForecastError {
    ForecastError::PlotError(e.to_string())
}

/// One labelled line on a date axis
struct Line<'a> {
    label: &'a str,
    color: RGBColor,
    points: Vec<(NaiveDate, f64)>,
}

impl<'a> Line<'a> {
    fn new(label: &'a str, color: RGBColor, dates: &[NaiveDate], values: &[f64]) -> Self {
        Self {
            label,
            color,
            points: dates.iter().copied().zip(values.iter().copied()).collect(),
        }
    }

    fn sparse(
        label: &'a str,
        color: RGBColor,
        dates: &[NaiveDate],
        values: &[Option<f64>],
    ) -> Self {
        Self {
            label,
            color,
            points: dates
                .iter()
                .zip(values)
                .filter_map(|(d, v)| v.map(|v| (*d, v)))
                .collect(),
        }
    }
}

fn bounds<T: PartialOrd + Copy>(values: impl Iterator<Item = T>) -> Option<(T, T)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((
            if v < lo { v } else { lo },
            if v > hi { v } else { hi },
        )),
    })
}

fn draw_lines<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    y_desc: &str,
    lines: &[Line<'_>],
) -> Result<()> {
    let all = || lines.iter().flat_map(|l| l.points.iter());
    let (Some((x0, x1)), Some((y0, y1))) = (
        bounds(all().map(|(d, _)| *d)),
        bounds(all().map(|(_, v)| *v).filter(|v| v.is_finite())),
    ) else {
        return Ok(());
    };
    let pad = ((y1 - y0) * 0.05).max(1e-9);

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, (y0 - pad)..(y1 + pad))
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc(y_desc)
        .draw()
        .map_err(plot_err)?;

    for line in lines {
        let color = line.color;
        chart
            .draw_series(LineSeries::new(line.points.iter().copied(), &color))
            .map_err(plot_err)?
            .label(line.label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_err)?;
    Ok(())
}

fn single(path: &Path, title: &str, y_desc: &str, lines: &[Line<'_>]) -> Result<()> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    draw_lines(&root, title, y_desc, lines)?;
    root.present().map_err(plot_err)
}

fn density(path: &Path, title: &str, kde: &[(f64, f64)]) -> Result<()> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let (Some((x0, x1)), Some((_, y1))) = (
        bounds(kde.iter().map(|(x, _)| *x)),
        bounds(kde.iter().map(|(_, y)| *y)),
    ) else {
        return root.present().map_err(plot_err);
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(70)
        .build_cartesian_2d(x0..x1, 0.0..y1 * 1.05)
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .x_desc("Close")
        .y_desc("Density")
        .draw()
        .map_err(plot_err)?;
    chart
        .draw_series(LineSeries::new(kde.iter().copied(), &BLUE))
        .map_err(plot_err)?;
    root.present().map_err(plot_err)
}

/// Write every chart of `report` into `dir`, returning the files written
pub fn render_all(report: &ForecastReport, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let file = |name: &str| dir.join(format!("{}_{}.png", report.label, name));
    let mut written = Vec::new();

    let dates = report.closes.dates();
    let closes = report.closes.values();

    let path = file("close");
    single(
        &path,
        &report.label,
        "Close Prices",
        &[Line::new("Close", BLUE, dates, closes)],
    )?;
    written.push(path);

    let path = file("close_density");
    density(&path, &format!("{} closing price density", report.label), &report.kde)?;
    written.push(path);

    let path = file("rolling");
    single(
        &path,
        "Rolling Mean and Standard Deviation",
        "Close Prices",
        &[
            Line::new("Original", BLUE, dates, closes),
            Line::sparse("Rolling Mean", RED, dates, &report.close_rolling.mean),
            Line::sparse("Rolling Std", BLACK, dates, &report.close_rolling.std),
        ],
    )?;
    written.push(path);

    let path = file("decomposition");
    {
        let parts = &report.decomposition;
        let root = BitMapBackend::new(&path, (1000, 1000)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;
        let panels = root.split_evenly((4, 1));
        draw_lines(
            &panels[0],
            "Observed",
            "",
            &[Line::new("Observed", BLUE, dates, &parts.observed)],
        )?;
        draw_lines(
            &panels[1],
            "Trend",
            "",
            &[Line::sparse("Trend", BLUE, dates, &parts.trend)],
        )?;
        draw_lines(
            &panels[2],
            "Seasonal",
            "",
            &[Line::new("Seasonal", BLUE, dates, &parts.seasonal)],
        )?;
        draw_lines(
            &panels[3],
            "Residual",
            "",
            &[Line::sparse("Residual", BLUE, dates, &parts.resid)],
        )?;
        root.present().map_err(plot_err)?;
    }
    written.push(path);

    let path = file("log_moving_average");
    let log_dates = report.log_closes.dates();
    single(
        &path,
        "Moving Average",
        "Log Close",
        &[
            Line::sparse("Standard Deviation", BLACK, log_dates, &report.log_rolling.std),
            Line::sparse("Mean", RED, log_dates, &report.log_rolling.mean),
        ],
    )?;
    written.push(path);

    let train_prices: Vec<f64> = report.train.values().iter().map(|v| v.exp()).collect();
    let test_prices: Vec<f64> = report.test.values().iter().map(|v| v.exp()).collect();

    let path = file("train_test");
    single(
        &path,
        "Train and Test Data",
        "Closing Prices",
        &[
            Line::new("Original data", GREEN_LINE, dates, closes),
            Line::new("Train data", ORANGE, report.train.dates(), &train_prices),
            Line::new("Test data", BLUE, report.test.dates(), &test_prices),
        ],
    )?;
    written.push(path);

    let path = file("residuals");
    {
        // Residuals line up with the end of the training dates
        let residuals = report.auto.model.residuals();
        let train_dates = report.train.dates();
        let offset = train_dates.len().saturating_sub(residuals.len());
        single(
            &path,
            &format!("{} residuals", report.auto.spec),
            "Residual",
            &[Line::new("Residual", BLUE, &train_dates[offset..], residuals)],
        )?;
    }
    written.push(path);

    let path = file("forecast");
    let lower: Vec<f64> = report.intervals.iter().map(|(lo, _)| *lo).collect();
    let upper: Vec<f64> = report.intervals.iter().map(|(_, hi)| *hi).collect();
    let test_dates = report.forecast.dates();
    single(
        &path,
        &format!("{} Prediction", report.label),
        &report.label,
        &[
            Line::new("Training Data", GREEN_LINE, report.train.dates(), &train_prices),
            Line::new("Actual Stock Price", BLUE, test_dates, &test_prices),
            Line::new("Predicted Stock Price", ORANGE, test_dates, report.forecast.values()),
            Line::new("Lower bound", BAND, test_dates, &lower),
            Line::new("Upper bound", BAND, test_dates, &upper),
        ],
    )?;
    written.push(path);

    info!("Wrote {} charts to {}", written.len(), dir.display());
    Ok(written)
}
