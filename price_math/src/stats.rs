//! Descriptive statistics over price series
//!
//! Window functions return `Option<f64>` per position so that the warm-up
//! period stays index-aligned with the input series.

use crate::{MathError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

/// Arithmetic mean; NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean ignoring NaN values; NaN when nothing remains
pub fn nan_mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Sample standard deviation (n - 1 denominator); NaN below two values
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

fn check_window(window: usize) -> Result<()> {
    if window == 0 {
        return Err(MathError::InvalidInput(
            "Window size must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Rolling mean over a trailing window
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    check_window(window)?;

    let mut result = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            result.push(Some(sum / window as f64));
        } else {
            result.push(None);
        }
    }
    Ok(result)
}

/// Rolling sample standard deviation over a trailing window
pub fn rolling_std(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    check_window(window)?;

    Ok((0..values.len())
        .map(|i| {
            if i + 1 < window || window < 2 {
                None
            } else {
                Some(sample_std(&values[i + 1 - window..=i]))
            }
        })
        .collect())
}

/// Percentage change against the value `periods` positions earlier
pub fn pct_change(values: &[f64], periods: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if periods == 0 {
                Some(0.0)
            } else if i < periods {
                None
            } else {
                Some(v / values[i - periods] - 1.0)
            }
        })
        .collect()
}

/// Standard normal cumulative distribution function
pub fn normal_cdf(x: f64) -> f64 {
    match Normal::new(0.0, 1.0) {
        Ok(dist) => dist.cdf(x),
        Err(_) => f64::NAN,
    }
}

/// Standard normal quantile
pub fn normal_quantile(p: f64) -> f64 {
    match Normal::new(0.0, 1.0) {
        Ok(dist) => dist.inverse_cdf(p),
        Err(_) => f64::NAN,
    }
}

/// Gaussian kernel density estimate evaluated on an even grid
///
/// Bandwidth follows Scott's rule, `n^(-1/5)` times the sample standard
/// deviation. The grid spans the data range padded by three bandwidths.
pub fn gaussian_kde(values: &[f64], grid_points: usize) -> Result<Vec<(f64, f64)>> {
    if values.len() < 2 {
        return Err(MathError::InsufficientData(
            "Kernel density needs at least two observations".to_string(),
        ));
    }
    if grid_points < 2 {
        return Err(MathError::InvalidInput(
            "Kernel density grid needs at least two points".to_string(),
        ));
    }

    let std = sample_std(values);
    if std.is_nan() || std <= 0.0 {
        return Err(MathError::CalculationError(
            "Kernel density undefined for a constant series".to_string(),
        ));
    }

    let n = values.len() as f64;
    let bandwidth = std * n.powf(-0.2);
    let lo = values.iter().cloned().fold(f64::INFINITY, f64::min) - 3.0 * bandwidth;
    let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max) + 3.0 * bandwidth;
    let step = (hi - lo) / (grid_points - 1) as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    Ok((0..grid_points)
        .map(|g| {
            let x = lo + step * g as f64;
            let density: f64 = values
                .iter()
                .map(|v| {
                    let u = (x - v) / bandwidth;
                    (-0.5 * u * u).exp()
                })
                .sum();
            (x, density * norm)
        })
        .collect())
}
