//! Polynomial trend regression on a time index
//!
//! Contains implementations of:
//! - Ordinary least squares on `[1, t]`
//! - Polynomial least squares on `[1, t, ..., t^d]`
//! - Elastic-net regularised polynomial regression (coordinate descent)
//!
//! None of the fits adds a hidden intercept: the bias column is part of the
//! design, so for elastic net it is penalised like any other coefficient.

use crate::linalg::{least_squares, Matrix};
use crate::{MathError, Result};
use log::debug;
use serde::{Deserialize, Serialize};

/// Which estimator produced a fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FitKind {
    /// Ordinary least squares
    LeastSquares,
    /// Elastic net with the given penalty strength and L1 share
    ElasticNet { alpha: f64, l1_ratio: f64 },
}

/// Coefficients and in-sample predictions of a polynomial fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionFit {
    /// Polynomial degree (1 for a straight line)
    pub degree: usize,
    /// Coefficients for `t^0..=t^degree`
    pub coefficients: Vec<f64>,
    /// Predictions at each training index
    pub fitted: Vec<f64>,
    /// Estimator used
    pub kind: FitKind,
}

impl RegressionFit {
    /// Evaluate the fitted polynomial at `t`
    pub fn predict(&self, t: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * t + c)
    }

    /// Mean squared error of the in-sample predictions
    pub fn training_mse(&self, y: &[f64]) -> Result<f64> {
        if y.len() != self.fitted.len() {
            return Err(MathError::DimensionMismatch {
                expected: self.fitted.len(),
                got: y.len(),
            });
        }
        Ok(y.iter()
            .zip(&self.fitted)
            .map(|(a, f)| (a - f).powi(2))
            .sum::<f64>()
            / y.len() as f64)
    }
}

/// Polynomial feature columns of a single regressor
///
/// With `include_bias` the first column is all ones (`t^0`).
pub fn polynomial_features(x: &[f64], degree: usize, include_bias: bool) -> Result<Matrix> {
    if degree == 0 && !include_bias {
        return Err(MathError::InvalidInput(
            "Degree 0 without a bias column yields no features".to_string(),
        ));
    }

    let first = if include_bias { 0 } else { 1 };
    let columns: Vec<Vec<f64>> = (first..=degree)
        .map(|p| x.iter().map(|v| v.powi(p as i32)).collect())
        .collect();
    Matrix::from_columns(&columns)
}

/// Mean squared cost `(X theta - y)'(X theta - y) / (2n)`
pub fn vectorized_cost(design: &Matrix, y: &[f64], theta: &[f64]) -> Result<f64> {
    if y.len() != design.rows() {
        return Err(MathError::DimensionMismatch {
            expected: design.rows(),
            got: y.len(),
        });
    }
    if y.is_empty() {
        return Err(MathError::InsufficientData(
            "Cost of an empty sample is undefined".to_string(),
        ));
    }

    let predicted = design.mul_vec(theta)?;
    let inner: f64 = predicted
        .iter()
        .zip(y)
        .map(|(p, a)| (p - a).powi(2))
        .sum();
    Ok(inner / (2.0 * y.len() as f64))
}

fn check_sample(x: &[f64], y: &[f64], params: usize) -> Result<()> {
    if x.len() != y.len() {
        return Err(MathError::DimensionMismatch {
            expected: x.len(),
            got: y.len(),
        });
    }
    if x.len() < params {
        return Err(MathError::InsufficientData(format!(
            "Need at least {} observations, got {}",
            params,
            x.len()
        )));
    }
    Ok(())
}

/// Straight line through `[1, t]` by ordinary least squares
pub fn fit_linear(x: &[f64], y: &[f64]) -> Result<RegressionFit> {
    fit_polynomial(x, y, 1)
}

/// Polynomial of the given degree by ordinary least squares
pub fn fit_polynomial(x: &[f64], y: &[f64], degree: usize) -> Result<RegressionFit> {
    check_sample(x, y, degree + 1)?;

    let design = polynomial_features(x, degree, true)?;
    let solution = least_squares(&design, y)?;
    debug!(
        "degree {} least squares fit, ssr = {:.6}",
        degree, solution.ssr
    );

    Ok(RegressionFit {
        degree,
        coefficients: solution.coefficients,
        fitted: solution.fitted,
        kind: FitKind::LeastSquares,
    })
}

/// Settings of the coordinate descent solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticNetParams {
    /// Overall penalty strength
    pub alpha: f64,
    /// Share of the penalty assigned to the L1 term
    pub l1_ratio: f64,
    /// Maximum full sweeps over the coefficients
    pub max_iter: usize,
    /// Stop once the largest update is below `tol` times the largest coefficient
    pub tol: f64,
}

impl ElasticNetParams {
    /// Parameters with the default iteration limits
    pub fn new(alpha: f64, l1_ratio: f64) -> Result<Self> {
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(MathError::InvalidInput(
                "Alpha must be a finite non-negative number".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&l1_ratio) {
            return Err(MathError::InvalidInput(
                "L1 ratio must be between 0 and 1".to_string(),
            ));
        }

        Ok(Self {
            alpha,
            l1_ratio,
            max_iter: 1000,
            tol: 1e-4,
        })
    }
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

/// Elastic-net regression on a polynomial design
///
/// Minimises `1/(2n) ||y - Xw||^2 + alpha * l1_ratio * ||w||_1
/// + alpha * (1 - l1_ratio) / 2 * ||w||^2` by cyclic coordinate descent.
pub fn fit_elastic_net(
    x: &[f64],
    y: &[f64],
    degree: usize,
    params: ElasticNetParams,
) -> Result<RegressionFit> {
    check_sample(x, y, 1)?;

    let design = polynomial_features(x, degree, true)?;
    let coefficients = coordinate_descent(&design, y, &params)?;
    let fitted = design.mul_vec(&coefficients)?;

    Ok(RegressionFit {
        degree,
        coefficients,
        fitted,
        kind: FitKind::ElasticNet {
            alpha: params.alpha,
            l1_ratio: params.l1_ratio,
        },
    })
}

fn coordinate_descent(design: &Matrix, y: &[f64], params: &ElasticNetParams) -> Result<Vec<f64>> {
    let n = design.rows() as f64;
    let k = design.cols();
    let l1 = params.alpha * params.l1_ratio * n;
    let l2 = params.alpha * (1.0 - params.l1_ratio) * n;

    let col_norms: Vec<f64> = (0..k)
        .map(|j| design.column(j).iter().map(|v| v * v).sum())
        .collect();
    if col_norms.iter().any(|v| !v.is_finite()) {
        return Err(MathError::CalculationError(
            "Polynomial features overflow; reduce the degree".to_string(),
        ));
    }

    let mut w = vec![0.0; k];
    let mut residual = y.to_vec();

    for sweep in 0..params.max_iter {
        let mut max_update: f64 = 0.0;
        let mut max_w: f64 = 0.0;

        for j in 0..k {
            let denom = col_norms[j] + l2;
            if denom == 0.0 {
                continue;
            }
            let column = design.column(j);
            let old = w[j];
            let rho: f64 = column
                .iter()
                .zip(&residual)
                .map(|(xj, r)| xj * r)
                .sum::<f64>()
                + col_norms[j] * old;
            let new = soft_threshold(rho, l1) / denom;

            if new != old {
                let delta = new - old;
                residual
                    .iter_mut()
                    .zip(column)
                    .for_each(|(r, xj)| *r -= delta * xj);
                w[j] = new;
            }
            max_update = max_update.max((new - old).abs());
            max_w = max_w.max(new.abs());
        }

        if max_w == 0.0 || max_update / max_w < params.tol {
            debug!("elastic net converged after {} sweeps", sweep + 1);
            return Ok(w);
        }
    }

    debug!(
        "elastic net stopped at max_iter = {} without converging",
        params.max_iter
    );
    Ok(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn index(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_linear_fit_exact() {
        let x = index(20);
        let y: Vec<f64> = x.iter().map(|t| 50.0 + 0.25 * t).collect();
        let fit = fit_linear(&x, &y).unwrap();

        assert_eq!(fit.degree, 1);
        assert_relative_eq!(fit.coefficients[0], 50.0, epsilon = 1e-9);
        assert_relative_eq!(fit.coefficients[1], 0.25, epsilon = 1e-9);
        assert_relative_eq!(fit.predict(40.0), 60.0, epsilon = 1e-8);
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(4)]
    fn test_polynomial_recovers_quadratic(#[case] degree: usize) {
        let x = index(100);
        let y: Vec<f64> = x.iter().map(|t| 10.0 - 0.3 * t + 0.01 * t * t).collect();
        let fit = fit_polynomial(&x, &y, degree).unwrap();

        assert!(fit.training_mse(&y).unwrap() < 1e-12);
        assert_eq!(fit.coefficients.len(), degree + 1);
    }

    #[test]
    fn test_vectorized_cost() {
        let design = polynomial_features(&[0.0, 1.0, 2.0], 1, true).unwrap();
        let y = [1.0, 2.0, 3.0];

        // theta = 0: sum(y^2) / (2n) = 14 / 6
        let cost = vectorized_cost(&design, &y, &[0.0, 0.0]).unwrap();
        assert_relative_eq!(cost, 14.0 / 6.0);

        let cost = vectorized_cost(&design, &y, &[1.0, 1.0]).unwrap();
        assert_relative_eq!(cost, 0.0);
    }

    #[test]
    fn test_elastic_net_without_penalty_matches_ols() {
        let x: Vec<f64> = (0..30).map(|i| i as f64 / 10.0).collect();
        let y: Vec<f64> = x.iter().map(|t| 2.0 + 1.5 * t + (t * 7.0).sin() * 0.1).collect();

        let mut params = ElasticNetParams::new(0.0, 0.5).unwrap();
        params.max_iter = 100_000;
        params.tol = 1e-12;

        let net = fit_elastic_net(&x, &y, 1, params).unwrap();
        let ols = fit_linear(&x, &y).unwrap();
        assert_relative_eq!(net.coefficients[0], ols.coefficients[0], epsilon = 1e-6);
        assert_relative_eq!(net.coefficients[1], ols.coefficients[1], epsilon = 1e-6);
    }

    #[test]
    fn test_elastic_net_shrinks_coefficients() {
        let x = index(50);
        let y: Vec<f64> = x.iter().map(|t| 5.0 + 2.0 * t).collect();

        let params = ElasticNetParams::new(2.0, 0.5).unwrap();
        let net = fit_elastic_net(&x, &y, 1, params).unwrap();
        let ols = fit_linear(&x, &y).unwrap();

        let l1_net: f64 = net.coefficients.iter().map(|c| c.abs()).sum();
        let l1_ols: f64 = ols.coefficients.iter().map(|c| c.abs()).sum();
        assert!(l1_net < l1_ols);
        assert!(matches!(net.kind, FitKind::ElasticNet { alpha, .. } if alpha == 2.0));
    }

    #[test]
    fn test_elastic_net_heavy_l1_zeroes_everything() {
        let x = index(10);
        let y: Vec<f64> = x.iter().map(|t| 0.01 * t).collect();
        let params = ElasticNetParams::new(1e6, 1.0).unwrap();
        let net = fit_elastic_net(&x, &y, 2, params).unwrap();
        assert!(net.coefficients.iter().all(|c| *c == 0.0));
    }

    #[test]
    fn test_parameter_validation() {
        assert!(ElasticNetParams::new(-1.0, 0.5).is_err());
        assert!(ElasticNetParams::new(1.0, 1.5).is_err());
        assert!(ElasticNetParams::new(f64::NAN, 0.5).is_err());
        assert!(fit_polynomial(&[0.0, 1.0], &[1.0, 2.0], 3).is_err());
        assert!(fit_linear(&[0.0, 1.0, 2.0], &[1.0, 2.0]).is_err());
        assert!(polynomial_features(&[1.0], 0, false).is_err());
    }
}
