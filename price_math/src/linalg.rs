//! Dense least squares used by the regression and stationarity routines
//!
//! Systems are small (a few dozen columns at most) but can be badly
//! scaled, e.g. raw powers of a day index, so columns are normalised before a
//! Householder QR factorisation and the coefficients are scaled back after
//! the solve.

use crate::{MathError, Result};

/// Column-major dense matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a matrix filled with zeros
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build a matrix from equally sized columns
    pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self> {
        let rows = columns.first().map(|c| c.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows * columns.len());
        for column in columns {
            if column.len() != rows {
                return Err(MathError::DimensionMismatch {
                    expected: rows,
                    got: column.len(),
                });
            }
            data.extend_from_slice(column);
        }

        Ok(Self {
            rows,
            cols: columns.len(),
            data,
        })
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Element at (row, col)
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[col * self.rows + row]
    }

    /// Set element at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[col * self.rows + row] = value;
    }

    /// Borrow a column
    pub fn column(&self, col: usize) -> &[f64] {
        &self.data[col * self.rows..(col + 1) * self.rows]
    }

    fn column_mut(&mut self, col: usize) -> &mut [f64] {
        &mut self.data[col * self.rows..(col + 1) * self.rows]
    }

    /// Keep only the first `cols` columns
    pub fn leading_columns(&self, cols: usize) -> Result<Self> {
        if cols > self.cols {
            return Err(MathError::DimensionMismatch {
                expected: self.cols,
                got: cols,
            });
        }

        Ok(Self {
            rows: self.rows,
            cols,
            data: self.data[..cols * self.rows].to_vec(),
        })
    }

    /// Matrix-vector product
    pub fn mul_vec(&self, v: &[f64]) -> Result<Vec<f64>> {
        if v.len() != self.cols {
            return Err(MathError::DimensionMismatch {
                expected: self.cols,
                got: v.len(),
            });
        }

        let mut out = vec![0.0; self.rows];
        for (j, &coef) in v.iter().enumerate() {
            if coef == 0.0 {
                continue;
            }
            for (o, &x) in out.iter_mut().zip(self.column(j)) {
                *o += coef * x;
            }
        }
        Ok(out)
    }
}

/// Result of an ordinary least squares solve
#[derive(Debug, Clone)]
pub struct LeastSquares {
    /// Estimated coefficients, one per design column
    pub coefficients: Vec<f64>,
    /// Fitted values `X * beta`
    pub fitted: Vec<f64>,
    /// Residuals `y - X * beta`
    pub residuals: Vec<f64>,
    /// Residual sum of squares
    pub ssr: f64,
    /// Number of observations
    pub nobs: usize,
    /// Diagonal of `(X'X)^-1`
    xtx_inv_diag: Vec<f64>,
}

impl LeastSquares {
    /// Number of estimated parameters
    pub fn num_params(&self) -> usize {
        self.coefficients.len()
    }

    /// Unbiased residual variance `ssr / (n - k)`
    pub fn sigma2(&self) -> f64 {
        let dof = self.nobs.saturating_sub(self.num_params());
        if dof == 0 {
            return f64::NAN;
        }
        self.ssr / dof as f64
    }

    /// Standard errors of the coefficients
    pub fn standard_errors(&self) -> Vec<f64> {
        let sigma2 = self.sigma2();
        self.xtx_inv_diag
            .iter()
            .map(|d| (sigma2 * d).sqrt())
            .collect()
    }

    /// t statistics of the coefficients
    pub fn t_values(&self) -> Vec<f64> {
        self.coefficients
            .iter()
            .zip(self.standard_errors())
            .map(|(b, se)| b / se)
            .collect()
    }

    /// Gaussian log-likelihood evaluated at the MLE of the variance
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.num_params() as f64
    }

    /// Bayesian information criterion
    pub fn bic(&self) -> f64 {
        -2.0 * self.log_likelihood() + self.num_params() as f64 * (self.nobs as f64).ln()
    }
}

/// Solve `min ||y - X beta||` with a column-scaled Householder QR
pub fn least_squares(design: &Matrix, y: &[f64]) -> Result<LeastSquares> {
    let n = design.rows();
    let k = design.cols();

    if y.len() != n {
        return Err(MathError::DimensionMismatch {
            expected: n,
            got: y.len(),
        });
    }
    if k == 0 {
        return Err(MathError::InvalidInput(
            "Design matrix has no columns".to_string(),
        ));
    }
    if n < k {
        return Err(MathError::InsufficientData(format!(
            "{} observations cannot identify {} coefficients",
            n, k
        )));
    }

    let mut scale = Vec::with_capacity(k);
    let mut a = design.clone();
    for j in 0..k {
        let norm = a.column(j).iter().map(|v| v * v).sum::<f64>().sqrt();
        if !norm.is_finite() || norm == 0.0 {
            return Err(MathError::CalculationError(format!(
                "Design column {} is zero or not finite",
                j
            )));
        }
        a.column_mut(j).iter_mut().for_each(|v| *v /= norm);
        scale.push(norm);
    }

    let mut qty = y.to_vec();
    let mut r_diag = vec![0.0; k];

    for j in 0..k {
        let norm = (j..n).map(|i| a.get(i, j).powi(2)).sum::<f64>().sqrt();
        if norm == 0.0 {
            r_diag[j] = 0.0;
            continue;
        }
        let alpha = if a.get(j, j) > 0.0 { -norm } else { norm };

        let mut v: Vec<f64> = (j..n).map(|i| a.get(i, j)).collect();
        v[0] -= alpha;
        let v_norm2: f64 = v.iter().map(|x| x * x).sum();

        if v_norm2 > 0.0 {
            for c in j..k {
                let dot: f64 = (j..n).map(|i| v[i - j] * a.get(i, c)).sum();
                let factor = 2.0 * dot / v_norm2;
                for i in j..n {
                    let updated = a.get(i, c) - factor * v[i - j];
                    a.set(i, c, updated);
                }
            }
            let dot: f64 = (j..n).map(|i| v[i - j] * qty[i]).sum();
            let factor = 2.0 * dot / v_norm2;
            for i in j..n {
                qty[i] -= factor * v[i - j];
            }
        }

        r_diag[j] = a.get(j, j);
    }

    let max_diag = r_diag.iter().fold(0.0_f64, |m, d| m.max(d.abs()));
    if r_diag.iter().any(|d| d.abs() <= max_diag * 1e-12) {
        return Err(MathError::CalculationError(
            "Design matrix is rank deficient".to_string(),
        ));
    }

    // Back substitution on the scaled system
    let mut z = vec![0.0; k];
    for j in (0..k).rev() {
        let mut acc = qty[j];
        for c in j + 1..k {
            acc -= a.get(j, c) * z[c];
        }
        z[j] = acc / a.get(j, j);
    }

    // Row j of R^-1 gives diag((R'R)^-1)_j = sum_c rinv[j][c]^2
    let mut r_inv = vec![vec![0.0; k]; k];
    for col in 0..k {
        for row in (0..=col).rev() {
            let mut acc = if row == col { 1.0 } else { 0.0 };
            for m in row + 1..=col {
                acc -= a.get(row, m) * r_inv[m][col];
            }
            r_inv[row][col] = acc / a.get(row, row);
        }
    }

    let coefficients: Vec<f64> = z.iter().zip(&scale).map(|(zj, s)| zj / s).collect();
    let xtx_inv_diag: Vec<f64> = (0..k)
        .map(|j| r_inv[j].iter().map(|v| v * v).sum::<f64>() / (scale[j] * scale[j]))
        .collect();

    let fitted = design.mul_vec(&coefficients)?;
    let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(a, f)| a - f).collect();
    let ssr = residuals.iter().map(|r| r * r).sum();

    Ok(LeastSquares {
        coefficients,
        fitted,
        residuals,
        ssr,
        nobs: n,
        xtx_inv_diag,
    })
}
