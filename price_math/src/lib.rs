//! # Price Math
//!
//! Numerical routines behind the price analyses.
//! This crate provides least squares solvers, regularised polynomial
//! regression, rolling statistics, the augmented Dickey-Fuller test and
//! classical seasonal decomposition.

use thiserror::Error;

pub mod decomposition;
pub mod linalg;
pub mod optimize;
pub mod regression;
pub mod stationarity;
pub mod stats;

/// Errors that can occur in numerical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;
