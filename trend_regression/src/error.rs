//! Error types for the trend_regression crate

use thiserror::Error;

/// Errors that can occur while fitting trends or classifying performance
#[derive(Error, Debug)]
pub enum RegressionError {
    #[error("Data loading error: {0}")]
    DataLoadError(#[from] market_data::DataError),

    #[error("Calculation error: {0}")]
    CalculationError(#[from] price_math::MathError),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Insufficient data for analysis: {0}")]
    InsufficientData(String),

    #[error("Parameter validation error: {0}")]
    ParameterError(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Plot error: {0}")]
    PlotError(String),
}

/// Result type for trend analysis
pub type Result<T> = std::result::Result<T, RegressionError>;
