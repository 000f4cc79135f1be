//! Error types for the arima_forecast crate

use thiserror::Error;

/// Errors raised while preparing data, fitting models or reporting
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Price data could not be obtained or parsed
    #[error("Data error: {0}")]
    DataError(#[from] market_data::DataError),

    /// A numerical routine failed
    #[error("Math error: {0}")]
    MathError(#[from] price_math::MathError),

    /// Input failed a precondition
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Model estimation or forecasting failed
    #[error("Forecasting error: {0}")]
    ForecastingError(String),

    /// A model or configuration parameter is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    ConfigError(#[from] toml::de::Error),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Chart rendering failed
    #[error("Plot error: {0}")]
    PlotError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
