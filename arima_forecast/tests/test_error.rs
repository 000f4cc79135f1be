use arima_forecast::error::ForecastError;
use std::io;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let forecast_error = ForecastError::from(io_error);
    assert!(matches!(forecast_error, ForecastError::IoError(_)));

    let math_error = price_math::MathError::InsufficientData("need 60 values".to_string());
    let forecast_error = ForecastError::from(math_error);
    assert!(matches!(forecast_error, ForecastError::MathError(_)));

    let data_error = market_data::DataError::MissingColumn("Close".to_string());
    let forecast_error = ForecastError::from(data_error);
    assert!(matches!(forecast_error, ForecastError::DataError(_)));

    let toml_error = toml::from_str::<toml::Value>("key = ").unwrap_err();
    let forecast_error = ForecastError::from(toml_error);
    assert!(matches!(forecast_error, ForecastError::ConfigError(_)));
}

#[test]
fn test_error_display() {
    let error = ForecastError::InvalidParameter("alpha must be between 0 and 1".to_string());
    let error_string = format!("{}", error);
    assert!(error_string.contains("alpha must be between 0 and 1"));

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let error_string = ForecastError::from(io_error).to_string();
    assert!(error_string.contains("IO error"));
    assert!(error_string.contains("permission denied"));
}
