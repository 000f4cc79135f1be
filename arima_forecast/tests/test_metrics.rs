use approx::assert_relative_eq;
use arima_forecast::metrics::{
    mean_absolute_error, mean_absolute_percentage_error, mean_squared_error,
    root_mean_squared_error,
};
use arima_forecast::{ForecastError, ForecastMetrics};
use rstest::rstest;

#[test]
fn test_regression_metrics() {
    let actual = vec![100.0, 110.0, 120.0];
    let predicted = vec![105.0, 108.0, 125.0];

    assert_relative_eq!(mean_squared_error(&actual, &predicted).unwrap(), 18.0);
    assert_relative_eq!(mean_absolute_error(&actual, &predicted).unwrap(), 4.0);
    assert_relative_eq!(
        root_mean_squared_error(&actual, &predicted).unwrap(),
        4.243,
        epsilon = 1e-3
    );

    let mape = mean_absolute_percentage_error(&actual, &predicted).unwrap();
    assert!(mape > 0.0 && mape < 0.05);
}

#[rstest]
#[case(vec![1.0, 2.0, 3.0], vec![1.5, 1.5, 3.5])]
#[case(vec![4.6, 4.7, 4.8, 4.9], vec![4.6, 4.6, 4.6, 4.6])]
#[case(vec![10.0], vec![-3.0])]
#[case(vec![0.1, 0.2, 0.3, 0.4, 0.5], vec![0.5, 0.4, 0.3, 0.2, 0.1])]
fn test_rmse_is_root_of_mse_and_bounds_mae(#[case] actual: Vec<f64>, #[case] predicted: Vec<f64>) {
    let metrics = ForecastMetrics::compare(&actual, &predicted).unwrap();

    assert_eq!(metrics.rmse, metrics.mse.sqrt());
    assert!(metrics.mae <= metrics.rmse + 1e-12);
}

#[test]
fn test_mismatched_lengths() {
    let result = ForecastMetrics::evaluate(&[1.0, 2.0], &[1.0]);
    assert!(matches!(result, Err(ForecastError::ValidationError(_))));

    let result = mean_absolute_percentage_error(&[], &[]);
    assert!(matches!(result, Err(ForecastError::ValidationError(_))));
}

#[test]
fn test_log_space_evaluation() {
    let prices = [100.0_f64, 110.0, 120.0];
    let forecast = [105.0_f64, 108.0, 125.0];
    let log_prices: Vec<f64> = prices.iter().map(|p| p.ln()).collect();
    let log_forecast: Vec<f64> = forecast.iter().map(|p| p.ln()).collect();

    let metrics = ForecastMetrics::evaluate(&log_prices, &log_forecast).unwrap();
    let price_mape = mean_absolute_percentage_error(&prices, &forecast).unwrap();

    assert_relative_eq!(metrics.mape, price_mape, epsilon = 1e-12);
    assert!(metrics.mse < 0.01);
}
