use forecast_math::MathError;
use sales_forecast::ForecastError;
use std::io;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    assert!(matches!(ForecastError::from(io_error), ForecastError::IoError(_)));

    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    assert!(matches!(ForecastError::from(json_error), ForecastError::JsonError(_)));

    let toml_error = toml::from_str::<toml::Value>("= broken").unwrap_err();
    assert!(matches!(ForecastError::from(toml_error), ForecastError::ConfigError(_)));
}

#[test]
fn test_math_error_conversion() {
    let cases = vec![
        (
            MathError::InsufficientData("need 2".to_string()),
            "Data error: need 2",
        ),
        (
            MathError::InvalidInput("period 0".to_string()),
            "Invalid parameter: period 0",
        ),
        (
            MathError::CalculationError("overflow".to_string()),
            "Numerical error: overflow",
        ),
    ];

    for (math_error, expected) in cases {
        assert_eq!(ForecastError::from(math_error).to_string(), expected);
    }
}

#[test]
fn test_error_display() {
    let error = ForecastError::InsufficientData {
        strategy: "MarketRealistic".to_string(),
        required: 7,
        available: 3,
    };
    let message = error.to_string();
    assert!(message.contains("MarketRealistic"));
    assert!(message.contains('7'));
    assert!(message.contains('3'));

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let message = ForecastError::from(io_error).to_string();
    assert!(message.contains("IO error"));
    assert!(message.contains("permission denied"));

    let degenerate = ForecastError::DegenerateSeries("all values equal 5".to_string());
    assert!(degenerate.to_string().starts_with("Degenerate series"));
}
