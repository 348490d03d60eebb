//! Error types for the sales_forecast crate

use forecast_math::MathError;
use thiserror::Error;

/// Custom error types for the sales_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A strategy was given fewer points than it needs
    #[error("Insufficient data for {strategy}: need at least {required} points, have {available}")]
    InsufficientData {
        strategy: String,
        required: usize,
        available: usize,
    },

    /// All-zero or constant series where a statistic would divide by zero
    #[error("Degenerate series: {0}")]
    DegenerateSeries(String),

    /// Every strategy and the fallback failed
    #[error("All strategies failed: {0}")]
    AllStrategiesFailed(String),

    /// NaN, infinity or another numerical breakdown inside a computation
    #[error("Numerical error: {0}")]
    Numerical(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error loading or validating the engine policy
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reading CSV input
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error encoding or decoding JSON
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InsufficientData(msg) => ForecastError::DataError(msg),
            MathError::InvalidInput(msg) => ForecastError::InvalidParameter(msg),
            MathError::CalculationError(msg) => ForecastError::Numerical(msg),
        }
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}
