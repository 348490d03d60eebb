//! # Forecast Math
//!
//! Numeric building blocks for the sales forecasting engine.
//! This crate provides the descriptive statistics, trend fitting, weekly
//! harmonic fitting and volatility recursions the forecast strategies are
//! built from.

use thiserror::Error;

pub mod moving_averages;
pub mod regression;
pub mod seasonality;
pub mod statistics;
pub mod volatility;

pub use moving_averages::SimpleMovingAverage;
pub use regression::LinearFit;
pub use seasonality::WeeklyHarmonic;
pub use volatility::VolatilityClustering;

/// Errors that can occur in forecasting calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for forecasting math operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = MathError::InsufficientData("need 2 points".to_string());
        assert_eq!(err.to_string(), "Insufficient data for calculation: need 2 points");
    }
}
