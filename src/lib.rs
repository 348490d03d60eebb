//! # Sales Forecast Workspace
//!
//! Umbrella crate for the daily sales forecasting engine.
//!
//! - [`sales_forecast`]: pattern analysis, forecast strategies, ensemble
//!   selection and the stability guard
//! - [`forecast_math`]: statistics, trend and seasonality fitting, volatility
//!   recursions
//!
//! ## Example
//!
//! ```
//! use sales_forecast_workspace::sales_forecast::{EnsembleForecaster, HistoricalPoint};
//!
//! let history = vec![
//!     HistoricalPoint::parse("2024-01-01", 100.0).unwrap(),
//!     HistoricalPoint::parse("2024-01-02", 101.0).unwrap(),
//!     HistoricalPoint::parse("2024-01-03", 102.0).unwrap(),
//! ];
//!
//! let result = EnsembleForecaster::new().forecast(&history, 5);
//! assert_eq!(result.best_model, "SimpleTrend");
//! ```

pub use forecast_math;
pub use sales_forecast;
