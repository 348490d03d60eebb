//! # Sales Forecast
//!
//! Ensemble forecasting of daily business metrics (revenue, orders, profit).
//!
//! ## Features
//!
//! - Pattern analysis: volatility, trend strength, regime and weekly seasonality
//! - Three forecasting strategies: simple trend, market-realistic
//!   (volatility-aware) and natural fluctuation
//! - Backtest-based model selection with a comparison table
//! - Bounded day-over-day movement, non-negative predictions and confidence
//!   that never rises with distance
//! - Deterministic output: the same history always yields the same forecast
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Duration, NaiveDate};
//! use sales_forecast::{EnsembleForecaster, HistoricalPoint};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let history: Vec<HistoricalPoint> = (0..60)
//!     .map(|i| HistoricalPoint::new(start + Duration::days(i), 1_000.0 + 5.0 * i as f64))
//!     .collect();
//!
//! let result = EnsembleForecaster::new().forecast(&history, 30);
//! assert_eq!(result.forecasts.len(), 30);
//! println!("Best model: {}", result.best_model);
//! ```

pub mod analyzer;
pub mod business;
pub mod config;
pub mod data;
pub mod ensemble;
pub mod error;
pub mod metrics;
pub mod models;
pub mod stability;
pub mod utils;

// Re-export commonly used types
pub use crate::analyzer::{MarketProfile, MarketRegime, PatternAnalyzer};
pub use crate::config::{DailyBounds, EnginePolicy};
pub use crate::data::{DailyObservation, HistoricalPoint, SalesMetric, SalesSeries};
pub use crate::ensemble::{EnsembleForecast, EnsembleForecaster, ModelComparison};
pub use crate::error::{ForecastError, Result};
pub use crate::metrics::{MetricsCalculator, ModelMetrics};
pub use crate::models::{ForecastPoint, ForecastStrategy, Strategy, StrategyKind};
pub use crate::stability::StabilityGuard;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
