//! Metrics for evaluating forecast quality
//!
//! The free functions compare a forecast against actual values and return
//! `NaN` for empty or mismatched input. [`MetricsCalculator`] turns them into
//! [`ModelMetrics`], either from a backtest against held-out days or, when
//! the history is too short for one, from a forecast's own band widths.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::analyzer::{MarketProfile, PatternAnalyzer};
use crate::config::EnginePolicy;
use crate::error::{ForecastError, Result};
use crate::models::ForecastPoint;

/// `E|X| / sigma` for a normal variable
const MEAN_ABS_DEVIATION_RATIO: f64 = 0.797_884_560_802_865_4;

/// Accuracy and quality of one model's forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetrics {
    /// Mean Absolute Percentage Error, in percent
    pub mape: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Model confidence in percent
    pub confidence: f64,
    /// Coefficient of determination; negative for fits worse than the mean
    pub r_squared: f64,
    /// Composite ranking value in [0, 100]
    pub quality_score: f64,
}

impl ModelMetrics {
    /// Metrics reported when there is no forecast at all
    pub fn empty() -> Self {
        Self {
            mape: 0.0,
            mae: 0.0,
            rmse: 0.0,
            confidence: 0.0,
            r_squared: 0.0,
            quality_score: 0.0,
        }
    }

    fn is_finite(&self) -> bool {
        [
            self.mape,
            self.mae,
            self.rmse,
            self.confidence,
            self.r_squared,
            self.quality_score,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

impl std::fmt::Display for ModelMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Model Metrics:")?;
        writeln!(f, "  MAPE:       {:.4}%", self.mape)?;
        writeln!(f, "  MAE:        {:.4}", self.mae)?;
        writeln!(f, "  RMSE:       {:.4}", self.rmse)?;
        writeln!(f, "  R-squared:  {:.4}", self.r_squared)?;
        writeln!(f, "  Confidence: {:.2}%", self.confidence)?;
        writeln!(f, "  Quality:    {:.2}", self.quality_score)?;
        Ok(())
    }
}

fn paired(actual: &[f64], predicted: &[f64]) -> bool {
    !actual.is_empty() && actual.len() == predicted.len()
}

/// Mean Absolute Error
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if !paired(actual, predicted) {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Mean Squared Error
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if !paired(actual, predicted) {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}

/// Root Mean Squared Error
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    mean_squared_error(actual, predicted).sqrt()
}

/// Mean Absolute Percentage Error in percent.
///
/// Days with a zero actual carry no percentage error and are left out; if
/// every actual is zero the result is 0 for an all-zero forecast and 100
/// otherwise.
pub fn mean_absolute_percentage_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if !paired(actual, predicted) {
        return f64::NAN;
    }

    let (sum, count) = actual
        .iter()
        .zip(predicted)
        .filter(|(a, _)| a.abs() > f64::EPSILON)
        .fold((0.0, 0usize), |(sum, count), (a, p)| {
            (sum + ((a - p) / a).abs(), count + 1)
        });

    if count == 0 {
        return if predicted.iter().all(|p| p.abs() <= f64::EPSILON) {
            0.0
        } else {
            100.0
        };
    }
    sum / count as f64 * 100.0
}

/// Coefficient of determination of `predicted` against `actual`.
///
/// A constant actual series has no variance to explain: an exact forecast
/// scores 1, anything else 0.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    if !paired(actual, predicted) {
        return f64::NAN;
    }

    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_total: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_residual: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    let scale = mean.abs().max(1.0).powi(2) * 1e-12 * actual.len() as f64;
    if ss_total <= scale {
        return if ss_residual <= scale { 1.0 } else { 0.0 };
    }
    1.0 - ss_residual / ss_total
}

/// Weighted blend of confidence, fit and error:
/// `0.4 * confidence + 0.3 * 100 * max(0, r2) + 0.3 * (100 - min(mape, 100))`
pub fn quality_score(confidence: f64, r_squared: f64, mape: f64) -> f64 {
    let fit = 100.0 * r_squared.clamp(0.0, 1.0);
    let accuracy = 100.0 - mape.clamp(0.0, 100.0);
    (0.4 * confidence.clamp(0.0, 100.0) + 0.3 * fit + 0.3 * accuracy).clamp(0.0, 100.0)
}

/// Two-sided standard normal quantile for a prediction band of `level` coverage
pub fn interval_z_score(level: f64) -> Result<f64> {
    if !(level > 0.0 && level < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "Interval level must be between 0 and 1, got {}",
            level
        )));
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| ForecastError::Numerical(e.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + level / 2.0))
}

/// Computes and validates [`ModelMetrics`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsCalculator {
    min_confidence: f64,
    max_confidence: f64,
    interval_level: f64,
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::new(&EnginePolicy::default())
    }
}

impl MetricsCalculator {
    pub fn new(policy: &EnginePolicy) -> Self {
        Self {
            min_confidence: policy.min_confidence,
            max_confidence: policy.max_confidence,
            interval_level: policy.interval_level,
        }
    }

    fn clamp_confidence(&self, confidence: f64) -> f64 {
        if confidence.is_nan() {
            return self.min_confidence;
        }
        confidence.clamp(self.min_confidence, self.max_confidence)
    }

    /// Metrics of a forecast of held-out days against what actually happened
    pub fn from_backtest(
        &self,
        predicted: &[f64],
        actual: &[f64],
        profile: &MarketProfile,
    ) -> Result<ModelMetrics> {
        if !paired(actual, predicted) {
            return Err(ForecastError::DataError(format!(
                "Backtest needs equal non-zero lengths, got {} predicted and {} actual",
                predicted.len(),
                actual.len()
            )));
        }

        let mape = mean_absolute_percentage_error(actual, predicted);
        let mae = mean_absolute_error(actual, predicted);
        let rmse = root_mean_squared_error(actual, predicted);
        let r2 = r_squared(actual, predicted).min(1.0);
        let confidence =
            self.clamp_confidence(100.0 - mape - 20.0 * profile.base_volatility);

        self.validate(ModelMetrics {
            mape,
            mae,
            rmse,
            confidence,
            r_squared: r2,
            quality_score: quality_score(confidence, r2, mape),
        })
    }

    /// Metrics a strategy reports about its own forecast.
    ///
    /// The expected percentage error is read off the prediction band (the
    /// band's half width is `z * sigma`), fit quality off the analyzer's
    /// volatility.
    pub fn internal_estimate(
        &self,
        forecasts: &[ForecastPoint],
        profile: &MarketProfile,
    ) -> Result<ModelMetrics> {
        if forecasts.is_empty() {
            return Ok(ModelMetrics {
                confidence: self.min_confidence,
                ..ModelMetrics::empty()
            });
        }

        let z = interval_z_score(self.interval_level)?;
        let relative_sigmas: Vec<f64> = forecasts
            .iter()
            .filter(|p| p.predicted > f64::EPSILON)
            .map(|p| (p.upper_bound - p.lower_bound) / 2.0 / z / p.predicted)
            .collect();
        let mean_sigma = if relative_sigmas.is_empty() {
            0.0
        } else {
            relative_sigmas.iter().sum::<f64>() / relative_sigmas.len() as f64
        };

        let n = forecasts.len() as f64;
        let mean_predicted = forecasts.iter().map(|p| p.predicted).sum::<f64>() / n;
        let mean_confidence = forecasts.iter().map(|p| p.confidence).sum::<f64>() / n;

        let mape = (mean_sigma * MEAN_ABS_DEVIATION_RATIO * 100.0).min(100.0);
        let mae = mape / 100.0 * mean_predicted;
        let rmse = mae / MEAN_ABS_DEVIATION_RATIO;
        let r2 = 1.0 - profile.base_volatility / PatternAnalyzer::MAX_VOLATILITY;
        let confidence = self.clamp_confidence(mean_confidence * (1.0 - profile.base_volatility));

        self.validate(ModelMetrics {
            mape,
            mae,
            rmse,
            confidence,
            r_squared: r2,
            quality_score: quality_score(confidence, r2, mape),
        })
    }

    /// Reject non-finite metrics and pull the rest back into range
    pub fn validate(&self, metrics: ModelMetrics) -> Result<ModelMetrics> {
        if !metrics.is_finite() {
            return Err(ForecastError::Numerical(format!(
                "Metrics contain non-finite values: {:?}",
                metrics
            )));
        }

        let confidence = self.clamp_confidence(metrics.confidence);
        let r2 = metrics.r_squared.min(1.0);
        let mape = metrics.mape.max(0.0);
        Ok(ModelMetrics {
            mape,
            mae: metrics.mae.max(0.0),
            rmse: metrics.rmse.max(0.0),
            confidence,
            r_squared: r2,
            quality_score: quality_score(confidence, r2, mape),
        })
    }
}
