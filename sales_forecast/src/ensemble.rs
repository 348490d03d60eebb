//! Ensemble model selection
//!
//! Runs every strategy against the same history, scores each one (on a
//! backtest against the most recent days when the history allows it) and
//! keeps the best forecast. The selector never returns an error: strategy
//! failures and panics become entries in the comparison table, and when
//! nothing works the result is an empty forecast.

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use crate::analyzer::{MarketProfile, PatternAnalyzer};
use crate::config::EnginePolicy;
use crate::data::{HistoricalPoint, SalesSeries};
use crate::error::{ForecastError, Result};
use crate::metrics::{MetricsCalculator, ModelMetrics};
use crate::models::{
    ForecastPoint, ForecastStrategy, SimpleTrend, Strategy, StrategyKind, StrategyResult,
};
use crate::stability::StabilityGuard;
use crate::utils::holdout_size;

/// Name reported as the best model when no forecast could be produced
pub const NO_MODEL: &str = "None";

/// One row of the model comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelComparison {
    pub name: String,
    /// Selection score (quality score times the strategy's multiplier)
    pub score: f64,
    pub metrics: Option<ModelMetrics>,
    pub error: Option<String>,
}

impl ModelComparison {
    fn success(kind: StrategyKind, score: f64, metrics: ModelMetrics) -> Self {
        Self {
            name: kind.name().to_string(),
            score,
            metrics: Some(metrics),
            error: None,
        }
    }

    fn failure(kind: StrategyKind, error: &ForecastError) -> Self {
        Self {
            name: kind.name().to_string(),
            score: 0.0,
            metrics: None,
            error: Some(error.to_string()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Totals over the chosen forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSummary {
    pub horizon_days: usize,
    pub total_predicted: f64,
    pub average_daily: f64,
    /// Change of the final forecast day against the last observation, percent
    pub expected_change_pct: f64,
    pub average_confidence: f64,
}

impl ForecastSummary {
    fn from_forecasts(forecasts: &[ForecastPoint], last_value: f64) -> Option<Self> {
        let final_day = forecasts.last()?;
        let n = forecasts.len() as f64;
        let total_predicted: f64 = forecasts.iter().map(|p| p.predicted).sum();
        let expected_change_pct = if last_value > f64::EPSILON {
            (final_day.predicted - last_value) / last_value * 100.0
        } else {
            0.0
        };

        Some(Self {
            horizon_days: forecasts.len(),
            total_predicted,
            average_daily: total_predicted / n,
            expected_change_pct,
            average_confidence: forecasts.iter().map(|p| p.confidence).sum::<f64>() / n,
        })
    }
}

/// Result of an ensemble forecast request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsembleForecast {
    pub forecasts: Vec<ForecastPoint>,
    pub metrics: ModelMetrics,
    pub best_model: String,
    pub model_comparison: Vec<ModelComparison>,
    pub summary: Option<ForecastSummary>,
    pub profile: Option<MarketProfile>,
}

impl EnsembleForecast {
    fn empty(model_comparison: Vec<ModelComparison>, profile: Option<MarketProfile>) -> Self {
        Self {
            forecasts: Vec::new(),
            metrics: ModelMetrics::empty(),
            best_model: NO_MODEL.to_string(),
            model_comparison,
            summary: None,
            profile,
        }
    }

    /// Whether a strategy produced the forecast
    pub fn has_forecast(&self) -> bool {
        !self.forecasts.is_empty()
    }
}

struct Candidate {
    kind: StrategyKind,
    score: f64,
    result: StrategyResult,
}

/// Runs all strategies and keeps the best
#[derive(Debug, Clone)]
pub struct EnsembleForecaster {
    policy: EnginePolicy,
    strategies: Vec<Strategy>,
    calculator: MetricsCalculator,
}

impl Default for EnsembleForecaster {
    fn default() -> Self {
        Self::build(EnginePolicy::default())
    }
}

impl EnsembleForecaster {
    /// Forecaster with the default engine policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Forecaster with a custom policy, rejected if it fails validation
    pub fn with_policy(policy: EnginePolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self::build(policy))
    }

    fn build(policy: EnginePolicy) -> Self {
        Self {
            strategies: Strategy::all(&policy),
            calculator: MetricsCalculator::new(&policy),
            policy,
        }
    }

    pub fn policy(&self) -> &EnginePolicy {
        &self.policy
    }

    /// Forecast `horizon_days` days past the end of `history`.
    ///
    /// The history is sanitized first (invalid values dropped, sorted, last
    /// duplicate kept).
    pub fn forecast(&self, history: &[HistoricalPoint], horizon_days: usize) -> EnsembleForecast {
        let series = SalesSeries::sanitize(history.iter().copied());
        self.forecast_series(&series, horizon_days)
    }

    /// Forecast an already validated series
    pub fn forecast_series(&self, series: &SalesSeries, horizon_days: usize) -> EnsembleForecast {
        if series.len() < 2 || horizon_days == 0 {
            let error = if horizon_days == 0 {
                ForecastError::InvalidParameter("horizon_days must be positive".to_string())
            } else {
                ForecastError::InsufficientData {
                    strategy: "ensemble".to_string(),
                    required: 2,
                    available: series.len(),
                }
            };
            tracing::info!(points = series.len(), horizon_days, error = %error, "Nothing to forecast");
            let comparison = self
                .strategies
                .iter()
                .map(|s| ModelComparison::failure(s.kind(), &error))
                .collect();
            return EnsembleForecast::empty(comparison, None);
        }

        let profile = PatternAnalyzer::analyze(series.points());
        let mut comparison = Vec::with_capacity(self.strategies.len());
        let mut best: Option<Candidate> = None;

        for strategy in &self.strategies {
            let kind = strategy.kind();
            match self.evaluate(strategy, series, horizon_days, &profile) {
                Ok(candidate) => {
                    tracing::debug!(
                        strategy = %kind,
                        score = candidate.score,
                        mape = candidate.result.metrics.mape,
                        "Strategy scored"
                    );
                    comparison.push(ModelComparison::success(
                        kind,
                        candidate.score,
                        candidate.result.metrics,
                    ));
                    // Strictly greater: ties keep the earlier strategy
                    if best.as_ref().map_or(true, |b| candidate.score > b.score) {
                        best = Some(candidate);
                    }
                }
                Err(error) => {
                    tracing::warn!(strategy = %kind, error = %error, "Strategy failed");
                    comparison.push(ModelComparison::failure(kind, &error));
                }
            }
        }

        let chosen = match best {
            Some(candidate) => candidate,
            None => match self.fallback(series, horizon_days, &profile) {
                Ok(candidate) => candidate,
                Err(error) => {
                    let error = ForecastError::AllStrategiesFailed(error.to_string());
                    tracing::error!(error = %error, "No forecast produced");
                    return EnsembleForecast::empty(comparison, Some(profile));
                }
            },
        };

        let Candidate {
            kind, mut result, ..
        } = chosen;
        let guard = StabilityGuard::new(self.policy.bounds_for(kind));
        let anchor = series.last().map(|p| p.value).unwrap_or(0.0);
        guard.apply(anchor, &mut result.forecasts);

        tracing::info!(
            best_model = %kind,
            quality = result.metrics.quality_score,
            days = result.forecasts.len(),
            "Ensemble forecast selected"
        );

        EnsembleForecast {
            summary: ForecastSummary::from_forecasts(&result.forecasts, anchor),
            forecasts: result.forecasts,
            metrics: result.metrics,
            best_model: kind.name().to_string(),
            model_comparison: comparison,
            profile: Some(profile),
        }
    }

    /// Run one strategy and score it, turning panics into errors
    fn evaluate(
        &self,
        strategy: &Strategy,
        series: &SalesSeries,
        horizon_days: usize,
        profile: &MarketProfile,
    ) -> Result<Candidate> {
        let kind = strategy.kind();
        if series.len() < strategy.min_history() {
            return Err(ForecastError::InsufficientData {
                strategy: kind.name().to_string(),
                required: strategy.min_history(),
                available: series.len(),
            });
        }

        let result = isolate(kind, || strategy.forecast(series, horizon_days, profile))?;
        let metrics = match self.backtest(strategy, series) {
            Some(Ok(metrics)) => metrics,
            Some(Err(error)) => {
                tracing::debug!(strategy = %kind, error = %error, "Backtest failed, using self-reported metrics");
                self.calculator.validate(result.metrics)?
            }
            None => self.calculator.validate(result.metrics)?,
        };

        Ok(Candidate {
            kind,
            score: metrics.quality_score * self.policy.score_multiplier(kind),
            result: StrategyResult {
                forecasts: result.forecasts,
                metrics,
            },
        })
    }

    /// Forecast the held-out tail from the rest of the history and measure
    /// it. `None` when the history is too short to hold anything out.
    fn backtest(&self, strategy: &Strategy, series: &SalesSeries) -> Option<Result<ModelMetrics>> {
        let holdout = holdout_size(series.len(), self.policy.holdout_days);
        if holdout < 2 || series.len() - holdout < strategy.min_history() {
            return None;
        }
        let (train, actual) = series.split_holdout(holdout)?;
        Some(self.score_holdout(strategy, &train, &actual))
    }

    fn score_holdout(
        &self,
        strategy: &Strategy,
        train: &SalesSeries,
        actual: &[f64],
    ) -> Result<ModelMetrics> {
        let train_profile = PatternAnalyzer::analyze(train.points());
        let result = isolate(strategy.kind(), || {
            strategy.forecast(train, actual.len(), &train_profile)
        })?;
        self.calculator
            .from_backtest(&result.predicted_values(), actual, &train_profile)
    }

    /// Raw simple trend with its self-reported metrics.
    ///
    /// Reached only after the selection loop's own simple trend run failed on
    /// the same input, so in practice this ends in `AllStrategiesFailed`.
    fn fallback(
        &self,
        series: &SalesSeries,
        horizon_days: usize,
        profile: &MarketProfile,
    ) -> Result<Candidate> {
        let kind = StrategyKind::SimpleTrend;
        tracing::warn!(points = series.len(), "All strategies failed, falling back to {}", kind);
        let strategy = SimpleTrend::new(&self.policy);
        let result = isolate(kind, || strategy.forecast(series, horizon_days, profile))?;
        let metrics = self.calculator.validate(result.metrics)?;
        Ok(Candidate {
            kind,
            score: metrics.quality_score,
            result: StrategyResult {
                forecasts: result.forecasts,
                metrics,
            },
        })
    }
}

/// Run a strategy call, converting a panic into a [`ForecastError`]
fn isolate<F>(kind: StrategyKind, run: F) -> Result<StrategyResult>
where
    F: FnOnce() -> Result<StrategyResult>,
{
    panic::catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(ForecastError::Numerical(format!(
            "{} panicked: {}",
            kind, message
        )))
    })
}
