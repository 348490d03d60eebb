//! Simple trend strategy
//!
//! Linear extrapolation of the recent trend with a small fixed weekly swing
//! and Gaussian noise that shrinks with the horizon. Works from as few as two
//! observations, which makes it the ensemble's fallback.

use chrono::Datelike;
use forecast_math::seasonality::weekday_angle;
use forecast_math::LinearFit;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::analyzer::MarketProfile;
use crate::config::{DailyBounds, EnginePolicy};
use crate::data::SalesSeries;
use crate::error::{ForecastError, Result};
use crate::metrics::{interval_z_score, MetricsCalculator};
use crate::models::{
    check_request, ensure_finite, horizon_confidence, ForecastPoint, ForecastStrategy,
    StrategyKind, StrategyResult,
};
use crate::stability::bounded_step;
use crate::utils::{future_dates, series_seed};

/// Observations the trend line is fitted over
const FIT_WINDOW: usize = 30;
/// Relative amplitude of the fixed weekly swing
const WEEKLY_AMPLITUDE: f64 = 0.01;
/// Noise standard deviation as a fraction of the analyzer's volatility
const NOISE_SCALE: f64 = 0.25;
const NOISE_DECAY_DAYS: f64 = 30.0;
/// Band standard deviation per sqrt(day), as a fraction of volatility
const BAND_SCALE: f64 = 0.35;
const CONFIDENCE_DECAY_DAYS: f64 = 60.0;

/// Linear trend extrapolation
#[derive(Debug, Clone)]
pub struct SimpleTrend {
    bounds: DailyBounds,
    interval_level: f64,
    min_confidence: f64,
    max_confidence: f64,
    calculator: MetricsCalculator,
}

impl Default for SimpleTrend {
    fn default() -> Self {
        Self::new(&EnginePolicy::default())
    }
}

impl SimpleTrend {
    pub fn new(policy: &EnginePolicy) -> Self {
        Self {
            bounds: policy.simple_trend_bounds,
            interval_level: policy.interval_level,
            min_confidence: policy.min_confidence,
            max_confidence: policy.max_confidence,
            calculator: MetricsCalculator::new(policy),
        }
    }
}

impl ForecastStrategy for SimpleTrend {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SimpleTrend
    }

    fn forecast(
        &self,
        history: &SalesSeries,
        horizon_days: usize,
        profile: &MarketProfile,
    ) -> Result<StrategyResult> {
        let kind = self.kind();
        check_request(kind, history, horizon_days)?;
        let last = history
            .last()
            .ok_or_else(|| ForecastError::DataError("Empty history".to_string()))?;

        let values = history.values();
        let window = &values[values.len().saturating_sub(FIT_WINDOW)..];
        let fit = LinearFit::fit(window)?;
        let base = fit.last_fitted().max(0.0);
        let slope = fit.slope();

        let volatility = profile.base_volatility;
        let z = interval_z_score(self.interval_level)?;
        let base_confidence = 90.0 - 50.0 * volatility;
        let mut rng = StdRng::seed_from_u64(series_seed(&values, kind.name()));

        let mut forecasts = Vec::with_capacity(horizon_days);
        let mut previous = last.value;
        for (i, date) in future_dates(last.date, horizon_days)?.into_iter().enumerate() {
            let day = i + 1;
            let trend = (base + slope * day as f64).max(0.0);
            let weekday = date.weekday().num_days_from_monday();
            let seasonal = trend * WEEKLY_AMPLITUDE * weekday_angle(weekday).sin();

            let shock: f64 = rng.sample(StandardNormal);
            let noise = shock
                * volatility
                * NOISE_SCALE
                * (-(day as f64) / NOISE_DECAY_DAYS).exp()
                * trend;

            let predicted = bounded_step(previous, trend + seasonal + noise, self.bounds);
            let half_width = z * volatility * BAND_SCALE * (day as f64).sqrt() * predicted;
            let confidence = horizon_confidence(
                base_confidence,
                day,
                CONFIDENCE_DECAY_DAYS,
                self.min_confidence,
                self.max_confidence,
            );

            forecasts.push(ForecastPoint::assemble(
                date, kind, trend, seasonal, predicted, half_width, confidence,
            ));
            previous = predicted;
        }

        ensure_finite(kind, &forecasts)?;
        let metrics = self.calculator.internal_estimate(&forecasts, profile)?;
        tracing::trace!(strategy = %kind, slope, base, days = forecasts.len(), "Forecast built");

        Ok(StrategyResult { forecasts, metrics })
    }
}
