//! Market-realistic (volatility-aware) strategy
//!
//! Grows the recent level by the analyzer's conservative trend, adds the
//! weekly pattern and a bounded multi-frequency fluctuation whose amplitude
//! fades with `exp(-day / 90)`. Each day may move at most the policy's bound
//! (+/-8% by default) from the *previous forecast day*, so the path behaves as
//! a controlled random walk rather than a curve hung off the base value.

use std::f64::consts::TAU;

use chrono::Datelike;
use forecast_math::statistics::trailing_mean;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

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

const LEVEL_WINDOW: usize = 7;
/// (period in days, weight) of each fluctuation frequency; weights sum to 1
const FLUCTUATIONS: [(f64, f64); 3] = [(7.0, 0.5), (30.0, 0.3), (3.5, 0.2)];
/// Fluctuation amplitude as a fraction of volatility
const FLUCTUATION_SCALE: f64 = 0.5;
const FLUCTUATION_DECAY_DAYS: f64 = 90.0;
const BAND_SCALE: f64 = 0.3;
const CONFIDENCE_DECAY_DAYS: f64 = 75.0;

/// Volatility-aware trend with a bounded random walk
#[derive(Debug, Clone)]
pub struct MarketRealistic {
    bounds: DailyBounds,
    interval_level: f64,
    min_confidence: f64,
    max_confidence: f64,
    calculator: MetricsCalculator,
}

impl Default for MarketRealistic {
    fn default() -> Self {
        Self::new(&EnginePolicy::default())
    }
}

impl MarketRealistic {
    pub fn new(policy: &EnginePolicy) -> Self {
        Self {
            bounds: policy.market_realistic_bounds,
            interval_level: policy.interval_level,
            min_confidence: policy.min_confidence,
            max_confidence: policy.max_confidence,
            calculator: MetricsCalculator::new(policy),
        }
    }
}

impl ForecastStrategy for MarketRealistic {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MarketRealistic
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
        let base = trailing_mean(&values, LEVEL_WINDOW);
        let daily_trend = profile.daily_trend();
        let weekly = profile.weekly_harmonic();
        let volatility = profile.base_volatility;

        let mut rng = StdRng::seed_from_u64(series_seed(&values, kind.name()));
        let phases: Vec<f64> = FLUCTUATIONS.iter().map(|_| rng.gen_range(0.0..TAU)).collect();

        let z = interval_z_score(self.interval_level)?;
        let base_confidence = 88.0 - 60.0 * volatility;

        let mut forecasts = Vec::with_capacity(horizon_days);
        let mut previous = last.value;
        for (i, date) in future_dates(last.date, horizon_days)?.into_iter().enumerate() {
            let day = i + 1;
            let t = day as f64;
            let trend = base * (1.0 + daily_trend).powf(t);
            let seasonal = trend * weekly.value_at(date.weekday().num_days_from_monday());

            let wave: f64 = FLUCTUATIONS
                .iter()
                .zip(&phases)
                .map(|(&(period, weight), phase)| weight * (TAU * t / period + phase).sin())
                .sum();
            let fluctuation =
                volatility * FLUCTUATION_SCALE * wave * (-t / FLUCTUATION_DECAY_DAYS).exp();

            let candidate = trend + seasonal + trend * fluctuation;
            let predicted = bounded_step(previous, candidate, self.bounds);
            let half_width = z * volatility * BAND_SCALE * t.sqrt() * predicted;
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
        tracing::trace!(strategy = %kind, base, daily_trend, days = forecasts.len(), "Forecast built");

        Ok(StrategyResult { forecasts, metrics })
    }
}
