//! Natural fluctuation strategy
//!
//! Models the everyday texture of business activity on top of a trending
//! level:
//!
//! - five overlapping cycles (business week, marketing fortnight, operational
//!   month, half-week, quarter) with phases drawn from the series seed
//! - AR(1) momentum so good and bad days come in runs
//! - mean reversion toward an anchor that blends the trend with the trailing
//!   mean of the path itself
//! - volatility clustering, so calm and turbulent stretches alternate
//!
//! Day-over-day moves are clamped to the policy's bounds (-30% / +40% by
//! default). The relative deviation is read back from the clamped value so the
//! recursion never drifts away from what was actually emitted.

use std::f64::consts::TAU;

use chrono::Datelike;
use forecast_math::{SimpleMovingAverage, VolatilityClustering};
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

/// (period in days, weight) of each cycle
const CYCLES: [(f64, f64); 5] = [
    (7.0, 0.35),
    (14.0, 0.25),
    (30.4, 0.20),
    (3.5, 0.12),
    (91.0, 0.08),
];
const CYCLE_SCALE: f64 = 0.6;
const ANCHOR_WINDOW: usize = 14;
/// Share of the reversion anchor taken from the trend (the rest is the
/// trailing mean)
const ANCHOR_TREND_WEIGHT: f64 = 0.7;
const MOMENTUM_PERSISTENCE: f64 = 0.6;
const REVERSION_SPEED: f64 = 0.25;
/// Long-run shock volatility as a fraction of the analyzer's volatility
const SHOCK_SCALE: f64 = 0.15;
const CLUSTER_ALPHA: f64 = 0.10;
const CLUSTER_BETA: f64 = 0.85;
const BAND_SCALE: f64 = 0.4;
const CONFIDENCE_DECAY_DAYS: f64 = 45.0;

/// Multi-cycle forecast with momentum, mean reversion and volatility clustering
#[derive(Debug, Clone)]
pub struct NaturalFluctuation {
    bounds: DailyBounds,
    interval_level: f64,
    min_confidence: f64,
    max_confidence: f64,
    calculator: MetricsCalculator,
}

impl Default for NaturalFluctuation {
    fn default() -> Self {
        Self::new(&EnginePolicy::default())
    }
}

impl NaturalFluctuation {
    pub fn new(policy: &EnginePolicy) -> Self {
        Self {
            bounds: policy.natural_fluctuation_bounds,
            interval_level: policy.interval_level,
            min_confidence: policy.min_confidence,
            max_confidence: policy.max_confidence,
            calculator: MetricsCalculator::new(policy),
        }
    }
}

impl ForecastStrategy for NaturalFluctuation {
    fn kind(&self) -> StrategyKind {
        StrategyKind::NaturalFluctuation
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
        let mut anchor_mean = SimpleMovingAverage::seeded(ANCHOR_WINDOW, &values)?;
        let base = anchor_mean.value()?;
        let daily_trend = profile.daily_trend();
        let weekly = profile.weekly_harmonic();
        let volatility = profile.base_volatility;

        let mut rng = StdRng::seed_from_u64(series_seed(&values, kind.name()));
        let phases: Vec<f64> = CYCLES.iter().map(|_| rng.gen_range(0.0..TAU)).collect();
        let mut clustering =
            VolatilityClustering::new(volatility * SHOCK_SCALE, CLUSTER_ALPHA, CLUSTER_BETA)?;

        let z = interval_z_score(self.interval_level)?;
        let base_confidence = 85.0 - 50.0 * volatility;

        let mut forecasts = Vec::with_capacity(horizon_days);
        let mut previous = last.value;
        let mut momentum = 0.0_f64;
        let mut deviation = 0.0_f64;

        for (i, date) in future_dates(last.date, horizon_days)?.into_iter().enumerate() {
            let day = i + 1;
            let t = day as f64;
            let trend = base * (1.0 + daily_trend).powf(t);
            let seasonal_rel = weekly.value_at(date.weekday().num_days_from_monday());
            let cycles: f64 = volatility
                * CYCLE_SCALE
                * CYCLES
                    .iter()
                    .zip(&phases)
                    .map(|(&(period, weight), phase)| weight * (TAU * t / period + phase).sin())
                    .sum::<f64>();

            let anchor =
                ANCHOR_TREND_WEIGHT * trend + (1.0 - ANCHOR_TREND_WEIGHT) * anchor_mean.value()?;
            let target = if trend > f64::EPSILON {
                anchor / trend - 1.0
            } else {
                0.0
            };

            let shock: f64 = rng.sample(StandardNormal);
            momentum = MOMENTUM_PERSISTENCE * momentum + shock * clustering.volatility();
            let prior_deviation = deviation;
            deviation += momentum - REVERSION_SPEED * (deviation - target);

            let candidate = trend * (1.0 + seasonal_rel + cycles + deviation);
            let predicted = bounded_step(previous, candidate, self.bounds);
            if trend > f64::EPSILON {
                deviation = predicted / trend - 1.0 - seasonal_rel - cycles;
            }
            clustering.update(deviation - prior_deviation);
            anchor_mean.update(predicted)?;

            let half_width = z * volatility * BAND_SCALE * t.sqrt() * predicted;
            let confidence = horizon_confidence(
                base_confidence,
                day,
                CONFIDENCE_DECAY_DAYS,
                self.min_confidence,
                self.max_confidence,
            );

            forecasts.push(ForecastPoint::assemble(
                date,
                kind,
                trend,
                trend * seasonal_rel,
                predicted,
                half_width,
                confidence,
            ));
            previous = predicted;
        }

        ensure_finite(kind, &forecasts)?;
        let metrics = self.calculator.internal_estimate(&forecasts, profile)?;
        tracing::trace!(
            strategy = %kind,
            base,
            daily_trend,
            final_volatility = clustering.volatility(),
            days = forecasts.len(),
            "Forecast built"
        );

        Ok(StrategyResult { forecasts, metrics })
    }
}
