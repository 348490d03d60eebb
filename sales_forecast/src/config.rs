//! Engine policy
//!
//! Every constant that shapes a forecast (clamp bounds, the scoring bonus,
//! confidence limits, the backtest holdout) lives in [`EnginePolicy`]. The
//! defaults are the engine's fixed policy; a policy is built once and handed to
//! the [`EnsembleForecaster`](crate::ensemble::EnsembleForecaster) constructor,
//! never read from global state.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::models::StrategyKind;

/// Permitted relative change of a forecast from one day to the next
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBounds {
    /// Largest allowed decline, as a negative fraction (e.g. `-0.10`)
    pub max_decline: f64,
    /// Largest allowed growth, as a positive fraction (e.g. `0.15`)
    pub max_growth: f64,
}

impl DailyBounds {
    pub const fn new(max_decline: f64, max_growth: f64) -> Self {
        Self {
            max_decline,
            max_growth,
        }
    }

    /// Symmetric bounds of `+/- limit`
    pub const fn symmetric(limit: f64) -> Self {
        Self::new(-limit, limit)
    }

    /// Lowest and highest value reachable from `previous`
    pub fn limits(&self, previous: f64) -> (f64, f64) {
        (
            previous * (1.0 + self.max_decline),
            previous * (1.0 + self.max_growth),
        )
    }

    /// Whether the move from `previous` to `next` stays inside the bounds,
    /// allowing `tolerance` of relative slack.
    pub fn contains(&self, previous: f64, next: f64, tolerance: f64) -> bool {
        if previous <= 0.0 {
            return true;
        }
        let change = (next - previous) / previous;
        change >= self.max_decline - tolerance && change <= self.max_growth + tolerance
    }

    fn validate(&self, label: &str) -> Result<()> {
        let ordered = self.max_decline <= 0.0 && self.max_growth >= 0.0;
        if !ordered || self.max_decline <= -1.0 || !self.max_growth.is_finite() {
            return Err(ForecastError::ConfigError(format!(
                "{} must satisfy -1 < max_decline <= 0 <= max_growth (got {} / {})",
                label, self.max_decline, self.max_growth
            )));
        }
        Ok(())
    }
}

/// Fixed forecasting policy injected into the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnginePolicy {
    /// Score multiplier applied to the natural-fluctuation strategy
    pub natural_fluctuation_bonus: f64,
    /// Daily move limits for the simple trend forecast
    pub simple_trend_bounds: DailyBounds,
    /// Daily move limits for the market realistic forecast
    pub market_realistic_bounds: DailyBounds,
    /// Daily move limits for the natural fluctuation forecast
    pub natural_fluctuation_bounds: DailyBounds,
    /// Lowest model confidence ever reported (percent)
    pub min_confidence: f64,
    /// Highest model confidence ever reported (percent)
    pub max_confidence: f64,
    /// Upper limit on days held out for backtesting
    pub holdout_days: usize,
    /// Coverage of the lower/upper prediction band
    pub interval_level: f64,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            natural_fluctuation_bonus: 1.15,
            simple_trend_bounds: DailyBounds::new(-0.10, 0.15),
            market_realistic_bounds: DailyBounds::symmetric(0.08),
            natural_fluctuation_bounds: DailyBounds::new(-0.30, 0.40),
            min_confidence: 10.0,
            max_confidence: 95.0,
            holdout_days: 7,
            interval_level: 0.95,
        }
    }
}

impl EnginePolicy {
    /// Parse a policy from TOML; omitted keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let policy: EnginePolicy = toml::from_str(source)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load a policy from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source).map_err(|e| match e {
            ForecastError::ConfigError(msg) => {
                ForecastError::ConfigError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Check the policy for values that would break forecast invariants
    pub fn validate(&self) -> Result<()> {
        if !(self.natural_fluctuation_bonus > 0.0 && self.natural_fluctuation_bonus.is_finite()) {
            return Err(ForecastError::ConfigError(format!(
                "natural_fluctuation_bonus must be positive, got {}",
                self.natural_fluctuation_bonus
            )));
        }
        self.simple_trend_bounds.validate("simple_trend_bounds")?;
        self.market_realistic_bounds
            .validate("market_realistic_bounds")?;
        self.natural_fluctuation_bounds
            .validate("natural_fluctuation_bounds")?;

        if !(0.0..=100.0).contains(&self.min_confidence)
            || !(0.0..=100.0).contains(&self.max_confidence)
            || self.min_confidence > self.max_confidence
        {
            return Err(ForecastError::ConfigError(format!(
                "confidence limits must satisfy 0 <= min <= max <= 100 (got {} / {})",
                self.min_confidence, self.max_confidence
            )));
        }
        if !(self.interval_level > 0.5 && self.interval_level < 1.0) {
            return Err(ForecastError::ConfigError(format!(
                "interval_level must be in (0.5, 1), got {}",
                self.interval_level
            )));
        }
        Ok(())
    }

    /// Day-over-day bounds a strategy's output must respect
    pub fn bounds_for(&self, kind: StrategyKind) -> DailyBounds {
        match kind {
            StrategyKind::SimpleTrend => self.simple_trend_bounds,
            StrategyKind::MarketRealistic => self.market_realistic_bounds,
            StrategyKind::NaturalFluctuation => self.natural_fluctuation_bounds,
        }
    }

    /// Multiplier applied to a strategy's quality score during selection
    pub fn score_multiplier(&self, kind: StrategyKind) -> f64 {
        match kind {
            StrategyKind::NaturalFluctuation => self.natural_fluctuation_bonus,
            StrategyKind::SimpleTrend | StrategyKind::MarketRealistic => 1.0,
        }
    }
}
