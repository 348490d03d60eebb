//! Pattern analysis of historical series
//!
//! Derives the [`MarketProfile`] every strategy consumes: how volatile the
//! series is, how strongly it trends, which regime it is in and how large its
//! day-of-week swing is.

use forecast_math::statistics::{is_constant, mean, pct_returns, std_dev, trailing_mean};
use forecast_math::{LinearFit, WeeklyHarmonic};
use serde::{Deserialize, Serialize};

use crate::data::HistoricalPoint;
use crate::error::{ForecastError, Result};

/// Qualitative behaviour of the recent history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketRegime {
    Trending,
    Volatile,
    Ranging,
}

/// Statistical summary of a history, recomputed for every forecast request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketProfile {
    /// Standard deviation of daily returns, clamped to [0.05, 0.40]
    pub base_volatility: f64,
    /// Annualised growth rate, clamped to [-0.10, 0.15]
    pub trend_strength: f64,
    pub regime: MarketRegime,
    /// Relative amplitude of the weekly harmonic
    pub seasonal_amplitude: f64,
    /// Phase of the weekly harmonic in radians
    pub seasonal_phase: f64,
    /// Mean of the most recent week of observations
    pub reference_level: f64,
    /// Last observed value
    pub last_value: f64,
}

impl MarketProfile {
    /// Profile that assumes nothing: minimum volatility, no trend, no season
    pub fn neutral(level: f64) -> Self {
        Self {
            base_volatility: PatternAnalyzer::MIN_VOLATILITY,
            trend_strength: 0.0,
            regime: MarketRegime::Ranging,
            seasonal_amplitude: 0.0,
            seasonal_phase: 0.0,
            reference_level: level,
            last_value: level,
        }
    }

    /// Conservative per-day growth implied by the annualised trend
    pub fn daily_trend(&self) -> f64 {
        self.trend_strength / 365.0
    }

    /// Weekly harmonic described by this profile
    pub fn weekly_harmonic(&self) -> WeeklyHarmonic {
        WeeklyHarmonic::new(self.seasonal_amplitude, self.seasonal_phase)
    }
}

/// Derives a [`MarketProfile`] from a history
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternAnalyzer;

impl PatternAnalyzer {
    pub const MIN_VOLATILITY: f64 = 0.05;
    pub const MAX_VOLATILITY: f64 = 0.40;
    pub const MIN_TREND: f64 = -0.10;
    pub const MAX_TREND: f64 = 0.15;
    /// Observations compared on each side of the trend split
    pub const TREND_WINDOW: usize = 30;
    /// |trend| above which a series counts as trending
    pub const TRENDING_THRESHOLD: f64 = 0.05;
    /// Volatility at or above which a series counts as volatile
    pub const VOLATILE_THRESHOLD: f64 = 0.25;
    /// Observations averaged into the reference level
    pub const REFERENCE_WINDOW: usize = 7;
    /// Minimum observations before a weekly harmonic is fitted
    pub const SEASONAL_MIN_POINTS: usize = 7;

    /// Analyze `history`, falling back to a neutral profile when it is too
    /// short or degenerate. Never fails.
    pub fn analyze(history: &[HistoricalPoint]) -> MarketProfile {
        Self::try_analyze(history).unwrap_or_else(|err| {
            let level = history.last().map(|p| p.value).unwrap_or(0.0);
            tracing::debug!(error = %err, level, "Using neutral market profile");
            MarketProfile::neutral(level)
        })
    }

    /// Analyze `history`, reporting why a neutral profile would be needed
    pub fn try_analyze(history: &[HistoricalPoint]) -> Result<MarketProfile> {
        if history.len() < 2 {
            return Err(ForecastError::InsufficientData {
                strategy: "pattern analysis".to_string(),
                required: 2,
                available: history.len(),
            });
        }

        let values: Vec<f64> = history.iter().map(|p| p.value).collect();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::Numerical(
                "History contains non-finite values".to_string(),
            ));
        }
        let scale = values.iter().fold(1.0_f64, |acc, v| acc.max(v.abs()));
        if is_constant(&values, 1e-9 * scale) {
            return Err(ForecastError::DegenerateSeries(format!(
                "all {} observations equal {}",
                values.len(),
                values[0]
            )));
        }

        let base_volatility = Self::volatility(&values);
        let trend_strength = Self::trend_strength(&values);
        let harmonic = Self::weekly_seasonality(history);
        let last_value = values[values.len() - 1];

        let profile = MarketProfile {
            base_volatility,
            trend_strength,
            regime: Self::classify(trend_strength, base_volatility),
            seasonal_amplitude: harmonic.amplitude(),
            seasonal_phase: harmonic.phase(),
            reference_level: trailing_mean(&values, Self::REFERENCE_WINDOW),
            last_value,
        };
        tracing::debug!(
            volatility = profile.base_volatility,
            trend = profile.trend_strength,
            regime = ?profile.regime,
            seasonal = profile.seasonal_amplitude,
            "Market profile analyzed"
        );
        Ok(profile)
    }

    /// Standard deviation of daily returns, clamped to the plausible range
    pub fn volatility(values: &[f64]) -> f64 {
        let returns = pct_returns(values);
        std_dev(&returns).clamp(Self::MIN_VOLATILITY, Self::MAX_VOLATILITY)
    }

    /// Annualised growth between the latest window and the one before it.
    ///
    /// The window is 30 observations, or half the history when shorter.
    pub fn trend_strength(values: &[f64]) -> f64 {
        let window = Self::TREND_WINDOW.min(values.len() / 2);
        if window == 0 {
            return 0.0;
        }

        let end = values.len();
        let recent = mean(&values[end - window..]);
        let prior = mean(&values[end - 2 * window..end - window]);

        let annualised = if prior.abs() < f64::EPSILON {
            if recent > 0.0 {
                Self::MAX_TREND
            } else {
                0.0
            }
        } else {
            let growth = (recent - prior) / prior;
            growth / window as f64 * 365.0
        };

        if annualised.is_finite() {
            annualised.clamp(Self::MIN_TREND, Self::MAX_TREND)
        } else {
            0.0
        }
    }

    /// Regime from trend strength first, then volatility
    pub fn classify(trend_strength: f64, base_volatility: f64) -> MarketRegime {
        if trend_strength.abs() > Self::TRENDING_THRESHOLD {
            MarketRegime::Trending
        } else if base_volatility >= Self::VOLATILE_THRESHOLD {
            MarketRegime::Volatile
        } else {
            MarketRegime::Ranging
        }
    }

    /// Weekly harmonic of the residuals left after removing a linear trend
    pub fn weekly_seasonality(history: &[HistoricalPoint]) -> WeeklyHarmonic {
        if history.len() < Self::SEASONAL_MIN_POINTS {
            return WeeklyHarmonic::flat();
        }

        let values: Vec<f64> = history.iter().map(|p| p.value).collect();
        let Ok(trend) = LinearFit::fit(&values) else {
            return WeeklyHarmonic::flat();
        };

        let residuals: Vec<f64> = values
            .iter()
            .zip(trend.fitted())
            .map(|(&actual, fitted)| {
                if fitted > f64::EPSILON {
                    (actual - fitted) / fitted
                } else {
                    0.0
                }
            })
            .collect();
        let weekdays: Vec<u32> = history.iter().map(HistoricalPoint::weekday).collect();

        WeeklyHarmonic::fit(&residuals, &weekdays).unwrap_or_else(|_| WeeklyHarmonic::flat())
    }
}
