//! Forecast strategies and the values they produce
//!
//! Every strategy implements [`ForecastStrategy`]. The set of strategies is
//! closed: [`StrategyKind`] names them and [`Strategy`] dispatches to them
//! with an exhaustive match.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analyzer::MarketProfile;
use crate::config::EnginePolicy;
use crate::data::SalesSeries;
use crate::error::{ForecastError, Result};
use crate::metrics::ModelMetrics;
use crate::utils::{ceil_cents, floor_cents, round_cents};

pub mod market_realistic;
pub mod natural_fluctuation;
pub mod simple_trend;

pub use market_realistic::MarketRealistic;
pub use natural_fluctuation::NaturalFluctuation;
pub use simple_trend::SimpleTrend;

/// Identifier of a forecasting strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrategyKind {
    SimpleTrend,
    MarketRealistic,
    NaturalFluctuation,
}

impl StrategyKind {
    /// All strategies, in selection order
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::SimpleTrend,
        StrategyKind::MarketRealistic,
        StrategyKind::NaturalFluctuation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::SimpleTrend => "SimpleTrend",
            StrategyKind::MarketRealistic => "MarketRealistic",
            StrategyKind::NaturalFluctuation => "NaturalFluctuation",
        }
    }

    /// Fewest history points the strategy will forecast from
    pub fn min_history(&self) -> usize {
        match self {
            StrategyKind::SimpleTrend => 2,
            StrategyKind::MarketRealistic | StrategyKind::NaturalFluctuation => 7,
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Breakdown of a prediction; the parts sum to the prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastComponents {
    pub trend: f64,
    pub seasonal: f64,
    /// Everything not explained by trend and season: volatility, momentum,
    /// and any clamping applied to the path
    pub residual: f64,
}

impl ForecastComponents {
    pub fn total(&self) -> f64 {
        self.trend + self.seasonal + self.residual
    }
}

/// One forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Confidence in percent
    pub confidence: f64,
    pub model: StrategyKind,
    pub components: ForecastComponents,
}

impl ForecastPoint {
    /// Build a point from its parts.
    ///
    /// `predicted` is floored at zero, the band is `predicted +/- half_width`
    /// (never below zero) and the residual absorbs whatever trend and season
    /// leave unexplained.
    pub fn assemble(
        date: NaiveDate,
        model: StrategyKind,
        trend: f64,
        seasonal: f64,
        predicted: f64,
        half_width: f64,
        confidence: f64,
    ) -> Self {
        let predicted = predicted.max(0.0);
        let half_width = half_width.abs();
        let trend = round_cents(trend);
        let seasonal = round_cents(seasonal);

        Self {
            date,
            predicted,
            lower_bound: floor_cents((predicted - half_width).max(0.0)).min(predicted),
            upper_bound: ceil_cents(predicted + half_width).max(predicted),
            confidence: confidence.clamp(0.0, 100.0),
            model,
            components: ForecastComponents {
                trend,
                seasonal,
                residual: round_cents(predicted - trend - seasonal),
            },
        }
    }

    /// Restore `lower <= predicted <= upper` and the component sum after
    /// `predicted` was changed. Returns whether anything had to move.
    pub fn rebalance(&mut self) -> bool {
        let mut changed = false;

        if !(self.lower_bound.is_finite() && self.lower_bound <= self.predicted) {
            self.lower_bound = self.predicted;
            changed = true;
        }
        if self.lower_bound < 0.0 {
            self.lower_bound = 0.0;
            changed = true;
        }
        if !(self.upper_bound.is_finite() && self.upper_bound >= self.predicted) {
            self.upper_bound = self.predicted;
            changed = true;
        }

        if (self.components.total() - self.predicted).abs() > 0.01 {
            self.components.residual =
                round_cents(self.predicted - self.components.trend - self.components.seasonal);
            changed = true;
        }

        changed
    }
}

/// Output of one strategy run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyResult {
    pub forecasts: Vec<ForecastPoint>,
    pub metrics: ModelMetrics,
}

impl StrategyResult {
    pub fn predicted_values(&self) -> Vec<f64> {
        self.forecasts.iter().map(|p| p.predicted).collect()
    }
}

/// Common interface for forecasting strategies
pub trait ForecastStrategy {
    /// Which strategy this is
    fn kind(&self) -> StrategyKind;

    /// Project `horizon_days` days past the end of `history`
    fn forecast(
        &self,
        history: &SalesSeries,
        horizon_days: usize,
        profile: &MarketProfile,
    ) -> Result<StrategyResult>;

    /// Fewest history points this strategy accepts
    fn min_history(&self) -> usize {
        self.kind().min_history()
    }

    fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// The closed set of strategies
#[derive(Debug, Clone)]
pub enum Strategy {
    SimpleTrend(SimpleTrend),
    MarketRealistic(MarketRealistic),
    NaturalFluctuation(NaturalFluctuation),
}

impl Strategy {
    /// Build the strategy `kind` configured by `policy`
    pub fn from_kind(kind: StrategyKind, policy: &EnginePolicy) -> Self {
        match kind {
            StrategyKind::SimpleTrend => Strategy::SimpleTrend(SimpleTrend::new(policy)),
            StrategyKind::MarketRealistic => {
                Strategy::MarketRealistic(MarketRealistic::new(policy))
            }
            StrategyKind::NaturalFluctuation => {
                Strategy::NaturalFluctuation(NaturalFluctuation::new(policy))
            }
        }
    }

    /// Every strategy, in selection order
    pub fn all(policy: &EnginePolicy) -> Vec<Self> {
        StrategyKind::ALL
            .iter()
            .map(|&kind| Self::from_kind(kind, policy))
            .collect()
    }
}

impl ForecastStrategy for Strategy {
    fn kind(&self) -> StrategyKind {
        match self {
            Strategy::SimpleTrend(s) => s.kind(),
            Strategy::MarketRealistic(s) => s.kind(),
            Strategy::NaturalFluctuation(s) => s.kind(),
        }
    }

    fn forecast(
        &self,
        history: &SalesSeries,
        horizon_days: usize,
        profile: &MarketProfile,
    ) -> Result<StrategyResult> {
        match self {
            Strategy::SimpleTrend(s) => s.forecast(history, horizon_days, profile),
            Strategy::MarketRealistic(s) => s.forecast(history, horizon_days, profile),
            Strategy::NaturalFluctuation(s) => s.forecast(history, horizon_days, profile),
        }
    }
}

/// Reject requests a strategy cannot serve
pub(crate) fn check_request(
    kind: StrategyKind,
    history: &SalesSeries,
    horizon_days: usize,
) -> Result<()> {
    if horizon_days == 0 {
        return Err(ForecastError::InvalidParameter(
            "horizon_days must be positive".to_string(),
        ));
    }
    if history.len() < kind.min_history() {
        return Err(ForecastError::InsufficientData {
            strategy: kind.name().to_string(),
            required: kind.min_history(),
            available: history.len(),
        });
    }
    Ok(())
}

/// Confidence for forecast day `day` (1-based): `base` decayed
/// exponentially with distance, kept inside `[floor, ceiling]`.
///
/// Non-increasing in `day` for any fixed arguments.
pub(crate) fn horizon_confidence(
    base: f64,
    day: usize,
    decay_days: f64,
    floor: f64,
    ceiling: f64,
) -> f64 {
    (base * (-(day as f64) / decay_days).exp()).clamp(floor, ceiling)
}

/// Error if any produced value is not a finite number
pub(crate) fn ensure_finite(kind: StrategyKind, forecasts: &[ForecastPoint]) -> Result<()> {
    match forecasts.iter().find(|p| {
        !(p.predicted.is_finite() && p.lower_bound.is_finite() && p.upper_bound.is_finite())
    }) {
        Some(bad) => Err(ForecastError::Numerical(format!(
            "{} produced a non-finite value on {}",
            kind, bad.date
        ))),
        None => Ok(()),
    }
}
