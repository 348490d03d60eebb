//! Stability guard
//!
//! Last pass over the winning forecast. Strategies clamp their own paths, but
//! the guard re-checks every invariant downstream consumers rely on and
//! repairs violations in place instead of reporting them as errors.

use serde::Serialize;

use crate::config::DailyBounds;
use crate::models::ForecastPoint;
use crate::utils::round_cents;

/// Relative slack tolerated before a day-over-day move counts as a breach
const BOUND_TOLERANCE: f64 = 1e-9;

/// Move from `previous` toward `candidate`, staying inside `bounds`.
///
/// The result is rounded to cents when rounding keeps it inside the bounds.
/// A non-finite candidate holds the previous value; a zero previous value
/// leaves the candidate unbounded (there is no base for a relative change).
pub fn bounded_step(previous: f64, candidate: f64, bounds: DailyBounds) -> f64 {
    let previous = if previous.is_finite() { previous.max(0.0) } else { 0.0 };
    let candidate = if candidate.is_finite() {
        candidate.max(0.0)
    } else {
        previous
    };

    if previous <= 0.0 {
        return round_cents(candidate);
    }

    let (low, high) = bounds.limits(previous);
    let low = low.max(0.0).min(high);
    let clamped = candidate.clamp(low, high);
    let rounded = round_cents(clamped);
    if rounded >= low && rounded <= high {
        rounded
    } else {
        clamped
    }
}

/// What the guard had to repair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardReport {
    /// Days whose prediction was pulled back inside the daily bounds
    pub clamped_days: usize,
    /// Days whose confidence rose above the previous day's and was lowered
    pub confidence_repairs: usize,
    /// Days whose band or component breakdown was inconsistent
    pub band_repairs: usize,
}

impl GuardReport {
    pub fn is_clean(&self) -> bool {
        self.clamped_days == 0 && self.confidence_repairs == 0 && self.band_repairs == 0
    }
}

/// Enforces bounded day-over-day change and non-increasing confidence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityGuard {
    bounds: DailyBounds,
}

impl StabilityGuard {
    pub fn new(bounds: DailyBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> DailyBounds {
        self.bounds
    }

    /// Repair `forecasts` in place.
    ///
    /// `anchor` is the last observed value; the first forecast day is
    /// bounded relative to it.
    pub fn apply(&self, anchor: f64, forecasts: &mut [ForecastPoint]) -> GuardReport {
        let mut report = GuardReport::default();
        let mut previous = anchor;
        let mut ceiling = 100.0_f64;

        for point in forecasts.iter_mut() {
            let within = point.predicted.is_finite()
                && point.predicted >= 0.0
                && self
                    .bounds
                    .contains(previous, point.predicted, BOUND_TOLERANCE);
            if !within {
                point.predicted = bounded_step(previous, point.predicted, self.bounds);
                report.clamped_days += 1;
            }

            let confidence = if point.confidence.is_finite() {
                point.confidence.clamp(0.0, 100.0)
            } else {
                0.0
            };
            if confidence > ceiling || confidence != point.confidence {
                report.confidence_repairs += 1;
            }
            point.confidence = confidence.min(ceiling);
            ceiling = point.confidence;

            if point.rebalance() {
                report.band_repairs += 1;
            }
            previous = point.predicted;
        }

        if !report.is_clean() {
            tracing::warn!(
                clamped = report.clamped_days,
                confidence = report.confidence_repairs,
                bands = report.band_repairs,
                "Stability guard repaired forecast"
            );
        }
        report
    }
}
