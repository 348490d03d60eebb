//! Descriptive statistics over plain value slices
//!
//! Thin wrappers around `statrs` that return `0.0` instead of `NaN` for
//! inputs too short to carry a statistic, which is what every caller in the
//! engine wants.

use statrs::statistics::Statistics;

/// Arithmetic mean, `0.0` for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().mean()
}

/// Sample standard deviation, `0.0` for fewer than two values
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sd = values.iter().std_dev();
    if sd.is_finite() {
        sd
    } else {
        0.0
    }
}

/// Simple day-over-day returns `(v[i] - v[i-1]) / v[i-1]`.
///
/// Pairs whose previous value is zero (or not finite) carry no return and are
/// skipped rather than producing an infinite value.
pub fn pct_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter(|w| w[0].is_finite() && w[0].abs() > f64::EPSILON && w[1].is_finite())
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Mean of the last `window` values (or all of them if fewer)
pub fn trailing_mean(values: &[f64], window: usize) -> f64 {
    if values.is_empty() || window == 0 {
        return 0.0;
    }
    let start = values.len().saturating_sub(window);
    mean(&values[start..])
}

/// True when every value equals the first one within `tolerance`
pub fn is_constant(values: &[f64], tolerance: f64) -> bool {
    match values.first() {
        Some(&first) => values.iter().all(|v| (v - first).abs() <= tolerance),
        None => true,
    }
}
