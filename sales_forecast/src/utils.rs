//! Utility functions for the sales_forecast crate

use chrono::{Days, NaiveDate};
use sha2::{Digest, Sha256};

use crate::error::{ForecastError, Result};

/// Calendar days following `last_date`, one per forecast day
pub fn future_dates(last_date: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    (1..=horizon as u64)
        .map(|offset| {
            last_date.checked_add_days(Days::new(offset)).ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "Forecast date {} days after {} is out of range",
                    offset, last_date
                ))
            })
        })
        .collect()
}

/// Deterministic RNG seed derived from the history values.
///
/// `salt` separates the streams of different strategies fed the same
/// history.
pub fn series_seed(values: &[f64], salt: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    for value in values {
        hasher.update(value.to_bits().to_le_bytes());
    }
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Number of trailing days to hold out for a backtest.
///
/// At most a quarter of the history, never more than `max_holdout`.
pub fn holdout_size(history_len: usize, max_holdout: usize) -> usize {
    (history_len / 4).min(max_holdout)
}

/// Round to two decimals
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round down to two decimals
pub fn floor_cents(value: f64) -> f64 {
    (value * 100.0).floor() / 100.0
}

/// Round up to two decimals
pub fn ceil_cents(value: f64) -> f64 {
    (value * 100.0).ceil() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_future_dates_are_consecutive() {
        let last = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        let dates = future_dates(last, 3).unwrap();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 2, 28).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            ]
        );
        assert!(future_dates(last, 0).unwrap().is_empty());
    }

    #[test]
    fn test_series_seed_is_stable_and_salted() {
        let values = [1.0, 2.0, 3.5];
        assert_eq!(series_seed(&values, "a"), series_seed(&values, "a"));
        assert_ne!(series_seed(&values, "a"), series_seed(&values, "b"));
        assert_ne!(series_seed(&values, "a"), series_seed(&[1.0, 2.0, 3.6], "a"));
    }

    #[test]
    fn test_holdout_size() {
        assert_eq!(holdout_size(100, 7), 7);
        assert_eq!(holdout_size(12, 7), 3);
        assert_eq!(holdout_size(3, 7), 0);
    }

    #[test]
    fn test_cent_rounding() {
        assert_eq!(round_cents(1.005_1), 1.01);
        assert_eq!(floor_cents(1.019), 1.01);
        assert_eq!(ceil_cents(1.011), 1.02);
    }
}
