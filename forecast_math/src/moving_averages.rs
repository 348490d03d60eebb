//! Rolling simple moving average
//!
//! Used as the trailing anchor that forecasts revert toward: it is seeded
//! from history and then fed each newly forecast value.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) implementation
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Create an SMA already primed with the tail of `history`
    pub fn seeded(period: usize, history: &[f64]) -> Result<Self> {
        let mut sma = Self::new(period)?;
        let start = history.len().saturating_sub(period);
        for &value in &history[start..] {
            sma.update(value)?;
        }
        Ok(sma)
    }

    /// Update the SMA with a new value
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "SMA input must be finite, got {}",
                value
            )));
        }

        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }

        Ok(())
    }

    /// Mean of the values currently in the window.
    ///
    /// A partially filled window averages what it has.
    pub fn value(&self) -> Result<f64> {
        if self.values.is_empty() {
            return Err(MathError::InsufficientData(
                "No data available for SMA calculation".to_string(),
            ));
        }

        Ok(self.sum / self.values.len() as f64)
    }
}
