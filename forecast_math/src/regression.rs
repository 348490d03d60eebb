//! Least-squares trend fitting
//!
//! Fits `y = intercept + slope * x` over evenly spaced observations where
//! `x` is the observation index.

use crate::{MathError, Result};

/// Ordinary least-squares line fitted to an evenly spaced series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    slope: f64,
    intercept: f64,
    len: usize,
}

impl LinearFit {
    /// Fit a line through `values`, using each value's index as `x`
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.len() < 2 {
            return Err(MathError::InsufficientData(format!(
                "Linear fit needs at least 2 points, have {}",
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Linear fit input contains non-finite values".to_string(),
            ));
        }

        let n = values.len() as f64;
        let x_mean = (n - 1.0) / 2.0;
        let y_mean = values.iter().sum::<f64>() / n;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (i, &y) in values.iter().enumerate() {
            let dx = i as f64 - x_mean;
            numerator += dx * (y - y_mean);
            denominator += dx * dx;
        }

        if denominator.abs() < 1e-12 {
            return Err(MathError::CalculationError(
                "Cannot calculate slope: x values are too similar".to_string(),
            ));
        }

        let slope = numerator / denominator;
        let intercept = y_mean - slope * x_mean;

        Ok(Self {
            slope,
            intercept,
            len: values.len(),
        })
    }

    /// Change per observation step
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Fitted value at (possibly fractional, possibly out-of-sample) index `x`
    pub fn value_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Fitted value at the last observed index
    pub fn last_fitted(&self) -> f64 {
        self.value_at((self.len - 1) as f64)
    }

    /// Fitted values for every observed index
    pub fn fitted(&self) -> Vec<f64> {
        (0..self.len).map(|i| self.value_at(i as f64)).collect()
    }
}
