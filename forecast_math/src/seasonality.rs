//! Day-of-week harmonic fitting
//!
//! A first-order weekly harmonic models the day-of-week effect as
//! `a * sin(theta) + b * cos(theta)` with `theta = 2 * pi * weekday / 7`.

use std::f64::consts::TAU;

use crate::{MathError, Result};

/// Largest relative amplitude a weekly harmonic may report
pub const MAX_WEEKLY_AMPLITUDE: f64 = 0.5;

/// Fitted first-order weekly harmonic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyHarmonic {
    amplitude: f64,
    phase: f64,
}

impl WeeklyHarmonic {
    /// A harmonic with no weekly effect
    pub fn flat() -> Self {
        Self {
            amplitude: 0.0,
            phase: 0.0,
        }
    }

    /// Build a harmonic from a known amplitude and phase (radians)
    pub fn new(amplitude: f64, phase: f64) -> Self {
        Self {
            amplitude: amplitude.clamp(0.0, MAX_WEEKLY_AMPLITUDE),
            phase,
        }
    }

    /// Fit the harmonic to `residuals` observed on `weekdays` (0 = Monday).
    ///
    /// Solves the 2x2 normal equations for the sine and cosine coefficients so
    /// that unevenly covered weeks are handled correctly.
    pub fn fit(residuals: &[f64], weekdays: &[u32]) -> Result<Self> {
        if residuals.len() != weekdays.len() {
            return Err(MathError::InvalidInput(format!(
                "Residuals length ({}) doesn't match weekdays length ({})",
                residuals.len(),
                weekdays.len()
            )));
        }
        if residuals.len() < 3 {
            return Err(MathError::InsufficientData(format!(
                "Weekly harmonic needs at least 3 points, have {}",
                residuals.len()
            )));
        }

        let (mut ss, mut cc, mut sc, mut ys, mut yc) = (0.0, 0.0, 0.0, 0.0, 0.0);
        for (&r, &day) in residuals.iter().zip(weekdays) {
            let theta = weekday_angle(day);
            let (s, c) = theta.sin_cos();
            ss += s * s;
            cc += c * c;
            sc += s * c;
            ys += r * s;
            yc += r * c;
        }

        let det = ss * cc - sc * sc;
        if det.abs() < 1e-9 {
            // Too few distinct weekdays to separate sine from cosine.
            return Ok(Self::flat());
        }

        let a = (ys * cc - yc * sc) / det;
        let b = (yc * ss - ys * sc) / det;
        if !a.is_finite() || !b.is_finite() {
            return Err(MathError::CalculationError(
                "Weekly harmonic coefficients are not finite".to_string(),
            ));
        }

        Ok(Self::new(a.hypot(b), b.atan2(a)))
    }

    /// Relative amplitude of the weekly swing
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Phase offset in radians
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Relative seasonal effect for `weekday` (0 = Monday)
    pub fn value_at(&self, weekday: u32) -> f64 {
        self.amplitude * (weekday_angle(weekday) + self.phase).sin()
    }
}

/// Angle of a weekday on the weekly cycle
pub fn weekday_angle(weekday: u32) -> f64 {
    TAU * f64::from(weekday % 7) / 7.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_known_harmonic() {
        let truth = WeeklyHarmonic::new(0.2, 0.7);
        let weekdays: Vec<u32> = (0..28).map(|i| i % 7).collect();
        let residuals: Vec<f64> = weekdays.iter().map(|&d| truth.value_at(d)).collect();

        let fitted = WeeklyHarmonic::fit(&residuals, &weekdays).unwrap();
        assert!((fitted.amplitude() - 0.2).abs() < 1e-9);
        assert!((fitted.phase() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_flat_residuals_have_no_amplitude() {
        let weekdays: Vec<u32> = (0..14).map(|i| i % 7).collect();
        let fitted = WeeklyHarmonic::fit(&[0.0; 14], &weekdays).unwrap();
        assert!(fitted.amplitude() < 1e-12);
    }

    #[test]
    fn test_amplitude_is_capped() {
        let h = WeeklyHarmonic::new(3.0, 0.0);
        assert_eq!(h.amplitude(), MAX_WEEKLY_AMPLITUDE);
    }

    #[test]
    fn test_single_weekday_is_flat() {
        let fitted = WeeklyHarmonic::fit(&[0.1, 0.2, 0.3], &[2, 2, 2]).unwrap();
        assert_eq!(fitted, WeeklyHarmonic::flat());
    }

    #[test]
    fn test_length_mismatch() {
        assert!(WeeklyHarmonic::fit(&[0.1, 0.2, 0.3], &[0, 1]).is_err());
    }
}
