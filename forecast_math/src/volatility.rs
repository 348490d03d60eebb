//! Volatility clustering
//!
//! A GARCH(1,1)-style recursion: the variance for the next step blends a
//! long-run floor, the square of the move just realised and the previous
//! variance estimate.
//!
//! `sigma2[t] = omega + alpha * r[t-1]^2 + beta * sigma2[t-1]`

use crate::{MathError, Result};

/// GARCH(1,1)-style variance recursion
#[derive(Debug, Clone, PartialEq)]
pub struct VolatilityClustering {
    omega: f64,
    alpha: f64,
    beta: f64,
    variance: f64,
}

impl VolatilityClustering {
    /// Create a recursion whose unconditional volatility is `long_run_volatility`.
    ///
    /// `alpha + beta` must stay below 1 for the recursion to mean-revert.
    pub fn new(long_run_volatility: f64, alpha: f64, beta: f64) -> Result<Self> {
        if !long_run_volatility.is_finite() || long_run_volatility < 0.0 {
            return Err(MathError::InvalidInput(
                "Long-run volatility must be a non-negative number".to_string(),
            ));
        }
        if alpha < 0.0 || beta < 0.0 || alpha + beta >= 1.0 {
            return Err(MathError::InvalidInput(format!(
                "GARCH parameters must be non-negative with alpha + beta < 1 (got {} + {})",
                alpha, beta
            )));
        }

        let long_run_variance = long_run_volatility.powi(2);
        Ok(Self {
            omega: (1.0 - alpha - beta) * long_run_variance,
            alpha,
            beta,
            variance: long_run_variance,
        })
    }

    /// Feed the move realised in the last step and return the next volatility
    pub fn update(&mut self, realized_move: f64) -> f64 {
        let shock = if realized_move.is_finite() {
            realized_move
        } else {
            0.0
        };
        self.variance = self.omega + self.alpha * shock.powi(2) + self.beta * self.variance;
        self.volatility()
    }

    /// Current volatility estimate (standard deviation)
    pub fn volatility(&self) -> f64 {
        self.variance.max(0.0).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_moves_revert_to_long_run() {
        let mut garch = VolatilityClustering::new(0.1, 0.1, 0.85).unwrap();
        for _ in 0..500 {
            garch.update(0.1);
        }
        assert!((garch.volatility() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_large_move_raises_volatility() {
        let mut garch = VolatilityClustering::new(0.05, 0.1, 0.85).unwrap();
        let before = garch.volatility();
        let after = garch.update(0.5);
        assert!(after > before);

        // and it decays back without further shocks
        let mut last = after;
        for _ in 0..10 {
            let next = garch.update(0.0);
            assert!(next < last);
            last = next;
        }
    }

    #[test]
    fn test_rejects_explosive_parameters() {
        assert!(VolatilityClustering::new(0.1, 0.5, 0.5).is_err());
        assert!(VolatilityClustering::new(-0.1, 0.1, 0.8).is_err());
    }
}
