//! Forecasting several business metrics at once
//!
//! Revenue, orders and profit are treated as independent series. They share
//! nothing, so they are forecast in parallel.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::data::{metric_series, DailyObservation, SalesMetric};
use crate::ensemble::{EnsembleForecast, EnsembleForecaster};

impl EnsembleForecaster {
    /// Forecast every [`SalesMetric`] of `observations`, one ensemble run per
    /// metric.
    ///
    /// Each metric is sanitized on its own, so a negative profit day drops out
    /// of the profit series without affecting revenue or orders.
    pub fn forecast_business_metrics(
        &self,
        observations: &[DailyObservation],
        horizon_days: usize,
    ) -> BTreeMap<SalesMetric, EnsembleForecast> {
        SalesMetric::ALL
            .as_slice()
            .par_iter()
            .map(|&metric| {
                let series = metric_series(observations, metric);
                let span = tracing::debug_span!("metric", %metric);
                let _enter = span.enter();
                (metric, self.forecast_series(&series, horizon_days))
            })
            .collect()
    }
}
