//! Daily business observations and validated series
//!
//! The ingestion layer hands the engine `{date, value}` points that are
//! supposed to be sorted and deduplicated already. [`SalesSeries::sanitize`]
//! re-checks that defensively; [`SalesSeries::new`] is the strict variant for
//! callers that want bad input rejected instead of repaired.

use std::collections::BTreeMap;
use std::io::Read;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// A single observed day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    /// Calendar day of the observation
    pub date: NaiveDate,
    /// Observed value (revenue, orders, profit ...)
    pub value: f64,
}

impl HistoricalPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }

    /// Build a point from an ISO `YYYY-MM-DD` date string
    pub fn parse(date: &str, value: f64) -> Result<Self> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|e| {
            ForecastError::DataError(format!("Invalid date '{}': {}", date, e))
        })?;
        Ok(Self { date, value })
    }

    /// Whether the value may be used for forecasting
    pub fn is_valid(&self) -> bool {
        self.value.is_finite() && self.value >= 0.0
    }

    /// Day of week, 0 = Monday
    pub fn weekday(&self) -> u32 {
        self.date.weekday().num_days_from_monday()
    }
}

/// Chronologically ordered, validated daily series
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SalesSeries {
    points: Vec<HistoricalPoint>,
}

impl SalesSeries {
    /// Strict constructor: rejects unsorted, duplicate, negative or
    /// non-finite input.
    pub fn new(points: Vec<HistoricalPoint>) -> Result<Self> {
        if let Some(bad) = points.iter().find(|p| !p.is_valid()) {
            return Err(ForecastError::DataError(format!(
                "Value {} on {} is not a finite non-negative number",
                bad.value, bad.date
            )));
        }
        if let Some(pair) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(ForecastError::DataError(format!(
                "Dates must be strictly increasing: {} follows {}",
                pair[1].date, pair[0].date
            )));
        }
        Ok(Self { points })
    }

    /// Repairing constructor.
    ///
    /// Drops invalid values, sorts by date and keeps the last observation for
    /// any duplicated date.
    pub fn sanitize<I>(points: I) -> Self
    where
        I: IntoIterator<Item = HistoricalPoint>,
    {
        let mut by_date = BTreeMap::new();
        let mut received = 0usize;
        let mut invalid = 0usize;

        for point in points {
            received += 1;
            if !point.is_valid() {
                invalid += 1;
                continue;
            }
            by_date.insert(point.date, point.value);
        }

        let points: Vec<HistoricalPoint> = by_date
            .into_iter()
            .map(|(date, value)| HistoricalPoint { date, value })
            .collect();

        let duplicates = received - invalid - points.len();
        if invalid > 0 || duplicates > 0 {
            tracing::warn!(
                received,
                invalid,
                duplicates,
                kept = points.len(),
                "Sanitized history input"
            );
        }

        Self { points }
    }

    /// Read `date,value` rows from CSV and sanitize them
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        #[derive(Deserialize)]
        struct Row {
            date: String,
            value: f64,
        }

        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut points = Vec::new();
        for row in csv_reader.deserialize::<Row>() {
            let row = row?;
            points.push(HistoricalPoint::parse(&row.date, row.value)?);
        }

        Ok(Self::sanitize(points))
    }

    pub fn points(&self) -> &[HistoricalPoint] {
        &self.points
    }

    /// Observed values in date order
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent observation
    pub fn last(&self) -> Option<&HistoricalPoint> {
        self.points.last()
    }

    /// Split off the last `holdout` days as a test set.
    ///
    /// Returns `None` when the split would leave either side empty.
    pub fn split_holdout(&self, holdout: usize) -> Option<(SalesSeries, Vec<f64>)> {
        if holdout == 0 || holdout >= self.points.len() {
            return None;
        }
        let cut = self.points.len() - holdout;
        let train = SalesSeries {
            points: self.points[..cut].to_vec(),
        };
        let actual = self.points[cut..].iter().map(|p| p.value).collect();
        Some((train, actual))
    }
}

/// Business metric carried by a [`DailyObservation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalesMetric {
    Revenue,
    Orders,
    Profit,
}

impl SalesMetric {
    pub const ALL: [SalesMetric; 3] = [SalesMetric::Revenue, SalesMetric::Orders, SalesMetric::Profit];

    pub fn name(&self) -> &'static str {
        match self {
            SalesMetric::Revenue => "revenue",
            SalesMetric::Orders => "orders",
            SalesMetric::Profit => "profit",
        }
    }
}

impl std::fmt::Display for SalesMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One day of business activity as delivered by the ingestion layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub revenue: f64,
    pub orders: f64,
    pub profit: f64,
}

impl DailyObservation {
    pub fn value(&self, metric: SalesMetric) -> f64 {
        match metric {
            SalesMetric::Revenue => self.revenue,
            SalesMetric::Orders => self.orders,
            SalesMetric::Profit => self.profit,
        }
    }
}

/// Project a single metric out of a set of observations as a sanitized series
pub fn metric_series(observations: &[DailyObservation], metric: SalesMetric) -> SalesSeries {
    SalesSeries::sanitize(
        observations
            .iter()
            .map(|o| HistoricalPoint::new(o.date, o.value(metric))),
    )
}
