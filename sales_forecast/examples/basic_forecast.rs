use chrono::{Duration, NaiveDate};
use sales_forecast::{EnsembleForecaster, HistoricalPoint};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Sales Forecast: Basic Ensemble Example");
    println!("======================================\n");

    let history = create_sample_history(120)?;
    println!(
        "Sample history: {} days ending {}\n",
        history.len(),
        history.last().map(|p| p.date.to_string()).unwrap_or_default()
    );

    let forecaster = EnsembleForecaster::new();
    let result = forecaster.forecast(&history, 14);

    println!("Model comparison:");
    for entry in &result.model_comparison {
        match &entry.error {
            None => println!("  {:<20} score {:>6.2}", entry.name, entry.score),
            Some(error) => println!("  {:<20} failed: {}", entry.name, error),
        }
    }

    println!("\nBest model: {}", result.best_model);
    println!("{}", result.metrics);

    println!("Forecast:");
    for point in &result.forecasts {
        println!(
            "  {}  {:>10.2}  [{:>10.2}, {:>10.2}]  {:>5.1}%",
            point.date, point.predicted, point.lower_bound, point.upper_bound, point.confidence
        );
    }

    if let Some(summary) = result.summary {
        println!(
            "\nTotal {:.2} over {} days, expected change {:+.2}%",
            summary.total_predicted, summary.horizon_days, summary.expected_change_pct
        );
    }

    Ok(())
}

/// Daily revenue with growth, a weekend lift and some irregular movement
fn create_sample_history(days: i64) -> Result<Vec<HistoricalPoint>, Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid start date")?;

    Ok((0..days)
        .map(|i| {
            let trend = 5_000.0 + 12.0 * i as f64;
            let weekend = if i % 7 >= 5 { 800.0 } else { 0.0 };
            let wiggle = 250.0 * ((i as f64) * 0.9).sin();
            HistoricalPoint::new(start + Duration::days(i), trend + weekend + wiggle)
        })
        .collect())
}
