use chrono::{Duration, NaiveDate};
use sales_forecast::{DailyObservation, EnsembleForecaster};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Sales Forecast: Business Metrics Example");
    println!("========================================\n");

    let start = NaiveDate::from_ymd_opt(2024, 3, 1).ok_or("invalid start date")?;
    let observations: Vec<DailyObservation> = (0..90)
        .map(|i| {
            let t = i as f64;
            let orders = 120.0 + 0.5 * t + 15.0 * (t * 0.8).cos();
            let revenue = orders * 42.5;
            DailyObservation {
                date: start + Duration::days(i),
                revenue,
                orders,
                profit: revenue * 0.18 - 300.0,
            }
        })
        .collect();

    let forecaster = EnsembleForecaster::new();
    let results = forecaster.forecast_business_metrics(&observations, 30);

    for (metric, result) in &results {
        println!("{}:", metric);
        println!("  best model:     {}", result.best_model);
        println!("  quality score:  {:.2}", result.metrics.quality_score);
        if let Some(summary) = result.summary {
            println!("  30-day total:   {:.2}", summary.total_predicted);
            println!("  average daily:  {:.2}", summary.average_daily);
            println!("  change:         {:+.2}%", summary.expected_change_pct);
        }
        println!();
    }

    Ok(())
}
