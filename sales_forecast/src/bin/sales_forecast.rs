//! Command line front end: forecast a CSV of daily observations and print the
//! result as JSON.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use sales_forecast::{DailyObservation, EnginePolicy, EnsembleForecaster, SalesSeries};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV file with `date,value` columns (or `date,revenue,orders,profit`
    /// with --business)
    input: PathBuf,

    /// Days to forecast
    #[arg(long, default_value_t = 30)]
    horizon: usize,

    /// TOML file overriding the engine policy
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Forecast revenue, orders and profit columns separately
    #[arg(long, default_value_t = false)]
    business: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let policy = match &cli.policy {
        Some(path) => EnginePolicy::from_file(path)?,
        None => EnginePolicy::default(),
    };
    let forecaster = EnsembleForecaster::with_policy(policy)?;

    let file = File::open(&cli.input)?;
    let json = if cli.business {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);
        let observations = reader
            .deserialize::<DailyObservation>()
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!(rows = observations.len(), horizon = cli.horizon, "Forecasting business metrics");
        serde_json::to_string_pretty(&forecaster.forecast_business_metrics(&observations, cli.horizon))?
    } else {
        let series = SalesSeries::from_csv_reader(file)?;
        tracing::info!(points = series.len(), horizon = cli.horizon, "Forecasting series");
        serde_json::to_string_pretty(&forecaster.forecast_series(&series, cli.horizon))?
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    Ok(())
}
