use assert_approx_eq::assert_approx_eq;
use pretty_assertions::assert_eq;
use sales_forecast::models::StrategyKind;
use sales_forecast::{DailyBounds, EnginePolicy, EnsembleForecaster, ForecastError};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_default_policy() {
    let policy = EnginePolicy::default();

    assert_approx_eq!(policy.natural_fluctuation_bonus, 1.15);
    assert_eq!(policy.simple_trend_bounds, DailyBounds::new(-0.10, 0.15));
    assert_eq!(policy.market_realistic_bounds, DailyBounds::symmetric(0.08));
    assert_eq!(policy.natural_fluctuation_bounds, DailyBounds::new(-0.30, 0.40));
    assert_eq!(policy.holdout_days, 7);
    assert!(policy.validate().is_ok());
}

#[test]
fn test_empty_toml_gives_defaults() {
    assert_eq!(EnginePolicy::from_toml_str("").unwrap(), EnginePolicy::default());
}

#[test]
fn test_partial_toml_overrides() {
    let policy = EnginePolicy::from_toml_str(
        r#"
natural_fluctuation_bonus = 1.0
holdout_days = 5

[market_realistic_bounds]
max_decline = -0.05
max_growth = 0.05
"#,
    )
    .unwrap();

    assert_approx_eq!(policy.natural_fluctuation_bonus, 1.0);
    assert_eq!(policy.holdout_days, 5);
    assert_eq!(
        policy.bounds_for(StrategyKind::MarketRealistic),
        DailyBounds::symmetric(0.05)
    );
    // Untouched keys keep their defaults
    assert_eq!(
        policy.bounds_for(StrategyKind::SimpleTrend),
        DailyBounds::new(-0.10, 0.15)
    );
}

#[test]
fn test_invalid_policies_are_rejected() {
    let inverted = r#"
[simple_trend_bounds]
max_decline = 0.10
max_growth = -0.15
"#;
    assert!(matches!(
        EnginePolicy::from_toml_str(inverted),
        Err(ForecastError::ConfigError(_))
    ));

    assert!(matches!(
        EnginePolicy::from_toml_str("natural_fluctuation_bonus = 0.0"),
        Err(ForecastError::ConfigError(_))
    ));
    assert!(matches!(
        EnginePolicy::from_toml_str("min_confidence = 90.0\nmax_confidence = 50.0"),
        Err(ForecastError::ConfigError(_))
    ));
    assert!(matches!(
        EnginePolicy::from_toml_str("holdout_days = \"seven\""),
        Err(ForecastError::ConfigError(_))
    ));

    let policy = EnginePolicy {
        interval_level: 1.2,
        ..EnginePolicy::default()
    };
    assert!(EnsembleForecaster::with_policy(policy).is_err());
}

#[test]
fn test_policy_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "interval_level = 0.8").unwrap();
    writeln!(file, "min_confidence = 20.0").unwrap();
    file.flush().unwrap();

    let policy = EnginePolicy::from_file(file.path()).unwrap();
    assert_approx_eq!(policy.interval_level, 0.8);
    assert_approx_eq!(policy.min_confidence, 20.0);

    let missing = EnginePolicy::from_file("/nonexistent/policy.toml");
    assert!(matches!(missing, Err(ForecastError::IoError(_))));
}

#[test]
fn test_score_multiplier() {
    let policy = EnginePolicy::default();

    assert_approx_eq!(policy.score_multiplier(StrategyKind::NaturalFluctuation), 1.15);
    assert_approx_eq!(policy.score_multiplier(StrategyKind::SimpleTrend), 1.0);
    assert_approx_eq!(policy.score_multiplier(StrategyKind::MarketRealistic), 1.0);
}

#[test]
fn test_daily_bounds_limits() {
    let bounds = DailyBounds::new(-0.10, 0.15);
    let (low, high) = bounds.limits(200.0);

    assert_approx_eq!(low, 180.0);
    assert_approx_eq!(high, 230.0);
    assert!(bounds.contains(200.0, 229.0, 1e-9));
    assert!(!bounds.contains(200.0, 231.0, 1e-9));
    assert!(bounds.contains(0.0, 1_000.0, 1e-9));
}
