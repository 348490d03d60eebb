use chrono::{Duration, NaiveDate};
use rstest::rstest;
use sales_forecast::models::{
    ForecastStrategy, MarketRealistic, NaturalFluctuation, SimpleTrend, Strategy, StrategyKind,
};
use sales_forecast::{EnginePolicy, ForecastError, HistoricalPoint, PatternAnalyzer, SalesSeries};

fn create_test_series(values: &[f64]) -> SalesSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    SalesSeries::new(
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| HistoricalPoint::new(start + Duration::days(i as i64), v))
            .collect(),
    )
    .unwrap()
}

fn seasonal_sales(days: usize) -> Vec<f64> {
    (0..days)
        .map(|i| {
            let t = i as f64;
            let weekend = if i % 7 >= 5 { 350.0 } else { 0.0 };
            2_000.0 + 8.0 * t + weekend + 150.0 * (t * 0.9).sin()
        })
        .collect()
}

#[rstest]
#[case(StrategyKind::SimpleTrend)]
#[case(StrategyKind::MarketRealistic)]
#[case(StrategyKind::NaturalFluctuation)]
fn test_strategy_output_shape(#[case] kind: StrategyKind) {
    let policy = EnginePolicy::default();
    let series = create_test_series(&seasonal_sales(90));
    let profile = PatternAnalyzer::analyze(series.points());
    let strategy = Strategy::from_kind(kind, &policy);

    let result = strategy.forecast(&series, 30, &profile).unwrap();

    assert_eq!(strategy.kind(), kind);
    assert_eq!(result.forecasts.len(), 30);
    let last_date = series.last().unwrap().date;
    for (i, point) in result.forecasts.iter().enumerate() {
        assert_eq!(point.date, last_date + Duration::days(i as i64 + 1));
        assert_eq!(point.model, kind);
        assert!(point.predicted >= 0.0);
        assert!(point.lower_bound <= point.predicted);
        assert!(point.predicted <= point.upper_bound);
        assert!((point.components.total() - point.predicted).abs() <= 0.011);
    }
    for pair in result.forecasts.windows(2) {
        assert!(pair[1].confidence <= pair[0].confidence);
    }
    assert!(result.metrics.quality_score.is_finite());
}

#[rstest]
#[case(StrategyKind::SimpleTrend)]
#[case(StrategyKind::MarketRealistic)]
#[case(StrategyKind::NaturalFluctuation)]
fn test_strategy_respects_daily_bounds(#[case] kind: StrategyKind) {
    let policy = EnginePolicy::default();
    let bounds = policy.bounds_for(kind);
    // Sharp swings so the unclamped path would jump around
    let values: Vec<f64> = (0..60)
        .map(|i| if i % 3 == 0 { 400.0 } else { 1_000.0 + 10.0 * i as f64 })
        .collect();
    let series = create_test_series(&values);
    let profile = PatternAnalyzer::analyze(series.points());

    let result = Strategy::from_kind(kind, &policy)
        .forecast(&series, 45, &profile)
        .unwrap();

    let mut previous = series.last().unwrap().value;
    for point in &result.forecasts {
        assert!(
            bounds.contains(previous, point.predicted, 1e-9),
            "{} moved from {} to {}",
            kind,
            previous,
            point.predicted
        );
        previous = point.predicted;
    }
}

#[rstest]
#[case(StrategyKind::SimpleTrend)]
#[case(StrategyKind::MarketRealistic)]
#[case(StrategyKind::NaturalFluctuation)]
fn test_strategy_is_deterministic(#[case] kind: StrategyKind) {
    let policy = EnginePolicy::default();
    let series = create_test_series(&seasonal_sales(50));
    let profile = PatternAnalyzer::analyze(series.points());
    let strategy = Strategy::from_kind(kind, &policy);

    let first = strategy.forecast(&series, 20, &profile).unwrap();
    let second = strategy.forecast(&series, 20, &profile).unwrap();

    assert_eq!(first, second);
}

#[rstest]
#[case(StrategyKind::SimpleTrend, 1)]
#[case(StrategyKind::MarketRealistic, 6)]
#[case(StrategyKind::NaturalFluctuation, 6)]
fn test_strategy_rejects_short_history(#[case] kind: StrategyKind, #[case] len: usize) {
    let policy = EnginePolicy::default();
    let series = create_test_series(&vec![100.0; len]);
    let profile = PatternAnalyzer::analyze(series.points());

    let err = Strategy::from_kind(kind, &policy)
        .forecast(&series, 10, &profile)
        .unwrap_err();

    match err {
        ForecastError::InsufficientData {
            strategy,
            required,
            available,
        } => {
            assert_eq!(strategy, kind.name());
            assert_eq!(required, kind.min_history());
            assert_eq!(available, len);
        }
        other => panic!("Expected InsufficientData, got {:?}", other),
    }
}

#[test]
fn test_zero_horizon_is_rejected() {
    let series = create_test_series(&seasonal_sales(20));
    let profile = PatternAnalyzer::analyze(series.points());

    let result = MarketRealistic::default().forecast(&series, 0, &profile);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}

#[test]
fn test_simple_trend_continues_growth() {
    let values: Vec<f64> = (0..60).map(|i| 1_000.0 * 1.01_f64.powi(i)).collect();
    let series = create_test_series(&values);
    let profile = PatternAnalyzer::analyze(series.points());

    let result = SimpleTrend::default().forecast(&series, 30, &profile).unwrap();

    let first = result.forecasts.first().unwrap().predicted;
    let last = result.forecasts.last().unwrap().predicted;
    assert!(last > first, "expected growth, got {} -> {}", first, last);
}

#[test]
fn test_simple_trend_works_from_two_points() {
    let series = create_test_series(&[100.0, 104.0]);
    let profile = PatternAnalyzer::analyze(series.points());

    let result = SimpleTrend::default().forecast(&series, 5, &profile).unwrap();
    assert_eq!(result.forecasts.len(), 5);
}

#[test]
fn test_natural_fluctuation_moves_but_stays_near_level() {
    let series = create_test_series(&vec![5_000.0; 60]);
    let profile = PatternAnalyzer::analyze(series.points());

    let result = NaturalFluctuation::default()
        .forecast(&series, 30, &profile)
        .unwrap();
    let predicted = result.predicted_values();

    let mean = predicted.iter().sum::<f64>() / predicted.len() as f64;
    assert!((mean - 5_000.0).abs() / 5_000.0 < 0.05);
    // The path is not a flat line
    assert!(predicted.windows(2).any(|w| (w[1] - w[0]).abs() > 1.0));
}

#[test]
fn test_strategies_use_different_random_streams() {
    let policy = EnginePolicy::default();
    let series = create_test_series(&seasonal_sales(60));
    let profile = PatternAnalyzer::analyze(series.points());

    let realistic = MarketRealistic::new(&policy)
        .forecast(&series, 10, &profile)
        .unwrap();
    let natural = NaturalFluctuation::new(&policy)
        .forecast(&series, 10, &profile)
        .unwrap();

    assert_ne!(realistic.predicted_values(), natural.predicted_values());
}
