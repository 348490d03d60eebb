use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sales_forecast::data::{metric_series, DailyObservation, HistoricalPoint, SalesMetric, SalesSeries};
use sales_forecast::ForecastError;
use std::fs::File;
use std::io::Write;
use tempfile::NamedTempFile;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn point(s: &str, value: f64) -> HistoricalPoint {
    HistoricalPoint::new(date(s), value)
}

#[test]
fn test_sanitize_sorts_and_drops_invalid() {
    let series = SalesSeries::sanitize(vec![
        point("2024-01-03", 30.0),
        point("2024-01-01", 10.0),
        point("2024-01-04", f64::NAN),
        point("2024-01-05", -5.0),
        point("2024-01-02", 20.0),
        point("2024-01-06", f64::INFINITY),
    ]);

    assert_eq!(series.len(), 3);
    assert_eq!(series.values(), vec![10.0, 20.0, 30.0]);
    assert_eq!(series.last().unwrap().date, date("2024-01-03"));
}

#[test]
fn test_sanitize_keeps_last_duplicate() {
    let series = SalesSeries::sanitize(vec![
        point("2024-01-01", 10.0),
        point("2024-01-02", 20.0),
        point("2024-01-02", 25.0),
    ]);

    assert_eq!(series.values(), vec![10.0, 25.0]);
}

#[test]
fn test_strict_constructor_rejects_bad_input() {
    let unsorted = SalesSeries::new(vec![point("2024-01-02", 1.0), point("2024-01-01", 2.0)]);
    assert!(matches!(unsorted, Err(ForecastError::DataError(_))));

    let duplicate = SalesSeries::new(vec![point("2024-01-01", 1.0), point("2024-01-01", 2.0)]);
    assert!(matches!(duplicate, Err(ForecastError::DataError(_))));

    let negative = SalesSeries::new(vec![point("2024-01-01", -1.0)]);
    assert!(matches!(negative, Err(ForecastError::DataError(_))));

    let valid = SalesSeries::new(vec![point("2024-01-01", 0.0), point("2024-01-02", 2.0)]).unwrap();
    assert_eq!(valid.len(), 2);
}

#[test]
fn test_parse_point() {
    let p = HistoricalPoint::parse(" 2024-02-29 ", 12.5).unwrap();
    assert_eq!(p.date, date("2024-02-29"));
    assert_eq!(p.weekday(), 3); // Thursday

    let err = HistoricalPoint::parse("29/02/2024", 12.5).unwrap_err();
    assert!(err.to_string().contains("29/02/2024"));
}

#[test]
fn test_from_csv_reader() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,value").unwrap();
    writeln!(file, "2024-01-02, 200.5").unwrap();
    writeln!(file, "2024-01-01, 100.0").unwrap();
    writeln!(file, "2024-01-03, -1.0").unwrap();
    writeln!(file, "2024-01-04, 300.0").unwrap();
    file.flush().unwrap();

    let series = SalesSeries::from_csv_reader(File::open(file.path()).unwrap()).unwrap();

    assert_eq!(series.values(), vec![100.0, 200.5, 300.0]);
}

#[test]
fn test_from_csv_reader_bad_value() {
    let input = "date,value\n2024-01-01,abc\n";
    let result = SalesSeries::from_csv_reader(input.as_bytes());

    assert!(matches!(result, Err(ForecastError::CsvError(_))));
}

#[test]
fn test_split_holdout() {
    let series = SalesSeries::sanitize(
        (1..=8).map(|d| point(&format!("2024-01-{:02}", d), d as f64 * 10.0)),
    );

    let (train, actual) = series.split_holdout(2).unwrap();
    assert_eq!(train.len(), 6);
    assert_eq!(actual, vec![70.0, 80.0]);

    assert!(series.split_holdout(0).is_none());
    assert!(series.split_holdout(8).is_none());
}

#[test]
fn test_metric_series_is_independent_per_metric() {
    let observations = vec![
        DailyObservation {
            date: date("2024-01-01"),
            revenue: 1000.0,
            orders: 10.0,
            profit: 150.0,
        },
        DailyObservation {
            date: date("2024-01-02"),
            revenue: 800.0,
            orders: 8.0,
            profit: -40.0,
        },
        DailyObservation {
            date: date("2024-01-03"),
            revenue: 1200.0,
            orders: 12.0,
            profit: 210.0,
        },
    ];

    let revenue = metric_series(&observations, SalesMetric::Revenue);
    let profit = metric_series(&observations, SalesMetric::Profit);

    assert_eq!(revenue.values(), vec![1000.0, 800.0, 1200.0]);
    // The loss-making day drops out of profit only
    assert_eq!(profit.values(), vec![150.0, 210.0]);
    assert_eq!(SalesMetric::Orders.to_string(), "orders");
}
