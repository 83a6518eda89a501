// End-to-end pipeline tests against the public API
use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use salescast::data::{CsvConnector, DataSource, DataValidator, ModelCache, RawTable, SeriesCleaner};
use salescast::engines::forecast::{FitOptions, ForecastEngine};
use salescast::pipeline::{ForecastPipeline, ForecastRequest};
use salescast::types::{ArimaOrder, MissingPolicy};
use std::path::PathBuf;
use std::sync::Arc;

fn daily_dates(start: NaiveDate, n: usize) -> Vec<String> {
    (0..n)
        .map(|i| (start + Duration::days(i as i64)).format("%Y-%m-%d").to_string())
        .collect()
}

fn sine_table(n: usize) -> RawTable {
    let dates = daily_dates(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), n);
    let sales: Vec<String> = (0..n)
        .map(|day| (100.0 + 10.0 * (day as f64).sin()).to_string())
        .collect();
    let df = df! {
        "Date" => dates,
        "Sales" => sales,
    }
    .unwrap();
    RawTable::from_dataframe(&df).unwrap()
}

fn pipeline() -> ForecastPipeline {
    ForecastPipeline::new(
        CsvConnector::new("data/sales.csv"),
        ForecastEngine::new(FitOptions::default(), 0.95),
        30,
    )
}

#[test]
fn test_sine_series_forecasts_thirty_consecutive_days() {
    let table = sine_table(400);
    let request = ForecastRequest::new("Date", "Sales")
        .with_missing_policy(MissingPolicy::DropRows)
        .with_horizon(30)
        .with_order(ArimaOrder::new(5, 1, 0));

    let report = pipeline().run_table(&table, &request).unwrap();

    assert_eq!(report.forecast.len(), 30);
    let last_input = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + Duration::days(399);
    for (k, point) in report.forecast.points.iter().enumerate() {
        let expected = last_input + Duration::days(k as i64 + 1);
        assert_eq!(point.timestamp, expected.and_hms_opt(0, 0, 0).unwrap());
        assert!(point.value.is_finite());
        assert!(point.lower <= point.value && point.value <= point.upper);
    }
    assert_eq!(report.forecast.records()[0].date, "2024-02-05");
    assert_eq!(report.series_summary.count, 400);
}

#[test]
fn test_fill_mean_replaces_not_available_markers() {
    let n = 40;
    let missing = [3, 9, 17, 25, 33];
    let dates = daily_dates(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), n);
    let sales: Vec<String> = (0..n)
        .map(|i| {
            if missing.contains(&i) {
                "N/A".to_string()
            } else {
                (50 + i * 2).to_string()
            }
        })
        .collect();
    let df = df! { "Date" => dates, "Sales" => sales }.unwrap();
    let table = RawTable::from_dataframe(&df).unwrap();

    let selection = DataValidator::resolve(&table, "Date", "Sales").unwrap();
    let series = SeriesCleaner::clean(&table, &selection, MissingPolicy::FillMean, 30).unwrap();

    let valid: Vec<f64> = (0..n)
        .filter(|i| !missing.contains(i))
        .map(|i| (50 + i * 2) as f64)
        .collect();
    let mean = valid.iter().sum::<f64>() / valid.len() as f64;

    assert_eq!(series.len(), n);
    for &i in &missing {
        assert!((series.values()[i] - mean).abs() < 1e-9);
    }
    assert_eq!(series.values()[0], 50.0);
}

#[test]
fn test_same_column_twice_is_duplicate_selection() {
    let table = sine_table(50);
    let err = pipeline()
        .run_table(&table, &ForecastRequest::new("Sales", "Sales"))
        .unwrap_err();
    assert_eq!(err.reason(), "duplicate_selection");
}

#[test]
fn test_horizon_boundaries() {
    let table = sine_table(120);
    for horizon in [0, 366] {
        let request = ForecastRequest::new("Date", "Sales").with_horizon(horizon);
        let err = pipeline().run_table(&table, &request).unwrap_err();
        assert_eq!(err.reason(), "invalid_horizon");
    }
    for horizon in [1, 365] {
        let request = ForecastRequest::new("Date", "Sales").with_horizon(horizon);
        let report = pipeline().run_table(&table, &request).unwrap();
        assert_eq!(report.forecast.len(), horizon);
    }
}

#[test]
fn test_fit_and_forecast_are_deterministic() {
    let mut rng = StdRng::seed_from_u64(2024);
    let n = 200;
    let dates = daily_dates(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), n);
    let sales: Vec<String> = (0..n)
        .map(|day| (100.0 + 10.0 * (day as f64).sin() + rng.gen_range(-2.0..2.0)).to_string())
        .collect();
    let df = df! { "Date" => dates, "Sales" => sales }.unwrap();
    let table = RawTable::from_dataframe(&df).unwrap();

    let options = FitOptions {
        max_iterations: 5000,
        time_budget: None,
        ..FitOptions::default()
    };
    let pipeline = ForecastPipeline::new(
        CsvConnector::new("data/sales.csv"),
        ForecastEngine::new(options, 0.95),
        30,
    );
    let request = ForecastRequest::new("Date", "Sales")
        .with_horizon(20)
        .with_order(ArimaOrder::new(2, 0, 1));

    let first = pipeline.run_table(&table, &request).unwrap();
    let second = pipeline.run_table(&table, &request).unwrap();
    assert_eq!(first.forecast, second.forecast);
    assert_eq!(first.model, second.model);
}

#[test]
fn test_short_series_never_reaches_fit() {
    let table = sine_table(29);
    let err = pipeline()
        .run_table(&table, &ForecastRequest::new("Date", "Sales"))
        .unwrap_err();
    assert_eq!(err.reason(), "too_few_rows");
}

#[test]
fn test_rows_with_bad_dates_are_dropped_before_min_length() {
    let mut dates = daily_dates(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 31);
    dates[4] = "not a date".to_string();
    dates[10] = "".to_string();
    let sales: Vec<String> = (0..31).map(|i| i.to_string()).collect();
    let df = df! { "Date" => dates, "Sales" => sales }.unwrap();
    let table = RawTable::from_dataframe(&df).unwrap();

    let err = pipeline()
        .run_table(&table, &ForecastRequest::new("Date", "Sales"))
        .unwrap_err();
    assert_eq!(err.reason(), "too_few_rows");
}

#[test]
fn test_clean_output_is_sorted_and_idempotent() {
    let mut dates = daily_dates(NaiveDate::from_ymd_opt(2022, 6, 1).unwrap(), 60);
    dates.reverse();
    let sales: Vec<String> = (0..60)
        .map(|i| if i % 11 == 0 { "".to_string() } else { format!("{}.5", i) })
        .collect();
    let df = df! { "Date" => dates, "Sales" => sales }.unwrap();
    let table = RawTable::from_dataframe(&df).unwrap();

    for policy in MissingPolicy::all() {
        let selection = DataValidator::resolve(&table, "Date", "Sales").unwrap();
        let series = SeriesCleaner::clean(&table, &selection, policy, 30).unwrap();
        assert!(series.timestamps().windows(2).all(|w| w[0] <= w[1]));
        assert!(series.values().iter().all(|v| v.is_finite()));

        let again_table = series.to_raw_table().unwrap();
        let again_selection = DataValidator::resolve(&again_table, "Date", "Sales").unwrap();
        let again = SeriesCleaner::clean(&again_table, &again_selection, policy, 30).unwrap();
        assert_eq!(series, again, "policy {}", policy);
    }
}

#[test]
fn test_auto_order_uses_shared_cache() {
    let table = sine_table(150);
    let cache = Arc::new(ModelCache::new(64));
    let grid = vec![
        ArimaOrder::new(1, 0, 0),
        ArimaOrder::new(2, 0, 0),
        ArimaOrder::new(1, 1, 0),
    ];
    let request = ForecastRequest::new("Date", "Sales")
        .with_horizon(10)
        .with_auto_order(grid.clone());

    let pipeline = pipeline().with_cache(Arc::clone(&cache));
    let first = pipeline.run_table(&table, &request).unwrap();
    let second = pipeline.run_table(&table, &request).unwrap();

    assert_eq!(cache.fit_count(), grid.len());
    assert_eq!(first.candidates.len(), grid.len());
    assert_eq!(first.model.order, second.model.order);
}

#[test]
fn test_default_dataset_runs_end_to_end() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/sales.csv");
    let pipeline = ForecastPipeline::new(
        CsvConnector::new(path),
        ForecastEngine::new(FitOptions::default(), 0.95),
        30,
    )
    .with_holdout(30);

    let report = pipeline
        .run(&DataSource::DefaultFile, &ForecastRequest::new("Date", "Sales"))
        .unwrap();

    assert_eq!(report.forecast.len(), 30);
    assert!(report.metrics.contains_key("holdout_rmse"));
    let payload = report.forecast.to_json_payload();
    assert_eq!(payload["forecast"].as_array().map(|a| a.len()), Some(30));
}

#[test]
fn test_upload_with_padded_headers() {
    let mut csv = String::from(" Date , Sales ,Region\n");
    for (i, date) in daily_dates(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 45)
        .iter()
        .enumerate()
    {
        csv.push_str(&format!("{},{},North\n", date, 200 + i % 9));
    }
    let source = DataSource::Upload {
        name: "upload.csv".to_string(),
        bytes: csv.into_bytes(),
    };

    let report = pipeline()
        .run(&source, &ForecastRequest::new("Date", "Sales").with_horizon(5))
        .unwrap();
    assert_eq!(report.forecast.len(), 5);
    assert_eq!(report.selection.value_column(), "Sales");
}
