use super::arima::{self, Estimate};
use super::intervals::{forecast_std_errors, psi_weights};
use crate::config::ForecastConfig;
use crate::data::cleaner::CleanSeries;
use crate::data::timestamp::format_timestamp;
use crate::error::{FitError, ForecastError};
use crate::types::ArimaOrder;
use chrono::{Duration as TimeStep, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fs::File;
use std::path::Path;
use std::time::Duration;

pub const MAX_HORIZON: usize = 365;

#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    pub max_iterations: usize,
    pub tolerance: f64,
    pub time_budget: Option<Duration>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-8,
            time_budget: Some(Duration::from_secs(5)),
        }
    }
}

impl From<&ForecastConfig> for FitOptions {
    fn from(config: &ForecastConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
            time_budget: config.fit_time_budget_ms.map(Duration::from_millis),
        }
    }
}

/// A fitted ARIMA model over one clean series. Read-only once built.
#[derive(Debug, Clone)]
pub struct FittedModel {
    series: CleanSeries,
    order: ArimaOrder,
    estimate: Estimate,
    tails: Vec<f64>,
}

impl FittedModel {
    pub fn series(&self) -> &CleanSeries {
        &self.series
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.estimate.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.estimate.ma
    }

    pub fn intercept(&self) -> f64 {
        self.estimate.intercept
    }

    /// Innovation variance
    pub fn sigma2(&self) -> f64 {
        self.estimate.sigma2
    }

    pub fn log_likelihood(&self) -> f64 {
        self.estimate.log_likelihood
    }

    pub fn aic(&self) -> f64 {
        self.estimate.aic()
    }

    pub fn bic(&self) -> f64 {
        self.estimate.bic()
    }

    pub fn iterations(&self) -> usize {
        self.estimate.iterations
    }

    /// In-sample one-step residuals on the differenced scale
    pub fn residuals(&self) -> &[f64] {
        &self.estimate.residuals[self.order.p..]
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            order: self.order,
            observations: self.series.len(),
            ar_coefficients: self.estimate.ar.clone(),
            ma_coefficients: self.estimate.ma.clone(),
            intercept: self.estimate.intercept,
            sigma2: self.estimate.sigma2,
            log_likelihood: self.estimate.log_likelihood,
            aic: self.aic(),
            bic: self.bic(),
            iterations: self.estimate.iterations,
        }
    }
}

/// Serializable description of a fitted model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub order: ArimaOrder,
    pub observations: usize,
    pub ar_coefficients: Vec<f64>,
    pub ma_coefficients: Vec<f64>,
    pub intercept: f64,
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Output record: `{date, forecast, lower, upper}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub date: String,
    pub forecast: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    pub order: ArimaOrder,
    pub confidence: f64,
    pub points: Vec<ForecastPoint>,
}

impl ForecastResult {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn records(&self) -> Vec<ForecastRecord> {
        self.points
            .iter()
            .map(|p| ForecastRecord {
                date: format_timestamp(&p.timestamp),
                forecast: p.value,
                lower: p.lower,
                upper: p.upper,
            })
            .collect()
    }

    /// The API payload `{"forecast": [f64, ...]}`
    pub fn to_json_payload(&self) -> serde_json::Value {
        serde_json::json!({ "forecast": self.values() })
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let records = self.records();
        let dates: Vec<String> = records.iter().map(|r| r.date.clone()).collect();
        let forecast: Vec<f64> = records.iter().map(|r| r.forecast).collect();
        let lower: Vec<f64> = records.iter().map(|r| r.lower).collect();
        let upper: Vec<f64> = records.iter().map(|r| r.upper).collect();

        DataFrame::new(vec![
            Series::new("date".into(), dates).into(),
            Series::new("forecast".into(), forecast).into(),
            Series::new("lower".into(), lower).into(),
            Series::new("upper".into(), upper).into(),
        ])
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> crate::error::Result<()> {
        let mut df = self.to_dataframe()?;
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
        Ok(())
    }
}

/// Fits ARIMA models and projects them forward
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    options: FitOptions,
    confidence: f64,
}

impl ForecastEngine {
    pub fn new(options: FitOptions, confidence: f64) -> Self {
        Self { options, confidence }
    }

    pub fn from_config(config: &ForecastConfig) -> Self {
        Self::new(FitOptions::from(config), config.confidence)
    }

    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    pub fn fit(&self, series: &CleanSeries, order: ArimaOrder) -> Result<FittedModel, FitError> {
        if order.p > ArimaOrder::MAX_P || order.d > ArimaOrder::MAX_D || order.q > ArimaOrder::MAX_Q {
            return Err(FitError::InvalidOrder(format!(
                "{} exceeds limits p <= {}, d <= {}, q <= {}",
                order,
                ArimaOrder::MAX_P,
                ArimaOrder::MAX_D,
                ArimaOrder::MAX_Q
            )));
        }

        let need = order.p + order.d;
        if series.len() <= need {
            return Err(FitError::InsufficientObservations {
                have: series.len(),
                need,
            });
        }

        let estimate = arima::estimate(
            series.values(),
            order,
            self.options.max_iterations,
            self.options.tolerance,
            self.options.time_budget,
        )?;
        log::info!(
            "Fitted {} on {} observations: sigma2={:.4}, aic={:.2}",
            order,
            series.len(),
            estimate.sigma2,
            estimate.aic()
        );

        Ok(FittedModel {
            tails: arima::difference_tails(series.values(), order.d),
            series: series.clone(),
            order,
            estimate,
        })
    }

    /// Two-sided standard normal quantile for the configured confidence
    fn z_score(&self) -> Result<f64, ForecastError> {
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(ForecastError::InvalidConfidence(self.confidence));
        }
        let normal =
            Normal::new(0.0, 1.0).map_err(|_| ForecastError::InvalidConfidence(self.confidence))?;
        Ok(normal.inverse_cdf(0.5 + self.confidence / 2.0))
    }

    pub fn forecast(&self, model: &FittedModel, horizon: usize) -> Result<ForecastResult, ForecastError> {
        if !(1..=MAX_HORIZON).contains(&horizon) {
            return Err(ForecastError::InvalidHorizon(horizon));
        }

        let timestamps = future_timestamps(model.series.timestamps(), horizon)?;

        let estimate = &model.estimate;
        let mut z = estimate.centered.clone();
        let mut e = estimate.residuals.clone();
        for _ in 0..horizon {
            let t = z.len();
            let mut next = 0.0;
            for (i, coeff) in estimate.ar.iter().enumerate() {
                next += coeff * z[t - i - 1];
            }
            for (j, coeff) in estimate.ma.iter().enumerate() {
                if t > j {
                    next += coeff * e[t - j - 1];
                }
            }
            z.push(next);
            e.push(0.0);
        }

        let differenced: Vec<f64> = z[estimate.centered.len()..]
            .iter()
            .map(|v| v + estimate.intercept)
            .collect();
        let values = arima::integrate(&differenced, &model.tails);

        let psi = psi_weights(&estimate.ar, &estimate.ma, model.order.d, horizon);
        let std_errors = forecast_std_errors(&psi, estimate.sigma2);
        let z_score = self.z_score()?;

        let points = timestamps
            .into_iter()
            .zip(values)
            .zip(std_errors)
            .map(|((timestamp, value), se)| ForecastPoint {
                timestamp,
                value,
                lower: value - z_score * se,
                upper: value + z_score * se,
            })
            .collect();

        Ok(ForecastResult {
            order: model.order,
            confidence: self.confidence,
            points,
        })
    }
}

/// Spacing of the last two distinct observations, one day if there is none
pub fn infer_step(timestamps: &[NaiveDateTime]) -> TimeStep {
    timestamps
        .windows(2)
        .rev()
        .map(|w| w[1] - w[0])
        .find(|step| *step > TimeStep::zero())
        .unwrap_or_else(|| TimeStep::days(1))
}

pub fn future_timestamps(
    observed: &[NaiveDateTime],
    horizon: usize,
) -> Result<Vec<NaiveDateTime>, ForecastError> {
    let step = infer_step(observed);
    let mut current = *observed.last().ok_or(ForecastError::TimestampOverflow)?;
    let mut timestamps = Vec::with_capacity(horizon);
    for _ in 0..horizon {
        current = current
            .checked_add_signed(step)
            .ok_or(ForecastError::TimestampOverflow)?;
        timestamps.push(current);
    }
    Ok(timestamps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::connectors::{DataValidator, RawTable};
    use crate::data::cleaner::SeriesCleaner;
    use crate::types::MissingPolicy;
    use chrono::NaiveDate;

    fn series_from(dates: Vec<String>, values: Vec<f64>) -> CleanSeries {
        let raw = RawTable::from_columns(vec![
            ("Date".to_string(), dates.into_iter().map(Some).collect()),
            (
                "Sales".to_string(),
                values.into_iter().map(|v| Some(v.to_string())).collect(),
            ),
        ])
        .unwrap();
        let selection = DataValidator::resolve(&raw, "Date", "Sales").unwrap();
        SeriesCleaner::clean(&raw, &selection, MissingPolicy::DropRows, 1).unwrap()
    }

    fn daily(values: Vec<f64>) -> CleanSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| (start + TimeStep::days(i as i64)).format("%Y-%m-%d").to_string())
            .collect();
        series_from(dates, values)
    }

    fn engine() -> ForecastEngine {
        ForecastEngine::new(FitOptions::default(), 0.95)
    }

    #[test]
    fn test_linear_trend_continues_with_d1() {
        let series = daily((0..60).map(|i| 10.0 + 2.0 * i as f64).collect());
        let model = engine().fit(&series, ArimaOrder::new(1, 1, 0)).unwrap();
        let forecast = engine().forecast(&model, 3).unwrap();
        for (k, value) in forecast.values().iter().enumerate() {
            let expected = 10.0 + 2.0 * (60 + k) as f64;
            assert!((value - expected).abs() < 1e-3, "{} vs {}", value, expected);
        }
    }

    #[test]
    fn test_random_walk_forecast_is_flat_with_widening_bounds() {
        let values: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 5.0 } else { 7.0 }).collect();
        let series = daily(values);
        let model = engine().fit(&series, ArimaOrder::new(0, 1, 0)).unwrap();
        let forecast = engine().forecast(&model, 5).unwrap();

        assert!(forecast.values().iter().all(|v| (*v - 7.0).abs() < 1e-12));
        let widths: Vec<f64> = forecast.points.iter().map(|p| p.upper - p.lower).collect();
        assert!(widths.windows(2).all(|w| w[1] > w[0]));
        assert!(forecast.points.iter().all(|p| p.lower <= p.value && p.value <= p.upper));
    }

    #[test]
    fn test_one_step_interval_uses_normal_quantile() {
        let values: Vec<f64> = (0..40).map(|i| if i % 3 == 0 { 5.0 } else { 8.0 }).collect();
        let series = daily(values);
        let model = engine().fit(&series, ArimaOrder::new(0, 1, 0)).unwrap();
        let sigma = model.sigma2().sqrt();

        for (confidence, z) in [(0.95, 1.959_964), (0.99, 2.575_829), (0.8, 1.281_552)] {
            let forecast = ForecastEngine::new(FitOptions::default(), confidence)
                .forecast(&model, 1)
                .unwrap();
            let point = &forecast.points[0];
            assert!(((point.upper - point.value) / sigma - z).abs() < 1e-5);
            assert!(((point.value - point.lower) / sigma - z).abs() < 1e-5);
        }
    }

    #[test]
    fn test_confidence_outside_unit_interval_is_rejected() {
        let series = daily((0..30).map(|i| (i as f64).cos()).collect());
        let model = engine().fit(&series, ArimaOrder::new(1, 0, 0)).unwrap();
        for confidence in [0.0, 1.0, 1.5] {
            let err = ForecastEngine::new(FitOptions::default(), confidence)
                .forecast(&model, 3)
                .unwrap_err();
            assert_eq!(err.reason(), "invalid_confidence");
        }
    }

    #[test]
    fn test_insufficient_observations() {
        let series = daily(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let err = engine().fit(&series, ArimaOrder::new(5, 1, 0)).unwrap_err();
        assert_eq!(err.reason(), "insufficient_observations");

        let series = daily(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert!(engine().fit(&series, ArimaOrder::new(5, 1, 0)).is_ok());
    }

    #[test]
    fn test_invalid_order() {
        let series = daily((0..50).map(|i| i as f64).collect());
        let err = engine().fit(&series, ArimaOrder::new(11, 0, 0)).unwrap_err();
        assert_eq!(err.reason(), "invalid_order");
    }

    #[test]
    fn test_horizon_bounds() {
        let series = daily((0..50).map(|i| (i as f64).sin()).collect());
        let model = engine().fit(&series, ArimaOrder::new(1, 0, 0)).unwrap();
        for horizon in [0, 366] {
            let err = engine().forecast(&model, horizon).unwrap_err();
            assert_eq!(err.reason(), "invalid_horizon");
        }
        assert_eq!(engine().forecast(&model, 1).unwrap().len(), 1);
        assert_eq!(engine().forecast(&model, 365).unwrap().len(), 365);
    }

    #[test]
    fn test_step_follows_last_spacing() {
        let dates = vec![
            "2024-01-01 00:00:00".to_string(),
            "2024-01-01 06:00:00".to_string(),
            "2024-01-01 12:00:00".to_string(),
            "2024-01-01 12:00:00".to_string(),
        ];
        let series = series_from(dates, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(infer_step(series.timestamps()), TimeStep::hours(6));

        let future = future_timestamps(series.timestamps(), 2).unwrap();
        assert_eq!(format_timestamp(&future[0]), "2024-01-01T18:00:00");
        assert_eq!(format_timestamp(&future[1]), "2024-01-02");
    }

    #[test]
    fn test_single_timestamp_defaults_to_daily() {
        let ts = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(infer_step(&[ts]), TimeStep::days(1));
        let future = future_timestamps(&[ts], 2).unwrap();
        assert_eq!(format_timestamp(&future[1]), "2024-03-01");
    }

    #[test]
    fn test_payload_and_dataframe() {
        let series = daily((0..40).map(|i| 100.0 + (i % 5) as f64).collect());
        let model = engine().fit(&series, ArimaOrder::new(2, 0, 0)).unwrap();
        let forecast = engine().forecast(&model, 4).unwrap();

        let payload = forecast.to_json_payload();
        assert_eq!(payload["forecast"].as_array().unwrap().len(), 4);

        let df = forecast.to_dataframe().unwrap();
        assert_eq!(df.height(), 4);
        assert_eq!(forecast.records()[0].date, "2023-02-10");
    }
}
