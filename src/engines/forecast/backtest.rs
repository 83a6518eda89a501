use super::engine::ForecastEngine;
use crate::data::cleaner::CleanSeries;
use crate::engines::metrics::AccuracyMetrics;
use crate::error::{FitError, Result};
use crate::types::ArimaOrder;
use std::collections::HashMap;

impl ForecastEngine {
    /// Fit on all but the last `holdout` points and score the forecast of them.
    ///
    /// Returns `mae`, `rmse`, `bias`, `n` and, when no held-out value is zero, `mape`.
    pub fn evaluate_holdout(
        &self,
        series: &CleanSeries,
        order: ArimaOrder,
        holdout: usize,
    ) -> Result<HashMap<String, f64>> {
        if holdout >= series.len() {
            return Err(FitError::InsufficientObservations {
                have: series.len().saturating_sub(holdout),
                need: order.p + order.d + 1,
            }
            .into());
        }

        let train_len = series.len() - holdout;
        let train = series.truncated(train_len);
        let model = self.fit(&train, order)?;
        let forecast = self.forecast(&model, holdout)?;

        let actual = &series.values()[train_len..];
        let metrics = AccuracyMetrics::calculate(actual, &forecast.values());
        log::info!(
            "Holdout of {} points for {}: mae={:.4}, rmse={:.4}",
            holdout,
            order,
            metrics.get("mae").copied().unwrap_or(f64::NAN),
            metrics.get("rmse").copied().unwrap_or(f64::NAN)
        );
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use crate::data::cleaner::SeriesCleaner;
    use crate::data::connectors::{DataValidator, RawTable};
    use crate::engines::forecast::{FitOptions, ForecastEngine};
    use crate::types::{ArimaOrder, MissingPolicy};

    fn trend_series(n: usize) -> crate::data::CleanSeries {
        let start = chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let dates = (0..n)
            .map(|i| Some((start + chrono::Duration::days(i as i64)).to_string()))
            .collect();
        let values = (0..n).map(|i| Some((100.0 + 3.0 * i as f64).to_string())).collect();
        let raw = RawTable::from_columns(vec![
            ("Date".to_string(), dates),
            ("Sales".to_string(), values),
        ])
        .unwrap();
        let selection = DataValidator::resolve(&raw, "Date", "Sales").unwrap();
        SeriesCleaner::clean(&raw, &selection, MissingPolicy::DropRows, 1).unwrap()
    }

    #[test]
    fn test_perfect_trend_has_near_zero_error() {
        let engine = ForecastEngine::new(FitOptions::default(), 0.95);
        let series = trend_series(80);
        let metrics = engine
            .evaluate_holdout(&series, ArimaOrder::new(1, 1, 0), 10)
            .unwrap();
        assert!(metrics["mae"] < 1e-3);
        assert!(metrics["rmse"] < 1e-3);
        assert_eq!(metrics["n"], 10.0);
        assert!(metrics.contains_key("mape"));
    }

    #[test]
    fn test_holdout_larger_than_series() {
        let engine = ForecastEngine::new(FitOptions::default(), 0.95);
        let series = trend_series(10);
        let err = engine
            .evaluate_holdout(&series, ArimaOrder::new(1, 1, 0), 10)
            .unwrap_err();
        assert_eq!(err.reason(), "insufficient_observations");

        let err = engine
            .evaluate_holdout(&series, ArimaOrder::new(1, 1, 0), 0)
            .unwrap_err();
        assert_eq!(err.reason(), "invalid_horizon");
    }
}
