// src/engines/metrics/engine.rs
use crate::engines::forecast::{FittedModel, ForecastEngine};
use crate::engines::metrics::SeriesSummary;
use std::collections::HashMap;

pub struct MetricsEngine {
    holdout: usize,
}

impl MetricsEngine {
    pub fn new(holdout: usize) -> Self {
        Self { holdout }
    }

    /// Series statistics, fit statistics and, when the series allows it, holdout accuracy
    pub fn calculate_all(&self, engine: &ForecastEngine, model: &FittedModel) -> HashMap<String, f64> {
        let mut all_metrics = HashMap::new();

        // Series statistics
        all_metrics.extend(SeriesSummary::from_series(model.series()).to_map());

        // Fit statistics
        all_metrics.insert("aic".to_string(), model.aic());
        all_metrics.insert("bic".to_string(), model.bic());
        all_metrics.insert("sigma2".to_string(), model.sigma2());
        all_metrics.insert("log_likelihood".to_string(), model.log_likelihood());

        // Holdout accuracy
        if self.holdout > 0 {
            match engine.evaluate_holdout(model.series(), model.order(), self.holdout) {
                Ok(accuracy) => {
                    for (name, value) in accuracy {
                        all_metrics.insert(format!("holdout_{}", name), value);
                    }
                }
                Err(e) => log::warn!("Holdout evaluation skipped: {}", e),
            }
        }

        all_metrics
    }
}
