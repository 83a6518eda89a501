use super::engine::{FittedModel, ForecastEngine};
use crate::data::cache::ModelCache;
use crate::data::cleaner::CleanSeries;
use crate::error::FitError;
use crate::types::ArimaOrder;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;

/// AIC of one candidate, `None` when it failed to fit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    pub order: ArimaOrder,
    pub aic: Option<f64>,
    pub failure: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Selection {
    pub model: Arc<FittedModel>,
    pub scores: Vec<CandidateScore>,
}

impl Selection {
    pub fn order(&self) -> ArimaOrder {
        self.model.order()
    }
}

impl ForecastEngine {
    /// Fit every candidate in parallel and keep the lowest AIC.
    ///
    /// Ties go to the earlier candidate in `grid`.
    pub fn select_order(&self, series: &CleanSeries, grid: &[ArimaOrder]) -> Result<Selection, FitError> {
        self.select_order_with(series, grid, None)
    }

    pub fn select_order_with(
        &self,
        series: &CleanSeries,
        grid: &[ArimaOrder],
        cache: Option<&ModelCache>,
    ) -> Result<Selection, FitError> {
        if grid.is_empty() {
            return Err(FitError::InvalidOrder("no candidate orders to select from".to_string()));
        }

        let results: Vec<(ArimaOrder, Result<Arc<FittedModel>, FitError>)> = grid
            .par_iter()
            .map(|&order| {
                let fitted = match cache {
                    Some(cache) => cache.get_or_fit(series, order, || self.fit(series, order)),
                    None => self.fit(series, order).map(Arc::new),
                };
                (order, fitted)
            })
            .collect();

        let mut best: Option<Arc<FittedModel>> = None;
        let mut first_error: Option<FitError> = None;
        let mut scores = Vec::with_capacity(results.len());

        for (order, result) in results {
            match result {
                Ok(model) if model.aic().is_finite() => {
                    let aic = model.aic();
                    scores.push(CandidateScore { order, aic: Some(aic), failure: None });
                    if best.as_ref().map_or(true, |current| aic < current.aic()) {
                        best = Some(model);
                    }
                }
                Ok(model) => {
                    log::warn!("Skipping {}: non-finite AIC", order);
                    scores.push(CandidateScore {
                        order,
                        aic: None,
                        failure: Some(format!("non-finite AIC {}", model.aic())),
                    });
                    first_error.get_or_insert(FitError::NonConvergent {
                        iterations: model.iterations(),
                    });
                }
                Err(e) => {
                    log::warn!("Skipping {}: {}", order, e);
                    scores.push(CandidateScore { order, aic: None, failure: Some(e.to_string()) });
                    first_error.get_or_insert(e);
                }
            }
        }

        match best {
            Some(model) => {
                log::info!(
                    "Selected {} (aic={:.2}) from {} candidates",
                    model.order(),
                    model.aic(),
                    grid.len()
                );
                Ok(Selection { model, scores })
            }
            None => Err(first_error
                .unwrap_or_else(|| FitError::InvalidOrder("no candidate could be fitted".to_string()))),
        }
    }
}
