//! One synchronous pass from a data source to a forecast.
//!
//! Loader, resolver, cleaner and engine run in order, each stage receiving
//! the previous stage's output explicitly. Nothing survives the call apart
//! from entries in the optional model cache.

use crate::config::AppConfig;
use crate::data::{
    CleanReport, CleanSeries, ColumnSelection, CsvConnector, DataSource, DataValidator, ModelCache,
    RawTable, SeriesCleaner,
};
use crate::engines::forecast::{CandidateScore, FittedModel, ForecastEngine, ForecastResult, ModelSummary};
use crate::engines::metrics::{MetricsEngine, SeriesSummary};
use crate::error::Result;
use crate::types::{ArimaOrder, MissingPolicy, OrderChoice};
use std::collections::HashMap;
use std::sync::Arc;

/// Caller parameters for one forecast
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub time_column: String,
    pub value_column: String,
    pub missing_policy: MissingPolicy,
    pub horizon: usize,
    pub order: OrderChoice,
}

impl ForecastRequest {
    pub fn new(time_column: impl Into<String>, value_column: impl Into<String>) -> Self {
        Self {
            time_column: time_column.into(),
            value_column: value_column.into(),
            missing_policy: MissingPolicy::default(),
            horizon: 30,
            order: OrderChoice::default(),
        }
    }

    /// Request for the configured default columns and forecast settings
    pub fn from_config(config: &AppConfig) -> Self {
        let order = if config.forecast.auto_order {
            OrderChoice::Auto(ArimaOrder::default_grid())
        } else {
            OrderChoice::Fixed(config.forecast.order)
        };
        Self {
            time_column: config.data.default_time_column.clone(),
            value_column: config.data.default_value_column.clone(),
            missing_policy: config.forecast.missing_policy,
            horizon: config.forecast.horizon,
            order,
        }
    }

    pub fn with_missing_policy(mut self, policy: MissingPolicy) -> Self {
        self.missing_policy = policy;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_order(mut self, order: ArimaOrder) -> Self {
        self.order = OrderChoice::Fixed(order);
        self
    }

    pub fn with_auto_order(mut self, grid: Vec<ArimaOrder>) -> Self {
        self.order = OrderChoice::Auto(grid);
        self
    }
}

/// Everything one run produces
#[derive(Debug, Clone)]
pub struct ForecastReport {
    pub selection: ColumnSelection,
    pub clean_report: CleanReport,
    pub series: CleanSeries,
    pub series_summary: SeriesSummary,
    pub model: ModelSummary,
    /// Per-candidate AIC when the order was selected automatically
    pub candidates: Vec<CandidateScore>,
    pub forecast: ForecastResult,
    pub metrics: HashMap<String, f64>,
}

pub struct ForecastPipeline {
    loader: CsvConnector,
    engine: ForecastEngine,
    metrics: MetricsEngine,
    min_length: usize,
    cache: Option<Arc<ModelCache>>,
}

impl ForecastPipeline {
    pub fn new(loader: CsvConnector, engine: ForecastEngine, min_length: usize) -> Self {
        Self {
            loader,
            engine,
            metrics: MetricsEngine::new(0),
            min_length,
            cache: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            loader: CsvConnector::new(config.data.default_dataset.clone()),
            engine: ForecastEngine::from_config(&config.forecast),
            metrics: MetricsEngine::new(config.forecast.holdout),
            min_length: config.data.min_length,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<ModelCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_holdout(mut self, holdout: usize) -> Self {
        self.metrics = MetricsEngine::new(holdout);
        self
    }

    pub fn loader(&self) -> &CsvConnector {
        &self.loader
    }

    pub fn engine(&self) -> &ForecastEngine {
        &self.engine
    }

    pub fn run(&self, source: &DataSource, request: &ForecastRequest) -> Result<ForecastReport> {
        let table = self.loader.load(source)?;
        self.run_table(&table, request)
    }

    pub fn run_table(&self, table: &RawTable, request: &ForecastRequest) -> Result<ForecastReport> {
        let selection = DataValidator::resolve(table, &request.time_column, &request.value_column)?;

        let (series, clean_report) =
            SeriesCleaner::clean_with_report(table, &selection, request.missing_policy, self.min_length)?;
        log::info!(
            "Cleaned '{}' over '{}': {} of {} rows kept ({})",
            selection.value_column(),
            selection.time_column(),
            clean_report.output_rows,
            clean_report.input_rows,
            request.missing_policy
        );

        let (model, candidates) = self.fit(&series, &request.order)?;
        let forecast = self.engine.forecast(&model, request.horizon)?;
        log::info!("Forecast {} periods with {}", forecast.len(), model.order());

        let metrics = self.metrics.calculate_all(&self.engine, &model);

        Ok(ForecastReport {
            selection,
            clean_report,
            series_summary: SeriesSummary::from_series(&series),
            model: model.summary(),
            candidates,
            forecast,
            metrics,
            series,
        })
    }

    fn fit(
        &self,
        series: &CleanSeries,
        choice: &OrderChoice,
    ) -> Result<(Arc<FittedModel>, Vec<CandidateScore>)> {
        match choice {
            OrderChoice::Fixed(order) => {
                let model = match &self.cache {
                    Some(cache) => {
                        cache.get_or_fit(series, *order, || self.engine.fit(series, *order))?
                    }
                    None => Arc::new(self.engine.fit(series, *order)?),
                };
                Ok((model, Vec::new()))
            }
            OrderChoice::Auto(grid) => {
                let selection = self.engine.select_order_with(series, grid, self.cache.as_deref())?;
                Ok((selection.model, selection.scores))
            }
        }
    }
}
