use crate::config::AppConfig;
use crate::data::{DataPreview, DataSource, RawTable};
use crate::engines::metrics::{GroupBreakdown, HistogramBin, MetricsEngine};
use crate::pipeline::ForecastReport;
use crate::types::{ArimaOrder, MissingPolicy};

/// Central application state for the UI
pub struct AppState {
    pub config: AppConfig,

    // Data
    pub data_source: Option<DataSource>,
    pub table: Option<RawTable>,
    pub data_preview: Option<DataPreview>,

    // Column selection
    pub time_column: String,
    pub value_column: String,

    // Forecast parameters
    pub missing_policy: MissingPolicy,
    pub horizon: usize,
    pub order: ArimaOrder,
    pub auto_order: bool,

    // Execution state
    pub is_running: bool,
    pub run_requested: bool,
    pub status_message: String,
    pub last_error: Option<RunFailure>,

    // Dataset breakdown
    pub group_column: String,
    pub breakdown: Option<DatasetBreakdown>,

    // Results
    pub report: Option<ForecastReport>,
    pub show_bounds: bool,
}

/// Per-category totals and value distribution of the loaded dataset
#[derive(Clone, Debug)]
pub struct DatasetBreakdown {
    pub group_column: String,
    pub value_column: String,
    pub groups: Vec<GroupBreakdown>,
    pub histogram: Vec<HistogramBin>,
}

const HISTOGRAM_BINS: usize = 20;

/// A failed run as shown to the user
#[derive(Clone, Debug)]
pub struct RunFailure {
    pub reason: String,
    pub message: String,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            time_column: config.data.default_time_column.clone(),
            value_column: config.data.default_value_column.clone(),
            missing_policy: config.forecast.missing_policy,
            horizon: config.forecast.horizon,
            order: config.forecast.order,
            auto_order: config.forecast.auto_order,
            config,

            data_source: None,
            table: None,
            data_preview: None,

            is_running: false,
            run_requested: false,
            status_message: "Ready".to_string(),
            last_error: None,

            group_column: String::new(),
            breakdown: None,

            report: None,
            show_bounds: true,
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.table
            .as_ref()
            .map(|table| table.column_names())
            .unwrap_or_default()
    }

    /// Replace the loaded dataset, dropping results computed on the previous one
    pub fn set_table(&mut self, source: DataSource, table: RawTable, preview: DataPreview) {
        self.data_source = Some(source);
        self.table = Some(table);
        self.data_preview = Some(preview);
        self.report = None;
        self.last_error = None;
        self.breakdown = None;
        self.group_column = self.default_group_column().unwrap_or_default();
    }

    /// A column other than the selected pair, preferring "Region"
    fn default_group_column(&self) -> Option<String> {
        let candidates: Vec<String> = self
            .column_names()
            .into_iter()
            .filter(|name| *name != self.time_column && *name != self.value_column)
            .collect();
        candidates
            .iter()
            .find(|name| name.eq_ignore_ascii_case("region"))
            .or_else(|| candidates.first())
            .cloned()
    }

    /// Recompute the breakdown when the grouping or value column changed
    pub fn refresh_breakdown(&mut self) {
        let Some(table) = &self.table else {
            self.breakdown = None;
            return;
        };
        if self.breakdown.as_ref().is_some_and(|b| {
            b.group_column == self.group_column && b.value_column == self.value_column
        }) {
            return;
        }

        let groups = MetricsEngine::breakdown(table, &self.group_column, &self.value_column);
        let histogram = MetricsEngine::histogram(table, &self.value_column, HISTOGRAM_BINS);
        let (groups, histogram) = match (groups, histogram) {
            (Ok(groups), Ok(histogram)) => (groups, histogram),
            (Err(e), _) | (_, Err(e)) => {
                log::debug!("Breakdown unavailable: {}", e);
                (Vec::new(), Vec::new())
            }
        };
        self.breakdown = Some(DatasetBreakdown {
            group_column: self.group_column.clone(),
            value_column: self.value_column.clone(),
            groups,
            histogram,
        });
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CsvConnector;

    #[test]
    fn test_breakdown_follows_group_column() {
        let source = DataSource::Upload {
            name: "sales.csv".to_string(),
            bytes: b"Date,Product,Region,Sales\n\
                2024-01-01,A,North,10\n\
                2024-01-02,B,South,30\n\
                2024-01-03,A,North,5\n"
                .to_vec(),
        };
        let table = CsvConnector::new("data/sales.csv").load(&source).unwrap();
        let preview = CsvConnector::create_preview(&source, &table);

        let mut state = AppState::default();
        state.set_table(source, table, preview);
        assert_eq!(state.group_column, "Region");

        state.refresh_breakdown();
        let breakdown = state.breakdown.as_ref().unwrap();
        assert_eq!(breakdown.groups[0].group, "South");
        assert_eq!(breakdown.groups[1].total, 15.0);
        assert_eq!(breakdown.histogram.iter().map(|b| b.count).sum::<usize>(), 3);

        state.group_column = "Product".to_string();
        state.refresh_breakdown();
        let breakdown = state.breakdown.as_ref().unwrap();
        assert_eq!(breakdown.group_column, "Product");
        assert_eq!(breakdown.groups[0].group, "B");
        assert_eq!(breakdown.groups[0].rows, 1);
    }
}
