use crate::config::AppConfig;
use crate::data::{ModelCache, RawTable};
use crate::pipeline::{ForecastPipeline, ForecastReport, ForecastRequest};
use crate::ui::state::RunFailure;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Progress update from the forecast thread
#[derive(Clone, Debug)]
pub struct ProgressUpdate {
    pub status: String,
}

/// Result from a forecast run
pub type RunResult = Result<ForecastReport, RunFailure>;

pub struct ForecastRunner {
    handle: Option<JoinHandle<RunResult>>,
    progress_rx: Option<Receiver<ProgressUpdate>>,
}

impl ForecastRunner {
    /// Start a forecast in a background thread
    pub fn start(
        config: AppConfig,
        cache: Arc<ModelCache>,
        table: RawTable,
        request: ForecastRequest,
    ) -> std::io::Result<Self> {
        let (progress_tx, progress_rx) = channel();

        let handle = thread::Builder::new()
            .name("forecast".to_string())
            .spawn(move || Self::run_forecast(config, cache, table, request, progress_tx))?;

        Ok(Self {
            handle: Some(handle),
            progress_rx: Some(progress_rx),
        })
    }

    /// Poll for progress updates (non-blocking)
    pub fn poll_progress(&mut self) -> Option<ProgressUpdate> {
        if let Some(rx) = &self.progress_rx {
            rx.try_recv().ok()
        } else {
            None
        }
    }

    /// Check if the forecast is complete and get results
    pub fn try_get_results(&mut self) -> Option<RunResult> {
        let handle = self.handle.take()?;
        if handle.is_finished() {
            match handle.join() {
                Ok(result) => Some(result),
                Err(_) => Some(Err(RunFailure {
                    reason: "internal".to_string(),
                    message: "Forecast thread panicked".to_string(),
                })),
            }
        } else {
            // Not finished yet, put handle back
            self.handle = Some(handle);
            None
        }
    }

    /// Run the pipeline (called in background thread)
    fn run_forecast(
        config: AppConfig,
        cache: Arc<ModelCache>,
        table: RawTable,
        request: ForecastRequest,
        progress_tx: Sender<ProgressUpdate>,
    ) -> RunResult {
        log::info!(
            "Forecast thread started: {} rows, '{}' over '{}'",
            table.height(),
            request.value_column,
            request.time_column
        );
        let _ = progress_tx.send(ProgressUpdate {
            status: format!("Fitting on {} rows...", table.height()),
        });

        let pipeline = ForecastPipeline::from_config(&config).with_cache(cache);
        match pipeline.run_table(&table, &request) {
            Ok(report) => {
                let _ = progress_tx.send(ProgressUpdate {
                    status: format!(
                        "Complete: {} forecast with {}",
                        report.forecast.len(),
                        report.model.order
                    ),
                });
                Ok(report)
            }
            Err(e) => {
                log::warn!("Forecast failed ({}): {}", e.reason(), e);
                let _ = progress_tx.send(ProgressUpdate {
                    status: format!("Error: {}", e),
                });
                Err(RunFailure {
                    reason: e.reason().to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawTable;
    use std::time::{Duration, Instant};

    fn table(rows: usize) -> RawTable {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        RawTable::from_columns(vec![
            (
                "Date".to_string(),
                (0..rows)
                    .map(|i| Some((start + chrono::Duration::days(i as i64)).to_string()))
                    .collect(),
            ),
            (
                "Sales".to_string(),
                (0..rows).map(|i| Some((100 + i % 7).to_string())).collect(),
            ),
        ])
        .unwrap()
    }

    fn wait(runner: &mut ForecastRunner) -> RunResult {
        let started = Instant::now();
        loop {
            if let Some(result) = runner.try_get_results() {
                return result;
            }
            assert!(started.elapsed() < Duration::from_secs(30), "runner did not finish");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_runner_reports_success() {
        let mut runner = ForecastRunner::start(
            AppConfig::default(),
            Arc::new(ModelCache::new(4)),
            table(60),
            ForecastRequest::new("Date", "Sales").with_horizon(7),
        )
        .unwrap();

        let report = wait(&mut runner).unwrap();
        assert_eq!(report.forecast.len(), 7);
        assert!(runner.poll_progress().is_some());
    }

    #[test]
    fn test_runner_reports_reason_on_failure() {
        let mut runner = ForecastRunner::start(
            AppConfig::default(),
            Arc::new(ModelCache::new(4)),
            table(10),
            ForecastRequest::new("Date", "Sales"),
        )
        .unwrap();

        let failure = wait(&mut runner).unwrap_err();
        assert_eq!(failure.reason, "too_few_rows");
    }
}
