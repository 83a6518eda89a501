use super::panels::{LeftPanel, MainPanel, RightPanel};
use super::services::{ConfigBridge, ForecastRunner};
use super::state::{AppState, RunFailure};
use crate::config::AppConfig;
use crate::data::ModelCache;
use std::sync::Arc;
use std::time::Duration;

pub struct SalescastApp {
    state: AppState,
    left_panel: LeftPanel,
    main_panel: MainPanel,
    right_panel: RightPanel,
    runner: Option<ForecastRunner>,
    cache: Arc<ModelCache>,
}

impl SalescastApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let cache = Arc::new(ModelCache::new(config.forecast.cache_capacity));
        Self {
            state: AppState::new(config),
            left_panel: LeftPanel::new(),
            main_panel: MainPanel::new(),
            right_panel: RightPanel::new(),
            runner: None,
            cache,
        }
    }

    fn start_run(&mut self) {
        self.state.run_requested = false;
        let Some(table) = self.state.table.clone() else {
            self.state.status_message = "No data loaded".to_string();
            return;
        };

        let config = ConfigBridge::to_app_config(&self.state);
        let request = ConfigBridge::to_request(&self.state);
        match ForecastRunner::start(config, Arc::clone(&self.cache), table, request) {
            Ok(runner) => {
                self.runner = Some(runner);
                self.state.is_running = true;
                self.state.last_error = None;
            }
            Err(e) => {
                self.state.last_error = Some(RunFailure {
                    reason: "internal".to_string(),
                    message: format!("Failed to start forecast thread: {}", e),
                });
            }
        }
    }

    fn poll_runner(&mut self, ctx: &egui::Context) {
        let Some(runner) = self.runner.as_mut() else {
            return;
        };

        while let Some(update) = runner.poll_progress() {
            self.state.status_message = update.status;
        }

        match runner.try_get_results() {
            Some(Ok(report)) => {
                self.state.report = Some(report);
                self.state.is_running = false;
                self.runner = None;
            }
            Some(Err(failure)) => {
                self.state.status_message = format!("Forecast failed: {}", failure.reason);
                self.state.last_error = Some(failure);
                self.state.is_running = false;
                self.runner = None;
            }
            None => ctx.request_repaint_after(Duration::from_millis(50)),
        }
    }
}

impl eframe::App for SalescastApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.state.run_requested && self.runner.is_none() {
            self.start_run();
        }
        self.poll_runner(ctx);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Salescast - Sales Forecasting");
            });
        });

        // Left Panel - Data and model configuration
        egui::SidePanel::left("left_panel")
            .default_width(300.0)
            .resizable(true)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.left_panel.show(ui, &mut self.state);
                });
            });

        // Right Panel - Model details and exports
        egui::SidePanel::right("right_panel")
            .default_width(320.0)
            .resizable(true)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.right_panel.show(ui, &mut self.state);
                });
            });

        // Central Panel - Chart and forecast table
        egui::CentralPanel::default().show(ctx, |ui| {
            self.main_panel.show(ui, &mut self.state);
        });
    }
}
