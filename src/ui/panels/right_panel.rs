use crate::config::{ConfigManager, DEFAULT_CONFIG_FILE};
use crate::pipeline::ForecastReport;
use crate::ui::services::ConfigBridge;
use crate::ui::state::AppState;

pub struct RightPanel;

impl RightPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn show(&mut self, ui: &mut egui::Ui, state: &mut AppState) {
        ui.heading("Details");

        ui.separator();

        if let Some(report) = &state.report {
            Self::show_model(ui, report);
            ui.separator();
            Self::show_series(ui, report);
            ui.separator();
            Self::show_accuracy(ui, report);
            ui.separator();
            if let Some(message) = Self::show_export(ui, report) {
                state.status_message = message;
            }
        } else {
            ui.label("Run a forecast to view model details");
        }

        ui.separator();
        Self::show_settings(ui, state);
    }

    fn show_model(ui: &mut egui::Ui, report: &ForecastReport) {
        let model = &report.model;
        ui.group(|ui| {
            ui.heading("Model");
            Self::row(ui, "Order:", model.order.to_string());
            Self::row(ui, "Observations:", model.observations.to_string());
            Self::row(ui, "AIC:", format!("{:.2}", model.aic));
            Self::row(ui, "BIC:", format!("{:.2}", model.bic));
            Self::row(ui, "Sigma²:", format!("{:.4}", model.sigma2));
            if model.intercept != 0.0 {
                Self::row(ui, "Mean:", format!("{:.4}", model.intercept));
            }
            Self::row(ui, "Iterations:", model.iterations.to_string());

            ui.collapsing("Coefficients", |ui| {
                for (i, c) in model.ar_coefficients.iter().enumerate() {
                    Self::row(ui, &format!("ar.L{}:", i + 1), format!("{:.4}", c));
                }
                for (i, c) in model.ma_coefficients.iter().enumerate() {
                    Self::row(ui, &format!("ma.L{}:", i + 1), format!("{:.4}", c));
                }
            });

            if !report.candidates.is_empty() {
                ui.collapsing("Order Candidates", |ui| {
                    egui::Grid::new("candidate_grid").striped(true).show(ui, |ui| {
                        ui.strong("Order");
                        ui.strong("AIC");
                        ui.end_row();
                        for candidate in &report.candidates {
                            ui.label(candidate.order.to_string());
                            match (candidate.aic, &candidate.failure) {
                                (Some(aic), _) => ui.label(format!("{:.2}", aic)),
                                (None, Some(failure)) => ui.weak(failure),
                                (None, None) => ui.weak("-"),
                            };
                            ui.end_row();
                        }
                    });
                });
            }
        });
    }

    fn show_series(ui: &mut egui::Ui, report: &ForecastReport) {
        let summary = &report.series_summary;
        let clean = &report.clean_report;
        ui.group(|ui| {
            ui.heading("Series");
            Self::row(ui, "Column:", report.selection.value_column().to_string());
            Self::row(ui, "Count:", summary.count.to_string());
            Self::row(ui, "Mean:", format!("{:.2}", summary.mean));
            Self::row(ui, "Std:", format!("{:.2}", summary.std));
            Self::row(ui, "Min:", format!("{:.2}", summary.min));
            Self::row(ui, "25%:", format!("{:.2}", summary.q25));
            Self::row(ui, "50%:", format!("{:.2}", summary.median));
            Self::row(ui, "75%:", format!("{:.2}", summary.q75));
            Self::row(ui, "Max:", format!("{:.2}", summary.max));

            ui.collapsing("Cleaning", |ui| {
                Self::row(ui, "Input rows:", clean.input_rows.to_string());
                Self::row(ui, "Invalid dates:", clean.invalid_timestamps.to_string());
                Self::row(ui, "Missing values:", clean.missing_values.to_string());
                Self::row(ui, "Filled:", clean.filled_values.to_string());
                Self::row(ui, "Dropped rows:", clean.dropped_rows.to_string());
            });
        });
    }

    fn show_accuracy(ui: &mut egui::Ui, report: &ForecastReport) {
        ui.group(|ui| {
            ui.heading("Holdout Accuracy");
            let mut found = false;
            for (key, label) in [
                ("holdout_mae", "MAE:"),
                ("holdout_rmse", "RMSE:"),
                ("holdout_mape", "MAPE %:"),
            ] {
                if let Some(value) = report.metrics.get(key) {
                    Self::row(ui, label, format!("{:.3}", value));
                    found = true;
                }
            }
            if !found {
                ui.weak("Series too short for holdout evaluation");
            }
        });
    }

    /// Returns a status message when an export was attempted
    fn show_export(ui: &mut egui::Ui, report: &ForecastReport) -> Option<String> {
        let mut message = None;
        ui.horizontal(|ui| {
            if ui.button("Export CSV...").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("CSV Files", &["csv"])
                    .set_file_name("forecast.csv")
                    .save_file()
                {
                    message = Some(match report.forecast.write_csv(&path) {
                        Ok(()) => format!("Forecast saved to {}", path.display()),
                        Err(e) => format!("Export failed: {}", e),
                    });
                }
            }

            if ui.button("Copy JSON").clicked() {
                ui.ctx().copy_text(report.forecast.to_json_payload().to_string());
                message = Some("Forecast JSON copied to clipboard".to_string());
            }
        });
        message
    }

    fn show_settings(ui: &mut egui::Ui, state: &mut AppState) {
        ui.collapsing("Settings", |ui| {
            for manifest in ConfigBridge::to_app_config(state).manifests() {
                ui.strong(&manifest.section);
                for field in &manifest.fields {
                    ui.horizontal(|ui| {
                        ui.label(format!("{}:", field.name))
                            .on_hover_text(&field.description);
                        ui.monospace(field.value.to_string());
                    });
                }
            }

            if ui.button(format!("Save to {}", DEFAULT_CONFIG_FILE)).clicked() {
                let manager = ConfigManager::new();
                let config = ConfigBridge::to_app_config(state);
                let result = manager
                    .update(|c| *c = config.clone())
                    .and_then(|_| manager.save_to_file(DEFAULT_CONFIG_FILE));
                state.status_message = match result {
                    Ok(()) => {
                        state.config = config;
                        format!("Settings saved to {}", DEFAULT_CONFIG_FILE)
                    }
                    Err(e) => format!("Failed to save settings: {}", e),
                };
            }
        });
    }

    fn row(ui: &mut egui::Ui, label: &str, value: String) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.label(value);
        });
    }
}
