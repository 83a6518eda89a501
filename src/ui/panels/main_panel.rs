use crate::ui::state::AppState;
use crate::ui::widgets::{BreakdownTable, ForecastTable, LineChart};

pub struct MainPanel;

impl MainPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn show(&mut self, ui: &mut egui::Ui, state: &mut AppState) {
        ui.heading("Sales Forecast");

        ui.separator();

        if state.is_running {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(&state.status_message);
            });
        } else {
            ui.label(&state.status_message);
        }

        if let Some(failure) = &state.last_error {
            ui.colored_label(
                egui::Color32::RED,
                format!("[{}] {}", failure.reason, failure.message),
            );
        }

        ui.separator();

        Self::show_breakdown(ui, state);

        let Some(report) = &state.report else {
            ui.centered_and_justified(|ui| {
                ui.label("No forecast yet. Load data and click 'Generate Forecast'.");
            });
            return;
        };

        if let Some(range) = report.series_summary.date_range() {
            ui.label(format!("Historical data: {}", range));
        }

        ui.horizontal(|ui| {
            ui.label(format!(
                "{} | {} periods | {:.0}% interval",
                report.model.order,
                report.forecast.len(),
                report.forecast.confidence * 100.0
            ));
            ui.checkbox(&mut state.show_bounds, "Show interval");
        });

        LineChart::show(ui, report, state.show_bounds, 280.0);

        ui.separator();
        ui.label(format!("{} forecast points", report.forecast.len()));
        ForecastTable::show(ui, &report.forecast.records(), report.forecast.confidence);
    }

    fn show_breakdown(ui: &mut egui::Ui, state: &mut AppState) {
        if state.table.is_none() {
            return;
        }

        let columns: Vec<String> = state
            .column_names()
            .into_iter()
            .filter(|name| *name != state.value_column && *name != state.time_column)
            .collect();

        egui::CollapsingHeader::new("Dataset Breakdown")
            .default_open(false)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Group by:");
                    egui::ComboBox::from_id_salt("group_column")
                        .selected_text(&state.group_column)
                        .show_ui(ui, |ui| {
                            for name in &columns {
                                ui.selectable_value(&mut state.group_column, name.clone(), name);
                            }
                        });
                });

                state.refresh_breakdown();
                if let Some(breakdown) = &state.breakdown {
                    egui::ScrollArea::vertical()
                        .id_salt("breakdown_scroll")
                        .max_height(260.0)
                        .show(ui, |ui| BreakdownTable::show(ui, breakdown));
                }
            });

        ui.separator();
    }
}
