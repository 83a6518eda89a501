use crate::data::DataValidator;
use crate::engines::forecast::MAX_HORIZON;
use crate::types::{ArimaOrder, MissingPolicy};
use crate::ui::state::AppState;
use crate::ui::widgets::{ColumnSelector, DataSelector};

pub struct LeftPanel;

impl LeftPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn show(&mut self, ui: &mut egui::Ui, state: &mut AppState) {
        ui.heading("Configuration");
        ui.separator();

        // 1. Data
        egui::CollapsingHeader::new("Data")
            .default_open(true)
            .show(ui, |ui| {
                DataSelector::show(ui, state);
            });

        ui.separator();

        // 2. Columns
        egui::CollapsingHeader::new("Columns")
            .default_open(true)
            .show(ui, |ui| {
                ColumnSelector::show(ui, state);
            });

        ui.separator();

        // 3. Model
        egui::CollapsingHeader::new("Model")
            .default_open(true)
            .show(ui, |ui| {
                Self::show_model_config(ui, state);
            });

        ui.separator();

        // 4. Control Buttons
        Self::show_control_buttons(ui, state);
    }

    fn show_model_config(ui: &mut egui::Ui, state: &mut AppState) {
        ui.horizontal(|ui| {
            ui.label("Missing Values:");
            egui::ComboBox::from_id_salt("missing_policy")
                .selected_text(state.missing_policy.as_str())
                .show_ui(ui, |ui| {
                    for policy in MissingPolicy::all() {
                        ui.selectable_value(&mut state.missing_policy, policy, policy.as_str());
                    }
                });
        });

        ui.horizontal(|ui| {
            ui.label("Forecast Days:");
            ui.add(egui::Slider::new(&mut state.horizon, 1..=MAX_HORIZON));
        });

        ui.checkbox(&mut state.auto_order, "Select order by AIC");

        ui.add_enabled_ui(!state.auto_order, |ui| {
            ui.horizontal(|ui| {
                ui.label("p:");
                ui.add(egui::DragValue::new(&mut state.order.p).range(0..=ArimaOrder::MAX_P));
                ui.label("d:");
                ui.add(egui::DragValue::new(&mut state.order.d).range(0..=ArimaOrder::MAX_D));
                ui.label("q:");
                ui.add(egui::DragValue::new(&mut state.order.q).range(0..=ArimaOrder::MAX_Q));
            });
        });

        if ui.small_button("Reset to ARIMA(5,1,0)").clicked() {
            state.order = ArimaOrder::default();
        }
    }

    fn show_control_buttons(ui: &mut egui::Ui, state: &mut AppState) {
        ui.vertical_centered(|ui| {
            // Validate before allowing run
            let validation = Self::validate_config(state);
            let can_run = validation.is_ok() && !state.is_running;

            let run_button = ui.add_enabled(can_run, egui::Button::new("▶ Generate Forecast"));
            if run_button.clicked() {
                state.run_requested = true;
                state.status_message = "Starting forecast...".to_string();
            }

            if let Err(error) = validation {
                ui.colored_label(egui::Color32::RED, error);
            }
        });
    }

    fn validate_config(state: &AppState) -> Result<(), String> {
        let Some(table) = &state.table else {
            return Err("No data loaded".to_string());
        };

        DataValidator::resolve(table, &state.time_column, &state.value_column)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
