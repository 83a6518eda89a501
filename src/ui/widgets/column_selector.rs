use crate::data::DataValidator;
use crate::ui::state::AppState;

pub struct ColumnSelector;

impl ColumnSelector {
    pub fn show(ui: &mut egui::Ui, state: &mut AppState) {
        let columns = state.column_names();
        if columns.is_empty() {
            ui.label("Load a dataset to choose columns");
            return;
        }

        Self::combo(ui, "time_column", "Time Column:", &columns, &mut state.time_column);
        Self::combo(ui, "value_column", "Value Column:", &columns, &mut state.value_column);

        if let Some(table) = &state.table {
            if let Err(e) = DataValidator::resolve(table, &state.time_column, &state.value_column) {
                ui.colored_label(egui::Color32::RED, e.to_string());
            }
        }
    }

    fn combo(ui: &mut egui::Ui, id: &str, label: &str, columns: &[String], selected: &mut String) {
        ui.horizontal(|ui| {
            ui.label(label);
            egui::ComboBox::from_id_salt(id)
                .selected_text(selected.as_str())
                .show_ui(ui, |ui| {
                    for column in columns {
                        ui.selectable_value(selected, column.clone(), column);
                    }
                });
        });
    }
}
