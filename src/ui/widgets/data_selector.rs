use crate::data::{CsvConnector, DataSource};
use crate::ui::services::DataLoader;
use crate::ui::state::AppState;

pub struct DataSelector;

impl DataSelector {
    pub fn show(ui: &mut egui::Ui, state: &mut AppState) {
        let connector = CsvConnector::new(state.config.data.default_dataset.clone());

        ui.horizontal(|ui| {
            if ui.button("Use Default Dataset").clicked() {
                Self::load_source(state, &connector, DataSource::DefaultFile);
            }

            if ui.button("Upload CSV...").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("CSV Files", &["csv"])
                    .pick_file()
                {
                    match DataLoader::read_upload(&path) {
                        Ok(source) => Self::load_source(state, &connector, source),
                        Err(e) => state.status_message = format!("Error loading data: {}", e),
                    }
                }
            }
        });

        // Display current dataset info
        if let Some(preview) = &state.data_preview {
            ui.label(format!("Source: {}", preview.metadata.source));
            ui.label(format!("Rows: {}", preview.metadata.num_rows));
            ui.label(format!("Columns: {}", preview.metadata.num_columns));

            ui.collapsing("Preview", |ui| {
                egui::ScrollArea::both().max_height(150.0).show(ui, |ui| {
                    egui::Grid::new("data_preview_grid")
                        .striped(true)
                        .show(ui, |ui| {
                            // Header
                            for col_name in &preview.metadata.columns {
                                ui.strong(col_name);
                            }
                            ui.end_row();

                            // Rows
                            for row in &preview.first_rows {
                                for cell in row {
                                    ui.label(cell);
                                }
                                ui.end_row();
                            }
                        });
                });
            });

            ui.collapsing("Column Statistics", |ui| {
                egui::Grid::new("column_stats_grid")
                    .striped(true)
                    .show(ui, |ui| {
                        ui.strong("Column");
                        ui.strong("Nulls");
                        ui.strong("Numeric");
                        ui.strong("Mean");
                        ui.end_row();

                        for stats in &preview.column_stats {
                            ui.label(&stats.name);
                            ui.label(stats.null_count.to_string());
                            ui.label(stats.numeric_count.to_string());
                            ui.label(stats.mean.map_or("-".to_string(), |m| format!("{:.2}", m)));
                            ui.end_row();
                        }
                    });
            });
        } else {
            ui.label("No data loaded");
        }
    }

    fn load_source(state: &mut AppState, connector: &CsvConnector, source: DataSource) {
        match DataLoader::load(connector, &source) {
            Ok((table, preview)) => {
                if let Some((time, value)) =
                    DataLoader::suggest_columns(&table, &state.time_column, &state.value_column)
                {
                    state.time_column = time;
                    state.value_column = value;
                }
                state.status_message = format!("Loaded {} rows from {}", table.height(), source.label());
                state.set_table(source, table, preview);
            }
            Err(e) => {
                state.status_message = format!("Error loading data ({}): {}", e.reason(), e);
            }
        }
    }
}
