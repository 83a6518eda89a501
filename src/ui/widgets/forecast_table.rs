use crate::engines::forecast::ForecastRecord;

pub struct ForecastTable;

impl ForecastTable {
    pub fn show(ui: &mut egui::Ui, records: &[ForecastRecord], confidence: f64) {
        if records.is_empty() {
            return;
        }

        let interval = format!("{:.0}%", confidence * 100.0);
        egui::ScrollArea::vertical()
            .id_salt("forecast_table_scroll")
            .show(ui, |ui| {
                egui::Grid::new("forecast_table")
                    .striped(true)
                    .num_columns(4)
                    .show(ui, |ui| {
                        // Header
                        ui.strong("Date");
                        ui.strong("Forecast");
                        ui.strong(format!("Lower {}", interval));
                        ui.strong(format!("Upper {}", interval));
                        ui.end_row();

                        for record in records {
                            ui.label(&record.date);
                            ui.label(format!("{:.2}", record.forecast));
                            ui.label(format!("{:.2}", record.lower));
                            ui.label(format!("{:.2}", record.upper));
                            ui.end_row();
                        }
                    });
            });
    }
}
