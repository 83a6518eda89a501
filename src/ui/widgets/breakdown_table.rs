use crate::ui::state::DatasetBreakdown;

pub struct BreakdownTable;

impl BreakdownTable {
    pub fn show(ui: &mut egui::Ui, breakdown: &DatasetBreakdown) {
        if breakdown.groups.is_empty() {
            ui.weak(format!(
                "No breakdown of '{}' by '{}'",
                breakdown.value_column, breakdown.group_column
            ));
        } else {
            Self::show_groups(ui, breakdown);
        }

        if !breakdown.histogram.is_empty() {
            ui.add_space(6.0);
            ui.strong(format!("{} distribution", breakdown.value_column));
            Self::show_histogram(ui, breakdown);
        }
    }

    fn show_groups(ui: &mut egui::Ui, breakdown: &DatasetBreakdown) {
        let grand_total: f64 = breakdown.groups.iter().map(|g| g.total).sum();

        egui::Grid::new("breakdown_table")
            .striped(true)
            .num_columns(6)
            .show(ui, |ui| {
                ui.strong(&breakdown.group_column);
                ui.strong("Rows");
                ui.strong(format!("Total {}", breakdown.value_column));
                ui.strong("Share");
                ui.strong("Mean");
                ui.strong("Min / Max");
                ui.end_row();

                for group in &breakdown.groups {
                    ui.label(&group.group);
                    ui.label(group.rows.to_string());
                    ui.label(format!("{:.2}", group.total));
                    if grand_total != 0.0 {
                        ui.label(format!("{:.1}%", group.total / grand_total * 100.0));
                    } else {
                        ui.weak("-");
                    }
                    ui.label(format!("{:.2}", group.mean));
                    ui.label(format!("{:.2} / {:.2}", group.min, group.max));
                    ui.end_row();
                }
            });
    }

    fn show_histogram(ui: &mut egui::Ui, breakdown: &DatasetBreakdown) {
        let largest = breakdown
            .histogram
            .iter()
            .map(|bin| bin.count)
            .max()
            .unwrap_or(0)
            .max(1);

        egui::Grid::new("histogram_table")
            .num_columns(2)
            .show(ui, |ui| {
                for bin in &breakdown.histogram {
                    ui.monospace(format!("{:>10.1} - {:<10.1}", bin.lower, bin.upper));
                    ui.add(
                        egui::ProgressBar::new(bin.count as f32 / largest as f32)
                            .desired_width(180.0)
                            .text(bin.count.to_string()),
                    );
                    ui.end_row();
                }
            });
    }
}
