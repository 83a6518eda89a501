use crate::data::timestamp::format_timestamp;
use crate::pipeline::ForecastReport;
use chrono::NaiveDateTime;
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke};

const HISTORY_COLOR: Color32 = Color32::from_rgb(70, 130, 200);
const FORECAST_COLOR: Color32 = Color32::from_rgb(230, 120, 40);
const BOUND_COLOR: Color32 = Color32::from_rgb(200, 160, 120);

/// History and forecast drawn on one time axis
pub struct LineChart;

impl LineChart {
    pub fn show(ui: &mut egui::Ui, report: &ForecastReport, show_bounds: bool, height: f32) {
        let size = egui::vec2(ui.available_width(), height);
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let frame = response.rect;
        painter.rect_filled(frame, 4.0, ui.visuals().extreme_bg_color);

        let history: Vec<(NaiveDateTime, f64)> = report.series.points().collect();
        let forecast = &report.forecast.points;
        let (Some(first), Some(last)) = (history.first(), forecast.last().map(|p| p.timestamp)) else {
            return;
        };

        let t0 = first.0.and_utc().timestamp() as f64;
        let t1 = last.and_utc().timestamp() as f64;

        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for &(_, v) in &history {
            y_min = y_min.min(v);
            y_max = y_max.max(v);
        }
        for point in forecast {
            let (lo, hi) = if show_bounds {
                (point.lower, point.upper)
            } else {
                (point.value, point.value)
            };
            y_min = y_min.min(lo);
            y_max = y_max.max(hi);
        }
        if !(y_min.is_finite() && y_max.is_finite()) {
            return;
        }
        if y_max - y_min < 1e-12 {
            y_min -= 1.0;
            y_max += 1.0;
        }

        let plot = Rect::from_min_max(
            frame.min + egui::vec2(60.0, 10.0),
            frame.max - egui::vec2(10.0, 24.0),
        );
        let to_screen = |ts: &NaiveDateTime, value: f64| -> Pos2 {
            let x_frac = if t1 > t0 {
                (ts.and_utc().timestamp() as f64 - t0) / (t1 - t0)
            } else {
                0.5
            };
            let y_frac = (value - y_min) / (y_max - y_min);
            Pos2::new(
                plot.left() + x_frac as f32 * plot.width(),
                plot.bottom() - y_frac as f32 * plot.height(),
            )
        };

        let text_color = ui.visuals().text_color();
        let font = FontId::proportional(11.0);
        painter.text(plot.left_top() - egui::vec2(6.0, 0.0), Align2::RIGHT_TOP, format!("{:.1}", y_max), font.clone(), text_color);
        painter.text(plot.left_bottom() - egui::vec2(6.0, 0.0), Align2::RIGHT_BOTTOM, format!("{:.1}", y_min), font.clone(), text_color);
        painter.text(plot.left_bottom() + egui::vec2(0.0, 6.0), Align2::LEFT_TOP, format_timestamp(&first.0), font.clone(), text_color);
        painter.text(plot.right_bottom() + egui::vec2(0.0, 6.0), Align2::RIGHT_TOP, format_timestamp(&last), font, text_color);

        let history_points: Vec<Pos2> = history.iter().map(|(ts, v)| to_screen(ts, *v)).collect();
        painter.add(Shape::line(history_points, Stroke::new(1.5, HISTORY_COLOR)));

        // Forecast continues from the last observation
        let mut forecast_points: Vec<Pos2> = history
            .last()
            .map(|(ts, v)| vec![to_screen(ts, *v)])
            .unwrap_or_default();
        forecast_points.extend(forecast.iter().map(|p| to_screen(&p.timestamp, p.value)));
        painter.add(Shape::line(forecast_points, Stroke::new(2.0, FORECAST_COLOR)));

        if show_bounds {
            for bound in [
                forecast.iter().map(|p| to_screen(&p.timestamp, p.lower)).collect::<Vec<_>>(),
                forecast.iter().map(|p| to_screen(&p.timestamp, p.upper)).collect::<Vec<_>>(),
            ] {
                painter.extend(Shape::dashed_line(&bound, Stroke::new(1.0, BOUND_COLOR), 4.0, 3.0));
            }
        }

        if let Some(hover) = response.hover_pos() {
            if plot.contains(hover) {
                painter.line_segment(
                    [Pos2::new(hover.x, plot.top()), Pos2::new(hover.x, plot.bottom())],
                    Stroke::new(0.5, ui.visuals().weak_text_color()),
                );
            }
        }
    }
}
