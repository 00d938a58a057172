//! Chart Plotter Module
//! Interactive visualizations for the dashboard views using egui_plot.

use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints, Points};

use crate::analytics::AggRow;

/// Color palette cycled across series and pie slices.
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(255, 87, 34),   // Deep Orange
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

/// Line color for the sales trend.
pub const TREND_COLOR: Color32 = Color32::from_rgb(26, 188, 156);

const CHART_HEIGHT: f32 = 380.0;
const PIE_DIAMETER: f32 = 320.0;

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Color for the i-th series.
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Draw a bar chart with one bar per group, labelled on the x-axis.
    pub fn draw_bar_chart(
        ui: &mut egui::Ui,
        id: &str,
        rows: &[AggRow],
        x_label: &str,
        y_label: &str,
    ) {
        let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
        let bars: Vec<Bar> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                Bar::new(i as f64, row.value)
                    .width(0.6)
                    .fill(Self::series_color(i))
                    .name(&row.label)
            })
            .collect();

        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if idx < labels.len() {
                    labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    /// Draw a line chart with markers, one point per group in row order.
    pub fn draw_line_chart(
        ui: &mut egui::Ui,
        id: &str,
        rows: &[AggRow],
        x_label: &str,
        y_label: &str,
    ) {
        let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
        let points_vec: Vec<[f64; 2]> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| [i as f64, row.value])
            .collect();

        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if idx < labels.len() {
                    labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(points_vec.iter().copied()))
                        .color(TREND_COLOR)
                        .width(2.0)
                        .name(y_label),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points_vec.iter().copied()))
                        .radius(3.5)
                        .color(TREND_COLOR),
                );
            });
    }

    /// Draw a pie chart of each row's share of the total, with percentage
    /// labels on slices large enough to hold them.
    pub fn draw_pie_chart(ui: &mut egui::Ui, rows: &[AggRow]) {
        let total: f64 = rows.iter().map(|r| r.value).sum();
        if total <= 0.0 {
            ui.label("No data");
            return;
        }

        let (response, painter) = ui.allocate_painter(
            egui::vec2(PIE_DIAMETER, PIE_DIAMETER),
            egui::Sense::hover(),
        );
        let center = response.rect.center();
        let radius = response.rect.width().min(response.rect.height()) * 0.5 - 4.0;

        // Start at 12 o'clock, sweep clockwise.
        let mut angle = -std::f64::consts::FRAC_PI_2;
        for (i, row) in rows.iter().enumerate() {
            let frac = row.value / total;
            let sweep = frac * std::f64::consts::TAU;
            let color = Self::series_color(i);

            // Tessellate the slice as a fan of thin triangles so wide
            // slices stay convex.
            let steps = ((sweep / 0.05).ceil() as usize).max(2);
            let point_at = |a: f64| {
                egui::pos2(
                    center.x + radius * (a.cos() as f32),
                    center.y + radius * (a.sin() as f32),
                )
            };
            let mut prev = point_at(angle);
            for s in 1..=steps {
                let next = point_at(angle + sweep * s as f64 / steps as f64);
                painter.add(egui::Shape::convex_polygon(
                    vec![center, prev, next],
                    color,
                    egui::Stroke::NONE,
                ));
                prev = next;
            }

            if frac >= 0.04 {
                let mid = angle + sweep / 2.0;
                let label_pos = egui::pos2(
                    center.x + radius * 0.6 * (mid.cos() as f32),
                    center.y + radius * 0.6 * (mid.sin() as f32),
                );
                painter.text(
                    label_pos,
                    egui::Align2::CENTER_CENTER,
                    format!("{:.0}%", frac * 100.0),
                    egui::FontId::proportional(13.0),
                    Color32::WHITE,
                );
            }

            angle += sweep;
        }
    }

    /// Legend row of color squares and labels, one entry per series.
    pub fn draw_legend(ui: &mut egui::Ui, rows: &[AggRow]) {
        ui.horizontal_wrapped(|ui| {
            for (i, row) in rows.iter().enumerate() {
                let (rect, _) =
                    ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
                ui.painter().rect_filled(rect, 3.0, Self::series_color(i));
                ui.label(RichText::new(&row.label).size(12.0));
                ui.add_space(10.0);
            }
        });
    }

    /// Striped two-column table of labels and formatted values.
    pub fn draw_value_table<F>(
        ui: &mut egui::Ui,
        table_id: &str,
        label_header: &str,
        value_header: &str,
        rows: &[AggRow],
        format_value: F,
    ) where
        F: Fn(f64) -> String,
    {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(table_id.to_string()))
                    .striped(true)
                    .min_col_width(100.0)
                    .spacing([16.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new(label_header).strong().size(12.0));
                        ui.label(RichText::new(value_header).strong().size(12.0));
                        ui.end_row();

                        for row in rows {
                            ui.label(RichText::new(&row.label).size(12.0));
                            ui.label(RichText::new(format_value(row.value)).size(12.0));
                            ui.end_row();
                        }
                    });
            });
    }
}
