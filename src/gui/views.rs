//! View Area Widget
//! Central panel rendering the active dashboard view from the precomputed
//! aggregates.

use egui::{Color32, RichText, ScrollArea};

use super::sidebar::View;
use crate::analytics::DashboardData;
use crate::charts::ChartPlotter;

/// Central display area. Holds the aggregates for the current filter
/// window and renders whichever view the sidebar selects.
pub struct ViewArea {
    data: Option<DashboardData>,
}

impl Default for ViewArea {
    fn default() -> Self {
        Self { data: None }
    }
}

impl ViewArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the displayed aggregates.
    pub fn set_data(&mut self, data: DashboardData) {
        self.data = Some(data);
    }

    /// Draw the active view.
    pub fn show(&self, ui: &mut egui::Ui, view: View) {
        let Some(data) = &self.data else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Loading data...").size(20.0));
            });
            return;
        };

        ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            ui.add_space(5.0);
            ui.label(RichText::new(view.title()).size(20.0).strong());
            ui.add_space(10.0);

            match view {
                View::Overview => Self::draw_overview(ui, data),
                View::CustomerDistribution => Self::draw_customer_distribution(ui, data),
                View::SalesTrend => Self::draw_sales_trend(ui, data),
                View::PaymentMethods => Self::draw_payment_methods(ui, data),
                View::TopProducts => Self::draw_top_products(ui, data),
            }
        });
    }

    fn draw_overview(ui: &mut egui::Ui, data: &DashboardData) {
        ui.label("Aggregate view of the e-commerce dataset. Pick an analysis in the sidebar; the date range filters every order-based view.");
        ui.add_space(15.0);

        ui.horizontal(|ui| {
            Self::metric_tile(
                ui,
                "Total Customers",
                &format_count(data.summary.total_customers),
            );
            ui.add_space(10.0);
            Self::metric_tile(ui, "Total Orders", &format_count(data.summary.total_orders));
            ui.add_space(10.0);
            Self::metric_tile(
                ui,
                "Total Revenue",
                &format_currency(data.summary.total_revenue),
            );
        });
    }

    fn draw_customer_distribution(ui: &mut egui::Ui, data: &DashboardData) {
        ui.label("Distinct customers per state, largest first.");
        ui.add_space(10.0);

        ChartPlotter::draw_bar_chart(
            ui,
            "customers_by_state",
            &data.customers_by_state,
            "State",
            "Customers",
        );

        ui.add_space(15.0);
        ChartPlotter::draw_value_table(
            ui,
            "customers_by_state_table",
            "State",
            "Customers",
            &data.customers_by_state,
            |v| format_count(v as usize),
        );
    }

    fn draw_sales_trend(ui: &mut egui::Ui, data: &DashboardData) {
        ui.label("Distinct orders per month.");
        ui.add_space(10.0);

        ChartPlotter::draw_line_chart(
            ui,
            "monthly_orders",
            &data.monthly_orders,
            "Period",
            "Orders",
        );
    }

    fn draw_payment_methods(ui: &mut egui::Ui, data: &DashboardData) {
        ui.label("Share of orders by payment method, over all payments.");
        ui.add_space(10.0);

        ui.horizontal(|ui| {
            ChartPlotter::draw_pie_chart(ui, &data.payment_share);
            ui.add_space(20.0);
            ui.vertical(|ui| {
                ChartPlotter::draw_legend(ui, &data.payment_share);
                ui.add_space(10.0);
                Self::draw_payment_table(ui, data);
            });
        });
    }

    fn draw_top_products(ui: &mut egui::Ui, data: &DashboardData) {
        ui.label("Best selling product categories by items sold.");
        ui.add_space(10.0);

        ChartPlotter::draw_bar_chart(
            ui,
            "top_categories",
            &data.top_categories,
            "Product Category",
            "Items Sold",
        );

        ui.add_space(15.0);
        ChartPlotter::draw_value_table(
            ui,
            "top_categories_table",
            "Product Category",
            "Items Sold",
            &data.top_categories,
            |v| format_count(v as usize),
        );
    }

    fn draw_payment_table(ui: &mut egui::Ui, data: &DashboardData) {
        let total: f64 = data.payment_share.iter().map(|r| r.value).sum();

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id("payment_table"))
                    .striped(true)
                    .min_col_width(80.0)
                    .spacing([16.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("Method").strong().size(12.0));
                        ui.label(RichText::new("Orders").strong().size(12.0));
                        ui.label(RichText::new("Share").strong().size(12.0));
                        ui.label(RichText::new("Avg Payment").strong().size(12.0));
                        ui.end_row();

                        for row in &data.payment_share {
                            let share = if total > 0.0 {
                                row.value / total * 100.0
                            } else {
                                0.0
                            };
                            let avg = data
                                .payment_avg_value
                                .iter()
                                .find(|r| r.label == row.label)
                                .map(|r| r.value);

                            ui.label(RichText::new(&row.label).size(12.0));
                            ui.label(RichText::new(format_count(row.value as usize)).size(12.0));
                            ui.label(RichText::new(format!("{share:.1}%")).size(12.0));
                            match avg {
                                Some(avg) => {
                                    ui.label(RichText::new(format_currency(avg)).size(12.0))
                                }
                                None => ui.label(RichText::new("-").size(12.0)),
                            };
                            ui.end_row();
                        }
                    });
            });
    }

    fn metric_tile(ui: &mut egui::Ui, label: &str, value: &str) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(8.0)
            .inner_margin(14.0)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.label(RichText::new(label).size(12.0).color(Color32::GRAY));
                    ui.add_space(4.0);
                    ui.label(RichText::new(value).size(24.0).strong());
                });
            });
    }
}

/// Format an integer count with thousands separators.
fn format_count(n: usize) -> String {
    group_digits(&n.to_string())
}

/// Format a currency amount like `$1,234,567.89`.
fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = group_digits(&(cents / 100).to_string());
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${whole}.{:02}", cents % 100)
}

fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_get_thousands_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(96096), "96,096");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn currency_keeps_two_decimals() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(50.5), "$50.50");
        assert_eq!(format_currency(16008872.119), "$16,008,872.12");
        assert_eq!(format_currency(-12.3), "-$12.30");
    }
}
