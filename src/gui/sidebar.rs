//! Sidebar Widget
//! Navigation selector, date-range filter, and load status.

use chrono::{NaiveDate, NaiveDateTime};
use egui::{Color32, RichText};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The dashboard views reachable from the navigation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Overview,
    CustomerDistribution,
    SalesTrend,
    PaymentMethods,
    TopProducts,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Overview,
        View::CustomerDistribution,
        View::SalesTrend,
        View::PaymentMethods,
        View::TopProducts,
    ];

    pub fn title(self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::CustomerDistribution => "Customer Distribution",
            View::SalesTrend => "Sales Trend",
            View::PaymentMethods => "Payment Methods",
            View::TopProducts => "Top Products",
        }
    }
}

/// Actions triggered by the sidebar.
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarAction {
    None,
    ApplyFilter,
}

/// Left side panel with navigation, the date filter, and progress.
pub struct Sidebar {
    pub active_view: View,
    pub start_date: String,
    pub end_date: String,
    pub notice: Option<String>,
    pub filter_enabled: bool,
    pub progress: f32,
    pub status: String,
}

impl Default for Sidebar {
    fn default() -> Self {
        Self {
            active_view: View::Overview,
            start_date: String::new(),
            end_date: String::new(),
            notice: None,
            filter_enabled: false,
            progress: 0.0,
            status: "Ready".to_string(),
        }
    }
}

impl Sidebar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the date inputs from the loaded data's purchase range.
    pub fn set_date_bounds(&mut self, min: NaiveDateTime, max: NaiveDateTime) {
        self.start_date = min.format(DATE_FORMAT).to_string();
        self.end_date = max.format(DATE_FORMAT).to_string();
    }

    /// Parse the date inputs into an inclusive window. Both endpoints are
    /// taken at midnight. Returns None when either input is blank or
    /// malformed.
    pub fn parse_window(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let start = parse_date(&self.start_date)?;
        let end = parse_date(&self.end_date)?;
        Some((start, end))
    }

    /// Draw the sidebar.
    pub fn show(&mut self, ui: &mut egui::Ui) -> SidebarAction {
        let mut action = SidebarAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📈 ShopSight")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("E-Commerce Analytics")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Navigation Section =====
        ui.label(RichText::new("📊 Analysis").size(14.0).strong());
        ui.add_space(5.0);

        for view in View::ALL {
            ui.radio_value(&mut self.active_view, view, view.title());
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Date Filter Section =====
        ui.label(RichText::new("📅 Order Date Range").size(14.0).strong());
        ui.add_space(5.0);

        ui.add_enabled_ui(self.filter_enabled, |ui| {
            let label_width = 45.0;

            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new("From:"));
                ui.text_edit_singleline(&mut self.start_date);
            });
            ui.add_space(3.0);
            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new("To:"));
                ui.text_edit_singleline(&mut self.end_date);
            });

            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                if ui
                    .add(egui::Button::new("Apply Filter").min_size(egui::vec2(140.0, 26.0)))
                    .clicked()
                {
                    action = SidebarAction::ApplyFilter;
                }
            });
        });

        if let Some(notice) = &self.notice {
            ui.add_space(5.0);
            ui.label(
                RichText::new(notice)
                    .size(11.0)
                    .color(Color32::from_rgb(255, 193, 7)),
            );
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Progress").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Complete") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status.
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

fn parse_date(text: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .ok()?
        .and_hms_opt(0, 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_window_accepts_a_complete_range() {
        let mut sidebar = Sidebar::new();
        sidebar.start_date = "2018-01-01".to_string();
        sidebar.end_date = "2018-06-30".to_string();

        let (start, end) = sidebar.parse_window().unwrap();
        assert_eq!(start.format("%Y-%m-%d %H:%M:%S").to_string(), "2018-01-01 00:00:00");
        assert_eq!(end.format("%Y-%m-%d %H:%M:%S").to_string(), "2018-06-30 00:00:00");
    }

    #[test]
    fn parse_window_rejects_incomplete_or_malformed_input() {
        let mut sidebar = Sidebar::new();
        sidebar.start_date = "2018-01-01".to_string();
        sidebar.end_date = String::new();
        assert!(sidebar.parse_window().is_none());

        sidebar.end_date = "June 2018".to_string();
        assert!(sidebar.parse_window().is_none());
    }

    #[test]
    fn date_bounds_round_trip_through_the_inputs() {
        let mut sidebar = Sidebar::new();
        let min = chrono::NaiveDate::from_ymd_opt(2017, 9, 4)
            .unwrap()
            .and_hms_opt(21, 15, 19)
            .unwrap();
        let max = chrono::NaiveDate::from_ymd_opt(2018, 10, 17)
            .unwrap()
            .and_hms_opt(17, 30, 18)
            .unwrap();

        sidebar.set_date_bounds(min, max);
        assert_eq!(sidebar.start_date, "2017-09-04");
        assert_eq!(sidebar.end_date, "2018-10-17");
        assert!(sidebar.parse_window().is_some());
    }
}
