//! ShopSight - E-Commerce Analytics Dashboard
//!
//! Fetches the public e-commerce dataset, builds one denormalized
//! analytical table, and renders interactive aggregate views.

mod analytics;
mod charts;
mod config;
mod data;
mod gui;

use eframe::egui;
use gui::DashboardApp;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("ShopSight"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "ShopSight",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc)))),
    )
}
