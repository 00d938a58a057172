//! ShopSight Main Application
//! Main window wiring the sidebar, the view area, and the background
//! workers for loading and aggregation.

use chrono::NaiveDateTime;
use egui::SidePanel;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use tracing::error;

use crate::analytics::{Aggregator, DashboardData};
use crate::config::DataSourceConfig;
use crate::data::{self, Dataset};
use crate::gui::{Sidebar, SidebarAction, ViewArea};

/// Dataset loading result from the background thread.
enum LoadResult {
    Progress(f32, String),
    Complete(Arc<Dataset>),
    Error(String),
}

/// Aggregate recomputation result from the background thread.
enum AggResult {
    Complete(DashboardData),
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    dataset: Option<Arc<Dataset>>,
    sidebar: Sidebar,
    view_area: ViewArea,

    // Async dataset loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,

    // Async aggregate recomputation
    agg_rx: Option<Receiver<AggResult>>,
    is_aggregating: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut app = Self {
            dataset: None,
            sidebar: Sidebar::new(),
            view_area: ViewArea::new(),
            load_rx: None,
            is_loading: false,
            agg_rx: None,
            is_aggregating: false,
        };
        app.start_load();
        app
    }

    /// Kick off the dataset load on a background thread.
    fn start_load(&mut self) {
        if self.is_loading {
            return;
        }

        let config = match DataSourceConfig::load() {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "configuration failed to load");
                self.sidebar.set_progress(0.0, &format!("Error: {e:#}"));
                return;
            }
        };

        self.is_loading = true;
        self.sidebar.set_progress(0.0, "Loading dataset...");

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let progress_tx = tx.clone();
            let result = data::load_dataset_cached(&config, move |pct, status| {
                let _ = progress_tx.send(LoadResult::Progress(pct, status.to_string()));
            });

            match result {
                Ok(dataset) => {
                    let _ = tx.send(LoadResult::Complete(dataset));
                }
                Err(e) => {
                    error!(error = %e, "dataset load failed");
                    let _ = tx.send(LoadResult::Error(format!("{e:#}")));
                }
            }
        });
    }

    /// Check for dataset loading results.
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(progress, status) => {
                        self.sidebar.set_progress(progress, &status);
                    }
                    LoadResult::Complete(dataset) => {
                        if let Some((min, max)) = data::purchase_window_bounds(&dataset.analytics)
                        {
                            self.sidebar.set_date_bounds(min, max);
                        }
                        self.sidebar.filter_enabled = true;
                        self.dataset = Some(dataset);
                        self.is_loading = false;
                        should_keep_receiver = false;

                        self.sidebar.set_progress(90.0, "Computing aggregates...");
                        self.start_aggregation(None);
                    }
                    LoadResult::Error(error) => {
                        self.sidebar.set_progress(0.0, &format!("Error: {error}"));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Recompute every view aggregate for the given window.
    fn start_aggregation(&mut self, window: Option<(NaiveDateTime, NaiveDateTime)>) {
        if self.is_aggregating {
            return;
        }
        let Some(dataset) = self.dataset.clone() else {
            return;
        };

        self.is_aggregating = true;

        let (tx, rx) = channel();
        self.agg_rx = Some(rx);

        thread::spawn(move || {
            match Aggregator::compute_dashboard_data(&dataset, window) {
                Ok(dashboard_data) => {
                    let _ = tx.send(AggResult::Complete(dashboard_data));
                }
                Err(e) => {
                    error!(error = %e, "aggregate computation failed");
                    let _ = tx.send(AggResult::Error(e.to_string()));
                }
            }
        });
    }

    /// Check for aggregate recomputation results.
    fn check_agg_results(&mut self) {
        let rx = self.agg_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    AggResult::Complete(dashboard_data) => {
                        self.view_area.set_data(dashboard_data);
                        self.sidebar.set_progress(100.0, "Complete");
                        self.is_aggregating = false;
                        should_keep_receiver = false;
                    }
                    AggResult::Error(error) => {
                        self.sidebar.set_progress(0.0, &format!("Error: {error}"));
                        self.is_aggregating = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.agg_rx = Some(rx);
            }
        }
    }

    /// Apply the sidebar's date range. An incomplete or malformed range
    /// surfaces a notice and falls back to the unfiltered table.
    fn handle_apply_filter(&mut self) {
        if self.is_aggregating {
            return;
        }

        let window = match self.sidebar.parse_window() {
            Some(window) => {
                self.sidebar.notice = None;
                Some(window)
            }
            None => {
                self.sidebar.notice = Some(
                    "Select a valid date range (YYYY-MM-DD). Showing all data.".to_string(),
                );
                None
            }
        };

        self.sidebar.set_progress(50.0, "Computing aggregates...");
        self.start_aggregation(window);
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();
        self.check_agg_results();

        // Request repaint while work is in flight
        if self.is_loading || self.is_aggregating {
            ctx.request_repaint();
        }

        // Left panel - navigation and filter
        SidePanel::left("sidebar")
            .min_width(240.0)
            .max_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.sidebar.show(ui);

                    match action {
                        SidebarAction::ApplyFilter => self.handle_apply_filter(),
                        SidebarAction::None => {}
                    }
                });
            });

        // Central panel - active view
        egui::CentralPanel::default().show(ctx, |ui| {
            self.view_area.show(ui, self.sidebar.active_view);
        });
    }
}
