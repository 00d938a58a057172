//! Analytics module - aggregate summaries for the dashboard views

mod aggregator;

pub use aggregator::{
    AggRow, AggregateError, Aggregator, DashboardData, OverviewSummary, SortBy,
    TOP_CATEGORY_LIMIT,
};
