//! Aggregator Module
//! Group-by summaries (distinct counts, sums, means) consumed directly by
//! the view layer.

use chrono::NaiveDateTime;
use polars::prelude::*;
use rayon::prelude::*;
use thiserror::Error;

use crate::data::{self, Dataset, CATEGORY_COL, PERIOD_COL};

/// Truncation limit for the top-categories view.
pub const TOP_CATEGORY_LIMIT: usize = 10;

const VALUE_COL: &str = "value";

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Pipeline(#[from] data::PipelineError),
}

/// One group of an aggregate: the group label and its aggregate value.
#[derive(Debug, Clone, PartialEq)]
pub struct AggRow {
    pub label: String,
    pub value: f64,
}

/// Sort applied to an aggregate before it reaches the views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// Descending by aggregate value, for top-N displays.
    ValueDesc,
    /// Ascending by group label, for time series and stable tables.
    LabelAsc,
}

/// Headline metrics for the overview, computed from the raw tables.
#[derive(Debug, Clone, Default)]
pub struct OverviewSummary {
    pub total_customers: usize,
    pub total_orders: usize,
    pub total_revenue: f64,
}

/// Every aggregate the views render, precomputed for one filter window.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub summary: OverviewSummary,
    pub customers_by_state: Vec<AggRow>,
    pub monthly_orders: Vec<AggRow>,
    pub payment_share: Vec<AggRow>,
    pub payment_avg_value: Vec<AggRow>,
    pub top_categories: Vec<AggRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    CustomersByState,
    MonthlyOrders,
    PaymentShare,
    PaymentAvgValue,
    TopCategories,
}

const SECTIONS: [Section; 5] = [
    Section::CustomersByState,
    Section::MonthlyOrders,
    Section::PaymentShare,
    Section::PaymentAvgValue,
    Section::TopCategories,
];

/// Computes the group-by summaries behind each dashboard view.
pub struct Aggregator;

impl Aggregator {
    /// Count of distinct `target_col` values per group.
    pub fn distinct_count(
        df: &DataFrame,
        group_col: &str,
        target_col: &str,
        sort: SortBy,
    ) -> Result<Vec<AggRow>, AggregateError> {
        Self::grouped(df, group_col, col(target_col).n_unique(), sort)
    }

    /// Sum of `target_col` per group.
    pub fn sum_by(
        df: &DataFrame,
        group_col: &str,
        target_col: &str,
        sort: SortBy,
    ) -> Result<Vec<AggRow>, AggregateError> {
        Self::grouped(df, group_col, col(target_col).sum(), sort)
    }

    /// Mean of `target_col` per group.
    pub fn mean_by(
        df: &DataFrame,
        group_col: &str,
        target_col: &str,
        sort: SortBy,
    ) -> Result<Vec<AggRow>, AggregateError> {
        Self::grouped(df, group_col, col(target_col).mean(), sort)
    }

    fn grouped(
        df: &DataFrame,
        group_col: &str,
        agg: Expr,
        sort: SortBy,
    ) -> Result<Vec<AggRow>, AggregateError> {
        let lazy = df
            .clone()
            .lazy()
            .group_by([col(group_col)])
            .agg([agg.alias(VALUE_COL)]);

        let sorted = match sort {
            SortBy::ValueDesc => lazy.sort(
                [VALUE_COL],
                SortMultipleOptions::default().with_order_descending(true),
            ),
            SortBy::LabelAsc => lazy.sort([group_col], SortMultipleOptions::default()),
        }
        .collect()?;

        Self::rows(&sorted, group_col)
    }

    /// Extract (label, value) pairs, skipping null group labels.
    fn rows(df: &DataFrame, group_col: &str) -> Result<Vec<AggRow>, AggregateError> {
        let labels = df.column(group_col)?.str()?;
        let values = df.column(VALUE_COL)?.cast(&DataType::Float64)?;
        let values = values.f64()?;

        let mut rows = Vec::with_capacity(df.height());
        for (label, value) in labels.into_iter().zip(values) {
            if let (Some(label), Some(value)) = (label, value) {
                rows.push(AggRow {
                    label: label.to_string(),
                    value,
                });
            }
        }
        Ok(rows)
    }

    /// Headline totals over the raw (unjoined, unfiltered) tables.
    pub fn overview_summary(dataset: &Dataset) -> Result<OverviewSummary, AggregateError> {
        let total_customers = dataset
            .customers
            .column("customer_unique_id")?
            .n_unique()?;
        let total_orders = dataset.orders.column("order_id")?.n_unique()?;

        let revenue = dataset
            .order_payments
            .column("payment_value")?
            .cast(&DataType::Float64)?;
        let total_revenue = revenue.f64()?.sum().unwrap_or(0.0);

        Ok(OverviewSummary {
            total_customers,
            total_orders,
            total_revenue,
        })
    }

    /// Compute every view aggregate for one filter window. The window
    /// constrains the analytical table only; the overview summary and the
    /// payment aggregates read the raw tables. Sections run in parallel.
    pub fn compute_dashboard_data(
        dataset: &Dataset,
        window: Option<(NaiveDateTime, NaiveDateTime)>,
    ) -> Result<DashboardData, AggregateError> {
        let filtered = match window {
            Some((start, end)) => {
                data::filter_by_purchase_window(&dataset.analytics, start, end)?
            }
            None => dataset.analytics.clone(),
        };

        let summary = Self::overview_summary(dataset)?;

        let sections: Vec<(Section, Vec<AggRow>)> = SECTIONS
            .par_iter()
            .map(|section| Ok((*section, Self::compute_section(*section, dataset, &filtered)?)))
            .collect::<Result<_, AggregateError>>()?;

        let mut out = DashboardData {
            summary,
            ..Default::default()
        };
        for (section, rows) in sections {
            match section {
                Section::CustomersByState => out.customers_by_state = rows,
                Section::MonthlyOrders => out.monthly_orders = rows,
                Section::PaymentShare => out.payment_share = rows,
                Section::PaymentAvgValue => out.payment_avg_value = rows,
                Section::TopCategories => out.top_categories = rows,
            }
        }
        Ok(out)
    }

    fn compute_section(
        section: Section,
        dataset: &Dataset,
        filtered: &DataFrame,
    ) -> Result<Vec<AggRow>, AggregateError> {
        match section {
            Section::CustomersByState => Self::distinct_count(
                filtered,
                "customer_state",
                "customer_unique_id",
                SortBy::ValueDesc,
            ),
            Section::MonthlyOrders => {
                Self::distinct_count(filtered, PERIOD_COL, "order_id", SortBy::LabelAsc)
            }
            Section::PaymentShare => Self::distinct_count(
                &dataset.order_payments,
                "payment_type",
                "order_id",
                SortBy::LabelAsc,
            ),
            Section::PaymentAvgValue => Self::mean_by(
                &dataset.order_payments,
                "payment_type",
                "payment_value",
                SortBy::LabelAsc,
            ),
            Section::TopCategories => {
                let mut rows =
                    Self::sum_by(filtered, CATEGORY_COL, "order_item_id", SortBy::ValueDesc)?;
                rows.truncate(TOP_CATEGORY_LIMIT);
                Ok(rows)
            }
        }
    }
}
