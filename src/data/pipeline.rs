//! Merge-and-Derive Pipeline Module
//! Cleans the raw tables, joins them into one analytical table, and
//! derives calendar features from the purchase timestamp.

use chrono::NaiveDateTime;
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use super::loader::RawTables;

pub const TIMESTAMP_COL: &str = "order_purchase_timestamp";
pub const YEAR_COL: &str = "order_purchase_year";
pub const MONTH_COL: &str = "order_purchase_month";
pub const PERIOD_COL: &str = "period";
pub const CATEGORY_COL: &str = "product_category";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const PERIOD_FORMAT: &str = "%Y-%m";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Drop rows with missing values from orders, reviews, and products.
/// No imputation; the other tables are kept as loaded.
pub fn clean_tables(raw: &mut RawTables) -> Result<(), PipelineError> {
    raw.orders = drop_null_rows("orders", &raw.orders)?;
    raw.order_reviews = drop_null_rows("order_reviews", &raw.order_reviews)?;
    raw.products = drop_null_rows("products", &raw.products)?;
    Ok(())
}

fn drop_null_rows(name: &str, df: &DataFrame) -> Result<DataFrame, PipelineError> {
    let cleaned = df.clone().lazy().drop_nulls(None).collect()?;
    debug!(
        table = name,
        before = df.height(),
        after = cleaned.height(),
        "dropped rows with missing values"
    );
    Ok(cleaned)
}

/// Produce the denormalized analytical table via the fixed join plan.
///
/// Category translation is a left join, so products without a translated
/// category survive with a null `product_category`. Every other join is an
/// inner join on exact key equality; orders without matching items or
/// payments disappear from the result.
pub fn build_analytics_table(raw: &RawTables) -> Result<DataFrame, PipelineError> {
    let mut products = raw
        .products
        .clone()
        .lazy()
        .join(
            raw.category_translation.clone().lazy(),
            [col("product_category_name")],
            [col("product_category_name")],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?;
    products.rename("product_category_name_english", CATEGORY_COL.into())?;

    let joined = raw
        .orders
        .clone()
        .lazy()
        .join(
            raw.customers.clone().lazy(),
            [col("customer_id")],
            [col("customer_id")],
            JoinArgs::new(JoinType::Inner),
        )
        .join(
            raw.order_items.clone().lazy(),
            [col("order_id")],
            [col("order_id")],
            JoinArgs::new(JoinType::Inner),
        )
        .join(
            raw.order_payments.clone().lazy(),
            [col("order_id")],
            [col("order_id")],
            JoinArgs::new(JoinType::Inner),
        )
        .join(
            products.lazy(),
            [col("product_id")],
            [col("product_id")],
            JoinArgs::new(JoinType::Inner),
        )
        .join(
            raw.sellers.clone().lazy(),
            [col("seller_id")],
            [col("seller_id")],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;

    derive_time_features(joined)
}

/// Parse the purchase timestamp and derive year, month, and the `YYYY-MM`
/// period label. Malformed timestamps coerce to null instead of raising.
pub fn derive_time_features(df: DataFrame) -> Result<DataFrame, PipelineError> {
    let out = df
        .lazy()
        .with_column(col(TIMESTAMP_COL).str().to_datetime(
            Some(TimeUnit::Milliseconds),
            None,
            StrptimeOptions {
                format: Some(TIMESTAMP_FORMAT.into()),
                strict: false,
                ..Default::default()
            },
            lit("raise"),
        ))
        .with_columns([
            col(TIMESTAMP_COL).dt().year().alias(YEAR_COL),
            col(TIMESTAMP_COL)
                .dt()
                .month()
                .cast(DataType::Int32)
                .alias(MONTH_COL),
            col(TIMESTAMP_COL)
                .dt()
                .strftime(PERIOD_FORMAT)
                .alias(PERIOD_COL),
        ])
        .collect()?;
    Ok(out)
}

/// Restrict the analytical table to purchases inside the inclusive window.
pub fn filter_by_purchase_window(
    df: &DataFrame,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<DataFrame, PipelineError> {
    let filtered = df
        .clone()
        .lazy()
        .filter(
            col(TIMESTAMP_COL)
                .gt_eq(lit(start))
                .and(col(TIMESTAMP_COL).lt_eq(lit(end))),
        )
        .collect()?;
    Ok(filtered)
}

/// Earliest and latest purchase timestamps in the table, if any parsed.
pub fn purchase_window_bounds(df: &DataFrame) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let ts = df
        .column(TIMESTAMP_COL)
        .ok()?
        .as_materialized_series()
        .datetime()
        .ok()?;
    let min = millis_to_naive(ts.min()?)?;
    let max = millis_to_naive(ts.max()?)?;
    Some((min, max))
}

fn millis_to_naive(ms: i64) -> Option<NaiveDateTime> {
    chrono::DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn fixture() -> RawTables {
        RawTables {
            customers: df!(
                "customer_id" => ["c1", "c2"],
                "customer_unique_id" => ["u1", "u2"],
                "customer_state" => ["SP", "RJ"],
            )
            .unwrap(),
            orders: df!(
                "order_id" => ["o1", "o2"],
                "customer_id" => ["c1", "c2"],
                "order_status" => ["delivered", "delivered"],
                "order_purchase_timestamp" => ["2018-01-15 10:00:00", "2018-02-20 11:30:00"],
            )
            .unwrap(),
            order_items: df!(
                "order_id" => ["o1", "o2"],
                "order_item_id" => [1i64, 1],
                "product_id" => ["p1", "p2"],
                "seller_id" => ["s1", "s1"],
            )
            .unwrap(),
            order_payments: df!(
                "order_id" => ["o1", "o2"],
                "payment_type" => ["credit_card", "boleto"],
                "payment_value" => [100.0, 50.0],
            )
            .unwrap(),
            order_reviews: df!(
                "review_id" => ["r1"],
                "order_id" => ["o1"],
                "review_score" => [5i64],
            )
            .unwrap(),
            products: df!(
                "product_id" => ["p1", "p2"],
                "product_category_name" => ["beleza_saude", "esporte_lazer"],
            )
            .unwrap(),
            category_translation: df!(
                "product_category_name" => ["beleza_saude"],
                "product_category_name_english" => ["health_beauty"],
            )
            .unwrap(),
            sellers: df!(
                "seller_id" => ["s1"],
                "seller_state" => ["SP"],
            )
            .unwrap(),
        }
    }

    fn no_nulls(df: &DataFrame) -> bool {
        df.get_columns().iter().all(|c| c.null_count() == 0)
    }

    #[test]
    fn cleaning_drops_rows_with_missing_values() {
        let mut raw = fixture();
        raw.orders = df!(
            "order_id" => [Some("o1"), Some("o2")],
            "customer_id" => [Some("c1"), Some("c2")],
            "order_status" => [Some("delivered"), None],
            "order_purchase_timestamp" => [Some("2018-01-15 10:00:00"), Some("2018-02-20 11:30:00")],
        )
        .unwrap();

        clean_tables(&mut raw).unwrap();

        assert_eq!(raw.orders.height(), 1);
        assert!(no_nulls(&raw.orders));
        assert!(no_nulls(&raw.order_reviews));
        assert!(no_nulls(&raw.products));
    }

    #[test]
    fn join_plan_produces_one_row_per_order_item_payment() {
        let raw = fixture();
        let table = build_analytics_table(&raw).unwrap();

        assert_eq!(table.height(), 2);
        for expected in [
            "order_id",
            "customer_state",
            "payment_type",
            "payment_value",
            CATEGORY_COL,
            "seller_state",
        ] {
            assert!(table.column(expected).is_ok(), "missing {expected}");
        }
    }

    #[test]
    fn inner_join_drops_unmatched_keys() {
        let mut raw = fixture();
        // Third item references a product nobody sells.
        raw.order_items = df!(
            "order_id" => ["o1", "o2", "o2"],
            "order_item_id" => [1i64, 1, 2],
            "product_id" => ["p1", "p2", "p_missing"],
            "seller_id" => ["s1", "s1", "s1"],
        )
        .unwrap();

        let table = build_analytics_table(&raw).unwrap();

        assert_eq!(table.height(), 2);
        let joined_orders = table.column("order_id").unwrap().n_unique().unwrap();
        let input_orders = raw.orders.column("order_id").unwrap().n_unique().unwrap();
        assert!(joined_orders <= input_orders);
    }

    #[test]
    fn untranslated_category_survives_as_null() {
        let raw = fixture();
        let table = build_analytics_table(&raw).unwrap();

        let categories = table.column(CATEGORY_COL).unwrap();
        assert_eq!(categories.null_count(), 1);

        let translated = table
            .column(CATEGORY_COL)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        assert_eq!(translated, ["health_beauty"]);
    }

    #[test]
    fn time_features_follow_the_purchase_timestamp() {
        let raw = fixture();
        let table = build_analytics_table(&raw).unwrap();

        let years = table.column(YEAR_COL).unwrap().i32().unwrap();
        assert!(years.into_iter().all(|y| y == Some(2018)));

        let mut periods: Vec<String> = table
            .column(PERIOD_COL)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        periods.sort();
        assert_eq!(periods, ["2018-01", "2018-02"]);

        let mut months: Vec<i32> = table
            .column(MONTH_COL)
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        months.sort();
        assert_eq!(months, [1, 2]);
    }

    #[test]
    fn malformed_timestamp_coerces_to_null() {
        let df = df!(
            "order_id" => ["o1", "o2"],
            TIMESTAMP_COL => ["2018-01-15 10:00:00", "not a timestamp"],
        )
        .unwrap();

        let derived = derive_time_features(df).unwrap();

        assert_eq!(derived.column(TIMESTAMP_COL).unwrap().null_count(), 1);
        assert_eq!(derived.column(PERIOD_COL).unwrap().null_count(), 1);
        assert_eq!(derived.column(YEAR_COL).unwrap().null_count(), 1);
    }

    #[test]
    fn window_filter_never_grows_the_order_set() {
        let raw = fixture();
        let table = build_analytics_table(&raw).unwrap();

        let filtered =
            filter_by_purchase_window(&table, ts(2018, 1, 1, 0, 0, 0), ts(2018, 2, 1, 0, 0, 0))
                .unwrap();

        let filtered_orders = filtered.column("order_id").unwrap().n_unique().unwrap();
        let all_orders = table.column("order_id").unwrap().n_unique().unwrap();
        assert_eq!(filtered_orders, 1);
        assert!(filtered_orders <= all_orders);
    }

    #[test]
    fn window_endpoints_are_inclusive() {
        let df = derive_time_features(
            df!(
                "order_id" => ["o1"],
                TIMESTAMP_COL => ["2018-03-01 00:00:00"],
            )
            .unwrap(),
        )
        .unwrap();

        let filtered =
            filter_by_purchase_window(&df, ts(2018, 3, 1, 0, 0, 0), ts(2018, 3, 1, 0, 0, 0))
                .unwrap();
        assert_eq!(filtered.height(), 1);
    }

    #[test]
    fn window_bounds_span_the_table() {
        let raw = fixture();
        let table = build_analytics_table(&raw).unwrap();

        let (min, max) = purchase_window_bounds(&table).unwrap();
        assert_eq!(min, ts(2018, 1, 15, 10, 0, 0));
        assert_eq!(max, ts(2018, 2, 20, 11, 30, 0));
    }
}
