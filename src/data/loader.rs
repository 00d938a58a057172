//! Remote CSV Loader Module
//! Downloads the raw entity tables and parses them with Polars.

use polars::prelude::*;
use std::io::Cursor;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::DataSourceConfig;

const CUSTOMERS_CSV: &str = "customers_dataset.csv";
const ORDERS_CSV: &str = "orders_dataset.csv";
const ORDER_ITEMS_CSV: &str = "order_items_dataset.csv";
const ORDER_PAYMENTS_CSV: &str = "order_payments_dataset.csv";
const ORDER_REVIEWS_CSV: &str = "order_reviews_dataset.csv";
const PRODUCTS_CSV: &str = "products_dataset.csv";
const CATEGORY_TRANSLATION_CSV: &str = "product_category_name_translation.csv";
const SELLERS_CSV: &str = "sellers_dataset.csv";

/// Number of CSV resources fetched per load.
pub const TABLE_COUNT: usize = 8;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to fetch CSV: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] PolarsError),
}

/// The raw entity tables, one DataFrame per remote resource.
pub struct RawTables {
    pub customers: DataFrame,
    pub orders: DataFrame,
    pub order_items: DataFrame,
    pub order_payments: DataFrame,
    pub order_reviews: DataFrame,
    pub products: DataFrame,
    pub category_translation: DataFrame,
    pub sellers: DataFrame,
}

/// Fetches the fixed set of remote CSV resources.
///
/// Any unreachable resource or parse failure aborts the whole load; there
/// is no partial load and no retry.
pub struct DatasetFetcher {
    client: reqwest::blocking::Client,
    config: DataSourceConfig,
}

impl DatasetFetcher {
    pub fn new(config: DataSourceConfig) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            config,
        }
    }

    /// Download and parse a single table.
    pub fn fetch_table(&self, file: &str) -> Result<DataFrame, LoaderError> {
        let url = self.config.table_url(file);
        debug!(%url, "fetching table");

        let body = self.client.get(&url).send()?.error_for_status()?.bytes()?;
        let df = parse_csv(&body)?;

        info!(file, rows = df.height(), "table loaded");
        Ok(df)
    }

    /// Fetch every table in a fixed order. `progress` is called with the
    /// zero-based table index before each download starts.
    pub fn fetch_all<F>(&self, mut progress: F) -> Result<RawTables, LoaderError>
    where
        F: FnMut(usize, &str),
    {
        let mut fetch = |idx: usize, file: &str| {
            progress(idx, file);
            self.fetch_table(file)
        };

        Ok(RawTables {
            customers: fetch(0, CUSTOMERS_CSV)?,
            orders: fetch(1, ORDERS_CSV)?,
            order_items: fetch(2, ORDER_ITEMS_CSV)?,
            order_payments: fetch(3, ORDER_PAYMENTS_CSV)?,
            order_reviews: fetch(4, ORDER_REVIEWS_CSV)?,
            products: fetch(5, PRODUCTS_CSV)?,
            category_translation: fetch(6, CATEGORY_TRANSLATION_CSV)?,
            sellers: fetch(7, SELLERS_CSV)?,
        })
    }
}

/// Parse CSV bytes with column types inferred from the text.
fn parse_csv(bytes: &[u8]) -> Result<DataFrame, LoaderError> {
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(10000))
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_csv_infers_column_types() {
        let csv = b"order_id,payment_value\no1,100.5\no2,50.0\n";
        let df = parse_csv(csv).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.column("order_id").unwrap().dtype(), &DataType::String);
        assert_eq!(
            df.column("payment_value").unwrap().dtype(),
            &DataType::Float64
        );
    }

    #[test]
    fn parse_csv_keeps_missing_values_as_nulls() {
        let csv = b"order_id,order_status\no1,delivered\no2,\n";
        let df = parse_csv(csv).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.column("order_status").unwrap().null_count(), 1);
    }

    #[test]
    fn parse_csv_rejects_garbage() {
        assert!(parse_csv(b"").is_err());
    }
}
