//! CSV Data Loader Module
//! Loads the sales, product and inventory tables with Polars and joins them on `Product_ID`.

use crate::config::DataSettings;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SALES_COLUMNS: [&str; 5] = ["Date", "Product_ID", "Region", "Sales_Amount", "Units_Sold"];
pub const PRODUCT_COLUMNS: [&str; 3] = ["Product_ID", "Product_Name", "Category"];
pub const INVENTORY_COLUMNS: [&str; 3] = ["Product_ID", "Stock_Level", "Reorder_Level"];

/// Days between 0001-01-01 (CE) and 1970-01-01, the epoch of Polars dates.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("CSV file not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("{table} data is missing required column '{column}'")]
    MissingColumn { table: &'static str, column: String },
}

/// Paths of the three input files.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub sales: PathBuf,
    pub products: PathBuf,
    pub inventory: PathBuf,
}

impl From<&DataSettings> for DataPaths {
    fn from(settings: &DataSettings) -> Self {
        Self {
            sales: settings.sales_path(),
            products: settings.product_path(),
            inventory: settings.inventory_path(),
        }
    }
}

impl DataPaths {
    /// All three files inside one directory, using the default file names.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            sales: dir.join("sales_data.csv"),
            products: dir.join("product_data.csv"),
            inventory: dir.join("inventory_data.csv"),
        }
    }
}

/// Row/column counts of one loaded table.
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub name: &'static str,
    pub rows: usize,
    pub columns: usize,
}

/// The loaded, joined tables. Immutable after load.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Sales joined with the product catalog.
    pub sales: DataFrame,
    pub products: DataFrame,
    /// Inventory joined with the product catalog.
    pub inventory: DataFrame,
}

/// Handles CSV file loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load and join all three tables.
    pub fn load(paths: &DataPaths) -> Result<Dataset, LoaderError> {
        let sales = Self::read_table(&paths.sales, "sales", &SALES_COLUMNS)?;
        let products = Self::read_table(&paths.products, "product", &PRODUCT_COLUMNS)?;
        let inventory = Self::read_table(&paths.inventory, "inventory", &INVENTORY_COLUMNS)?;

        let products = products
            .lazy()
            .with_columns([
                col("Product_ID").cast(DataType::String),
                col("Product_Name").cast(DataType::String),
                col("Category").cast(DataType::String),
            ])
            .collect()?;

        let raw_sales_rows = sales.height();
        let sales = sales
            .lazy()
            .select([
                col("Date").cast(DataType::Date),
                col("Product_ID").cast(DataType::String),
                col("Region").cast(DataType::String),
                col("Sales_Amount").cast(DataType::Float64),
                col("Units_Sold").cast(DataType::Int64),
            ])
            .filter(col("Date").is_not_null())
            .collect()?;

        let dropped = raw_sales_rows - sales.height();
        if dropped > 0 {
            tracing::warn!(dropped, "Dropped sales rows with an unparseable Date");
        }

        let sales = Self::join_products(sales, &products)?;
        // Duplicate catalog ids multiply rows, so the join can also grow the table.
        let unmatched = (raw_sales_rows - dropped).saturating_sub(sales.height());
        if unmatched > 0 {
            tracing::warn!(unmatched, "Dropped sales rows referencing unknown products");
        }

        let inventory = inventory
            .lazy()
            .select([
                col("Product_ID").cast(DataType::String),
                col("Stock_Level").cast(DataType::Int64),
                col("Reorder_Level").cast(DataType::Int64),
            ])
            .collect()?;
        let inventory = Self::join_products(inventory, &products)?;

        tracing::info!(
            sales = sales.height(),
            products = products.height(),
            inventory = inventory.height(),
            "Loaded dashboard data"
        );

        Ok(Dataset {
            sales,
            products,
            inventory,
        })
    }

    /// Read one CSV file and check its header for the required columns.
    fn read_table(
        path: &Path,
        table: &'static str,
        required: &[&str],
    ) -> Result<DataFrame, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::MissingFile(path.to_path_buf()));
        }

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_try_parse_dates(true)
            .finish()?
            .collect()?;

        for column in required {
            if df.column(column).is_err() {
                return Err(LoaderError::MissingColumn {
                    table,
                    column: column.to_string(),
                });
            }
        }

        tracing::debug!(path = %path.display(), rows = df.height(), "Read CSV table");
        Ok(df)
    }

    fn join_products(df: DataFrame, products: &DataFrame) -> Result<DataFrame, LoaderError> {
        let joined = df
            .lazy()
            .join(
                products.clone().lazy(),
                [col("Product_ID")],
                [col("Product_ID")],
                JoinArgs::new(JoinType::Inner),
            )
            .collect()?;
        Ok(joined)
    }
}

impl Dataset {
    /// Earliest and latest sale date.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let dates = date_values(&self.sales, "Date").ok()?;
        let min = dates.iter().min().copied()?;
        let max = dates.iter().max().copied()?;
        Some((min, max))
    }

    /// Distinct regions present in the joined sales, sorted.
    pub fn regions(&self) -> Vec<String> {
        distinct_sorted(&self.sales, "Region")
    }

    /// Distinct product categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        distinct_sorted(&self.products, "Category")
    }

    pub fn summary(&self) -> Vec<TableSummary> {
        vec![
            TableSummary {
                name: "sales",
                rows: self.sales.height(),
                columns: self.sales.width(),
            },
            TableSummary {
                name: "products",
                rows: self.products.height(),
                columns: self.products.width(),
            },
            TableSummary {
                name: "inventory",
                rows: self.inventory.height(),
                columns: self.inventory.width(),
            },
        ]
    }
}

fn distinct_sorted(df: &DataFrame, column: &str) -> Vec<String> {
    string_values(df, column)
        .map(|values| {
            values
                .into_iter()
                .filter(|v| !v.is_empty())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        })
        .unwrap_or_default()
}

/// Values of a string column; nulls become empty strings.
pub(crate) fn string_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<String>> {
    let series = df.column(column)?.cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

/// Values of a numeric column as f64; nulls become 0.
pub(crate) fn f64_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<f64>> {
    let series = df.column(column)?.cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().map(|v| v.unwrap_or(0.0)).collect())
}

/// Values of an integer column as i64; nulls become 0.
pub(crate) fn i64_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<i64>> {
    let series = df.column(column)?.cast(&DataType::Int64)?;
    Ok(series.i64()?.into_iter().map(|v| v.unwrap_or(0)).collect())
}

/// Values of a date column; null dates are skipped.
pub(crate) fn date_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<NaiveDate>> {
    let days = df
        .column(column)?
        .cast(&DataType::Date)?
        .cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .into_iter()
        .flatten()
        .filter_map(days_to_date)
        .collect())
}

pub(crate) fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
}

pub(crate) fn date_to_days(date: NaiveDate) -> i32 {
    use chrono::Datelike;
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}
