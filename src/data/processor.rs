//! Data Processor Module
//! Applies the dashboard filters to the joined sales table and aggregates it for the charts.

use crate::data::loader::{date_to_days, date_values, f64_values, i64_values, string_values};
use crate::data::Dataset;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Start date {start} is after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

/// A dropdown value: everything, or one specific entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// `"all"` (any case) and blank values select everything.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Selection::All
        } else {
            Selection::Only(value.to_string())
        }
    }

    pub fn as_value(&self) -> &str {
        match self {
            Selection::All => "all",
            Selection::Only(value) => value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    fn predicate(&self, column: &str) -> Option<Expr> {
        match self {
            Selection::All => None,
            Selection::Only(value) => Some(col(column).eq(lit(value.as_str()))),
        }
    }
}

impl From<String> for Selection {
    fn from(value: String) -> Self {
        Selection::parse(&value)
    }
}

impl From<Selection> for String {
    fn from(selection: Selection) -> Self {
        selection.as_value().to_string()
    }
}

/// Current state of the dashboard's filter widgets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SalesFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub region: Selection,
    pub category: Selection,
}

impl SalesFilter {
    pub fn validate(&self) -> Result<(), ProcessorError> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(ProcessorError::InvalidDateRange { start, end });
            }
        }
        Ok(())
    }

    /// Inclusive date window; only set when both ends are given.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// Same region/category selection over another date window.
    pub fn with_range(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..self.clone()
        }
    }

    fn predicate(&self) -> Option<Expr> {
        let date = self.date_range().map(|(start, end)| {
            let days = col("Date").cast(DataType::Int32);
            days.clone()
                .gt_eq(lit(date_to_days(start)))
                .and(days.lt_eq(lit(date_to_days(end))))
        });

        [
            date,
            self.region.predicate("Region"),
            self.category.predicate("Category"),
        ]
        .into_iter()
        .flatten()
        .reduce(|acc, expr| acc.and(expr))
    }
}

/// Total sales of one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSales {
    pub region: String,
    pub sales: f64,
}

/// Total sales of one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub sales: f64,
}

/// Sales and units of one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPerformance {
    pub product: String,
    pub category: String,
    pub sales: f64,
    pub units: i64,
}

/// Handles filtering and aggregation of the sales table.
pub struct DataProcessor;

impl DataProcessor {
    /// Rows of the joined sales table matching `filter`.
    pub fn filter_sales(
        dataset: &Dataset,
        filter: &SalesFilter,
    ) -> Result<DataFrame, ProcessorError> {
        filter.validate()?;

        let lazy = dataset.sales.clone().lazy();
        let filtered = match filter.predicate() {
            Some(predicate) => lazy.filter(predicate).collect()?,
            None => lazy.collect()?,
        };
        Ok(filtered)
    }

    /// Sum of `Sales_Amount` per region, sorted by region.
    pub fn sales_by_region(df: &DataFrame) -> Result<Vec<RegionSales>, ProcessorError> {
        let grouped = df
            .clone()
            .lazy()
            .group_by([col("Region")])
            .agg([col("Sales_Amount").sum()])
            .sort(["Region"], SortMultipleOptions::default())
            .collect()?;

        let regions = string_values(&grouped, "Region")?;
        let sales = f64_values(&grouped, "Sales_Amount")?;
        Ok(regions
            .into_iter()
            .zip(sales)
            .map(|(region, sales)| RegionSales { region, sales })
            .collect())
    }

    /// Sum of `Sales_Amount` per day, in date order.
    pub fn daily_sales(df: &DataFrame) -> Result<Vec<DailySales>, ProcessorError> {
        let grouped = df
            .clone()
            .lazy()
            .group_by([col("Date")])
            .agg([col("Sales_Amount").sum()])
            .sort(["Date"], SortMultipleOptions::default())
            .collect()?;

        let dates = date_values(&grouped, "Date")?;
        let sales = f64_values(&grouped, "Sales_Amount")?;
        Ok(dates
            .into_iter()
            .zip(sales)
            .map(|(date, sales)| DailySales { date, sales })
            .collect())
    }

    /// Sales and units per (product, category), sorted by product name.
    pub fn product_performance(
        df: &DataFrame,
    ) -> Result<Vec<ProductPerformance>, ProcessorError> {
        let grouped = df
            .clone()
            .lazy()
            .group_by([col("Product_Name"), col("Category")])
            .agg([col("Sales_Amount").sum(), col("Units_Sold").sum()])
            .sort(
                ["Product_Name", "Category"],
                SortMultipleOptions::default(),
            )
            .collect()?;

        let products = string_values(&grouped, "Product_Name")?;
        let categories = string_values(&grouped, "Category")?;
        let sales = f64_values(&grouped, "Sales_Amount")?;
        let units = i64_values(&grouped, "Units_Sold")?;

        Ok(products
            .into_iter()
            .zip(categories)
            .zip(sales.into_iter().zip(units))
            .map(|((product, category), (sales, units))| ProductPerformance {
                product,
                category,
                sales,
                units,
            })
            .collect())
    }

    /// Sum of `Sales_Amount` over the filtered rows.
    pub fn total_sales(df: &DataFrame) -> Result<f64, ProcessorError> {
        Ok(f64_values(df, "Sales_Amount")?.iter().sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixture_dataset;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn selection_parsing() {
        assert_eq!(Selection::parse("all"), Selection::All);
        assert_eq!(Selection::parse("ALL"), Selection::All);
        assert_eq!(Selection::parse("  "), Selection::All);
        assert_eq!(
            Selection::parse("North"),
            Selection::Only("North".to_string())
        );
        assert_eq!(Selection::Only("East".into()).as_value(), "East");
    }

    #[test]
    fn unfiltered_returns_every_joined_row() {
        let dataset = fixture_dataset();
        let df = DataProcessor::filter_sales(&dataset, &SalesFilter::default()).unwrap();
        assert_eq!(df.height(), 7);
        assert!((DataProcessor::total_sales(&df).unwrap() - 785.0).abs() < 1e-9);
    }

    #[test]
    fn date_range_is_inclusive_and_combines_with_region() {
        let dataset = fixture_dataset();
        let filter = SalesFilter {
            start: Some(day(2)),
            end: Some(day(3)),
            region: Selection::Only("North".into()),
            category: Selection::All,
        };

        let df = DataProcessor::filter_sales(&dataset, &filter).unwrap();
        assert_eq!(df.height(), 2);
        assert!((DataProcessor::total_sales(&df).unwrap() - 245.0).abs() < 1e-9);
    }

    #[test]
    fn single_date_bound_is_ignored() {
        let dataset = fixture_dataset();
        let filter = SalesFilter {
            start: Some(day(4)),
            ..SalesFilter::default()
        };
        let df = DataProcessor::filter_sales(&dataset, &filter).unwrap();
        assert_eq!(df.height(), 7);
    }

    #[test]
    fn category_filter() {
        let dataset = fixture_dataset();
        let filter = SalesFilter {
            category: Selection::Only("Hardware".into()),
            ..SalesFilter::default()
        };
        let df = DataProcessor::filter_sales(&dataset, &filter).unwrap();
        assert_eq!(df.height(), 4);
        assert!((DataProcessor::total_sales(&df).unwrap() - 470.0).abs() < 1e-9);
    }

    #[test]
    fn reversed_range_is_rejected() {
        let dataset = fixture_dataset();
        let filter = SalesFilter {
            start: Some(day(3)),
            end: Some(day(1)),
            ..SalesFilter::default()
        };
        assert!(matches!(
            DataProcessor::filter_sales(&dataset, &filter),
            Err(ProcessorError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn aggregates_by_region_day_and_product() {
        let dataset = fixture_dataset();
        let df = DataProcessor::filter_sales(&dataset, &SalesFilter::default()).unwrap();

        let regions = DataProcessor::sales_by_region(&df).unwrap();
        assert_eq!(
            regions,
            vec![
                RegionSales { region: "East".into(), sales: 170.0 },
                RegionSales { region: "North".into(), sales: 345.0 },
                RegionSales { region: "South".into(), sales: 270.0 },
            ]
        );

        let daily = DataProcessor::daily_sales(&df).unwrap();
        let totals: Vec<(NaiveDate, f64)> = daily.iter().map(|d| (d.date, d.sales)).collect();
        assert_eq!(
            totals,
            vec![(day(1), 130.0), (day(2), 250.0), (day(3), 285.0), (day(4), 120.0)]
        );

        let products = DataProcessor::product_performance(&df).unwrap();
        let names: Vec<&str> = products.iter().map(|p| p.product.as_str()).collect();
        assert_eq!(names, vec!["Course", "Gadget", "Manual", "Widget"]);
        let gadget = &products[1];
        assert_eq!(gadget.category, "Hardware");
        assert_eq!(gadget.units, 8);
        assert!((gadget.sales - 320.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_region_yields_empty_aggregates() {
        let dataset = fixture_dataset();
        let filter = SalesFilter {
            region: Selection::Only("Atlantis".into()),
            ..SalesFilter::default()
        };
        let df = DataProcessor::filter_sales(&dataset, &filter).unwrap();
        assert_eq!(df.height(), 0);
        assert!(DataProcessor::sales_by_region(&df).unwrap().is_empty());
        assert!(DataProcessor::daily_sales(&df).unwrap().is_empty());
    }
}
