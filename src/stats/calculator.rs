//! Statistics Calculator Module
//! KPI figures for the dashboard cards, including period-over-period growth.

use crate::data::{f64_values, i64_values, DataProcessor, Dataset, ProcessorError, SalesFilter};
use chrono::{Duration, NaiveDate};
use polars::prelude::DataFrame;
use serde::Serialize;
use statrs::statistics::{Data, Median};

/// Figures shown on the KPI cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_sales: f64,
    pub total_units: i64,
    pub order_count: usize,
    /// Zero when there are no orders.
    pub avg_order_value: f64,
    pub avg_units_per_order: Option<f64>,
    pub median_order_value: Option<f64>,
    /// Change against the preceding window of equal length, in percent.
    pub growth_pct: Option<f64>,
    /// Window the growth figure compares, inclusive.
    pub window: Option<(NaiveDate, NaiveDate)>,
}

impl Default for KpiSummary {
    fn default() -> Self {
        Self {
            total_sales: 0.0,
            total_units: 0,
            order_count: 0,
            avg_order_value: 0.0,
            avg_units_per_order: None,
            median_order_value: None,
            growth_pct: None,
            window: None,
        }
    }
}

/// Handles KPI calculations over the filtered sales table.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute the KPI cards for `filter`.
    pub fn compute_kpis(
        dataset: &Dataset,
        filter: &SalesFilter,
    ) -> Result<KpiSummary, ProcessorError> {
        let filtered = DataProcessor::filter_sales(dataset, filter)?;
        let mut kpis = Self::summarize(&filtered)?;

        let window = filter.date_range().or_else(|| dataset.date_bounds());
        if let Some((start, end)) = window {
            let previous = Self::previous_window(start, end);
            let previous_sales = DataProcessor::total_sales(&DataProcessor::filter_sales(
                dataset,
                &filter.with_range(previous.0, previous.1),
            )?)?;
            // Without a date filter the window is the full data range, so the totals coincide.
            kpis.growth_pct = Self::growth_pct(kpis.total_sales, previous_sales);
            kpis.window = Some((start, end));
        }

        Ok(kpis)
    }

    /// Totals, averages and median over already-filtered rows.
    pub fn summarize(df: &DataFrame) -> Result<KpiSummary, ProcessorError> {
        let amounts = f64_values(df, "Sales_Amount")?;
        let units = i64_values(df, "Units_Sold")?;

        let order_count = amounts.len();
        let total_sales: f64 = amounts.iter().sum();
        let total_units: i64 = units.iter().sum();

        if order_count == 0 {
            return Ok(KpiSummary::default());
        }

        let median_order_value = Some(Data::new(amounts).median());

        Ok(KpiSummary {
            total_sales,
            total_units,
            order_count,
            avg_order_value: total_sales / order_count as f64,
            avg_units_per_order: Some(total_units as f64 / order_count as f64),
            median_order_value,
            growth_pct: None,
            window: None,
        })
    }

    /// The window of equal length ending the day before `start`.
    pub fn previous_window(start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
        let length = (end - start).num_days() + 1;
        let previous_end = start - Duration::days(1);
        let previous_start = start - Duration::days(length);
        (previous_start, previous_end)
    }

    pub fn growth_pct(current: f64, previous: f64) -> Option<f64> {
        if previous > 0.0 {
            Some((current - previous) / previous * 100.0)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{fixture_dataset, Selection};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn kpis_over_all_rows() {
        let kpis = StatsCalculator::compute_kpis(&fixture_dataset(), &SalesFilter::default())
            .unwrap();

        assert!((kpis.total_sales - 785.0).abs() < 1e-9);
        assert_eq!(kpis.total_units, 21);
        assert_eq!(kpis.order_count, 7);
        assert!((kpis.avg_order_value - 785.0 / 7.0).abs() < 1e-9);
        assert!((kpis.avg_units_per_order.unwrap() - 3.0).abs() < 1e-9);
        assert!((kpis.median_order_value.unwrap() - 100.0).abs() < 1e-9);
        // Nothing precedes the first sale.
        assert_eq!(kpis.growth_pct, None);
        assert_eq!(kpis.window, Some((day(1), day(4))));
    }

    #[test]
    fn growth_compares_with_preceding_window() {
        let filter = SalesFilter {
            start: Some(day(3)),
            end: Some(day(4)),
            ..SalesFilter::default()
        };
        let kpis = StatsCalculator::compute_kpis(&fixture_dataset(), &filter).unwrap();

        assert!((kpis.total_sales - 405.0).abs() < 1e-9);
        let expected = (405.0 - 380.0) / 380.0 * 100.0;
        assert!((kpis.growth_pct.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn empty_selection_has_zero_figures() {
        let filter = SalesFilter {
            region: Selection::Only("Nowhere".into()),
            ..SalesFilter::default()
        };
        let kpis = StatsCalculator::compute_kpis(&fixture_dataset(), &filter).unwrap();

        assert_eq!(kpis.order_count, 0);
        assert_eq!(kpis.total_sales, 0.0);
        assert_eq!(kpis.avg_order_value, 0.0);
        assert_eq!(kpis.avg_units_per_order, None);
        assert_eq!(kpis.median_order_value, None);
        assert_eq!(kpis.growth_pct, None);
    }

    #[test]
    fn previous_window_has_equal_length() {
        assert_eq!(
            StatsCalculator::previous_window(day(10), day(14)),
            (day(5), day(9))
        );
        assert_eq!(
            StatsCalculator::previous_window(day(10), day(10)),
            (day(9), day(9))
        );
    }

    #[test]
    fn growth_needs_previous_sales() {
        assert_eq!(StatsCalculator::growth_pct(50.0, 0.0), None);
        assert_eq!(StatsCalculator::growth_pct(150.0, 100.0), Some(50.0));
        assert_eq!(StatsCalculator::growth_pct(50.0, 100.0), Some(-50.0));
    }
}
