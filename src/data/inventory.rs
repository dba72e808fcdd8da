//! Inventory Monitor Module
//! Stock health percentage and low stock alerts for the operations panel.

use crate::config::InventorySettings;
use crate::data::loader::{i64_values, string_values};
use crate::data::Dataset;
use polars::prelude::PolarsError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use thiserror::Error;

/// Gauge bands as (lower, upper) bounds in percent.
pub const NEUTRAL_BAND: (f64, f64) = (0.0, 50.0);
pub const WARNING_BAND: (f64, f64) = (50.0, 80.0);
pub const SUCCESS_BAND: (f64, f64) = (80.0, 100.0);

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockSeverity {
    /// At or below half the reorder level.
    Critical,
    Low,
}

impl StockSeverity {
    pub fn classify(stock: i64, reorder: i64) -> Self {
        if stock as f64 <= reorder as f64 / 2.0 {
            StockSeverity::Critical
        } else {
            StockSeverity::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockSeverity::Critical => "CRITICAL",
            StockSeverity::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowStockItem {
    pub product: String,
    pub stock: i64,
    pub reorder_level: i64,
    pub severity: StockSeverity,
}

/// Value shown on the stock health gauge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockGauge {
    pub value: f64,
    pub target: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryStatus {
    pub tick: u64,
    pub total_products: usize,
    pub gauge: StockGauge,
    pub low_stock: Vec<LowStockItem>,
}

impl InventoryStatus {
    pub fn all_well_stocked(&self) -> bool {
        self.low_stock.is_empty()
    }
}

#[derive(Debug, Clone)]
struct StockRow {
    product: String,
    stock: i64,
    reorder_level: i64,
}

/// Computes the inventory status shown on the dashboard.
pub struct InventoryMonitor;

impl InventoryMonitor {
    pub fn status(
        dataset: &Dataset,
        tick: u64,
        settings: &InventorySettings,
        target: f64,
    ) -> Result<InventoryStatus, InventoryError> {
        let mut rows = Self::stock_rows(dataset)?;
        if settings.simulate_drift {
            Self::apply_drift(&mut rows, tick, settings.drift);
        }
        Ok(Self::evaluate(rows, tick, target))
    }

    fn stock_rows(dataset: &Dataset) -> Result<Vec<StockRow>, InventoryError> {
        let products = string_values(&dataset.inventory, "Product_Name")?;
        let stock = i64_values(&dataset.inventory, "Stock_Level")?;
        let reorder = i64_values(&dataset.inventory, "Reorder_Level")?;

        let mut rows: Vec<StockRow> = products
            .into_iter()
            .zip(stock.into_iter().zip(reorder))
            .map(|(product, (stock, reorder_level))| StockRow {
                product,
                stock,
                reorder_level,
            })
            .collect();
        rows.sort_by(|a, b| a.product.cmp(&b.product));
        Ok(rows)
    }

    /// Shift every stock level by a seeded random amount in `[-drift, drift]`, never below zero.
    fn apply_drift(rows: &mut [StockRow], tick: u64, drift: i64) {
        let mut rng = StdRng::seed_from_u64(tick);
        for row in rows.iter_mut() {
            let change = rng.gen_range(-drift..=drift);
            row.stock = (row.stock + change).max(0);
        }
    }

    fn evaluate(rows: Vec<StockRow>, tick: u64, target: f64) -> InventoryStatus {
        let total_products = rows.len();
        let low_stock: Vec<LowStockItem> = rows
            .into_iter()
            .filter(|row| row.stock < row.reorder_level)
            .map(|row| LowStockItem {
                severity: StockSeverity::classify(row.stock, row.reorder_level),
                product: row.product,
                stock: row.stock,
                reorder_level: row.reorder_level,
            })
            .collect();

        let value = if total_products == 0 {
            100.0
        } else {
            (total_products - low_stock.len()) as f64 / total_products as f64 * 100.0
        };

        InventoryStatus {
            tick,
            total_products,
            gauge: StockGauge {
                value,
                target,
                delta: value - target,
            },
            low_stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixture_dataset;

    fn stable() -> InventorySettings {
        InventorySettings {
            simulate_drift: false,
            drift: 2,
        }
    }

    #[test]
    fn classifies_low_and_critical_stock() {
        let status = InventoryMonitor::status(&fixture_dataset(), 0, &stable(), 90.0).unwrap();

        assert_eq!(status.total_products, 4);
        assert_eq!(
            status.low_stock,
            vec![
                LowStockItem {
                    product: "Gadget".into(),
                    stock: 8,
                    reorder_level: 10,
                    severity: StockSeverity::Low,
                },
                LowStockItem {
                    product: "Manual".into(),
                    stock: 3,
                    reorder_level: 10,
                    severity: StockSeverity::Critical,
                },
            ]
        );
        assert!((status.gauge.value - 50.0).abs() < 1e-9);
        assert!((status.gauge.delta + 40.0).abs() < 1e-9);
        assert!(!status.all_well_stocked());
    }

    #[test]
    fn severity_boundary_is_half_the_reorder_level() {
        assert_eq!(StockSeverity::classify(5, 10), StockSeverity::Critical);
        assert_eq!(StockSeverity::classify(6, 10), StockSeverity::Low);
        assert_eq!(StockSeverity::classify(1, 3), StockSeverity::Critical);
        assert_eq!(StockSeverity::classify(2, 3), StockSeverity::Low);
    }

    #[test]
    fn empty_inventory_is_fully_healthy() {
        let status = InventoryMonitor::evaluate(Vec::new(), 3, 90.0);
        assert_eq!(status.total_products, 0);
        assert!((status.gauge.value - 100.0).abs() < 1e-9);
        assert!(status.all_well_stocked());
    }

    #[test]
    fn drift_is_deterministic_per_tick_and_clipped() {
        let settings = InventorySettings {
            simulate_drift: true,
            drift: 5,
        };
        let dataset = fixture_dataset();

        let first = InventoryMonitor::status(&dataset, 7, &settings, 90.0).unwrap();
        let again = InventoryMonitor::status(&dataset, 7, &settings, 90.0).unwrap();
        assert_eq!(first, again);

        let mut rows = vec![StockRow {
            product: "Empty".into(),
            stock: 0,
            reorder_level: 1,
        }];
        for tick in 0..50 {
            InventoryMonitor::apply_drift(&mut rows, tick, 5);
            assert!(rows[0].stock >= 0);
            assert!(rows[0].stock <= 5 * (tick as i64 + 1));
        }
    }
}
