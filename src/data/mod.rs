//! Data module - CSV loading, filtering and inventory status

mod inventory;
mod loader;
mod processor;

pub use inventory::{
    InventoryError, InventoryMonitor, InventoryStatus, LowStockItem, StockGauge, StockSeverity,
    NEUTRAL_BAND, SUCCESS_BAND, WARNING_BAND,
};
pub use loader::{DataLoader, DataPaths, Dataset, LoaderError, TableSummary};
pub(crate) use loader::{f64_values, i64_values};
pub use processor::{
    DailySales, DataProcessor, ProcessorError, ProductPerformance, RegionSales, SalesFilter,
    Selection,
};

#[cfg(test)]
pub(crate) fn fixture_paths() -> DataPaths {
    DataPaths::in_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"))
}

#[cfg(test)]
pub(crate) fn fixture_dataset() -> Dataset {
    DataLoader::load(&fixture_paths()).expect("fixture data loads")
}
