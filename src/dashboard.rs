//! Dashboard Snapshot
//! Everything one page render needs, computed from the loaded tables in one pass.

use crate::charts::{ChartData, ChartKind, ChartPlotter};
use crate::config::Settings;
use crate::data::{
    DataProcessor, Dataset, InventoryError, InventoryMonitor, InventoryStatus, ProcessorError,
    SalesFilter,
};
use crate::stats::{KpiSummary, StatsCalculator};
use chrono::{DateTime, Local, NaiveDate};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// Values offered by the filter widgets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub regions: Vec<String>,
    pub categories: Vec<String>,
}

impl FilterOptions {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let bounds = dataset.date_bounds();
        Self {
            min_date: bounds.map(|(min, _)| min),
            max_date: bounds.map(|(_, max)| max),
            regions: dataset.regions(),
            categories: dataset.categories(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub title: String,
    pub filter: SalesFilter,
    pub options: FilterOptions,
    pub kpis: KpiSummary,
    /// One entry per [`ChartKind::ALL`], in that order.
    pub charts: Vec<ChartData>,
    pub inventory: InventoryStatus,
    pub generated_at: DateTime<Local>,
}

impl DashboardSnapshot {
    pub fn build(
        dataset: &Dataset,
        settings: &Settings,
        filter: SalesFilter,
        tick: u64,
    ) -> Result<Self, DashboardError> {
        filter.validate()?;

        let sales = DataProcessor::filter_sales(dataset, &filter)?;
        let kpis = StatsCalculator::compute_kpis(dataset, &filter)?;
        let inventory = InventoryMonitor::status(
            dataset,
            tick,
            &settings.inventory,
            settings.dashboard.stock_health_target,
        )?;

        let charts = ChartKind::ALL
            .par_iter()
            .map(|kind| ChartPlotter::build(*kind, &sales, &inventory))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            rows = sales.height(),
            tick,
            low_stock = inventory.low_stock.len(),
            "Dashboard snapshot built"
        );

        Ok(Self {
            title: settings.dashboard.title.clone(),
            filter,
            options: FilterOptions::from_dataset(dataset),
            kpis,
            charts,
            inventory,
            generated_at: Local::now(),
        })
    }

    pub fn chart(&self, kind: ChartKind) -> Option<&ChartData> {
        self.charts.iter().find(|chart| chart.kind() == kind)
    }
}
