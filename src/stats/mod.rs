//! Stats module - KPI calculations

mod calculator;

pub use calculator::{KpiSummary, StatsCalculator};
