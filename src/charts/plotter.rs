//! Chart Plotter Module
//! Chart kinds, their data series and the dashboard colour palette.

use crate::data::{
    DailySales, DataProcessor, InventoryStatus, ProcessorError, ProductPerformance, RegionSales,
    StockGauge,
};
use plotters::style::RGBColor;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const PRIMARY: RGBColor = RGBColor(52, 152, 219); // #3498db
pub const SUCCESS: RGBColor = RGBColor(39, 174, 96); // #27ae60
pub const DANGER: RGBColor = RGBColor(231, 76, 60); // #e74c3c
pub const WARNING: RGBColor = RGBColor(243, 156, 18); // #f39c12
pub const INFO: RGBColor = RGBColor(23, 162, 184); // #17a2b8
pub const DARK: RGBColor = RGBColor(44, 62, 80); // #2c3e50
pub const LIGHT: RGBColor = RGBColor(236, 240, 241); // #ecf0f1
pub const NEUTRAL: RGBColor = RGBColor(211, 211, 211);
pub const MUTED: RGBColor = RGBColor(127, 140, 141); // #7f8c8d

/// Category colours for the scatter plot.
pub const PALETTE: [RGBColor; 8] = [
    PRIMARY,
    RGBColor(155, 89, 182), // Purple
    WARNING,
    SUCCESS,
    DANGER,
    INFO,
    RGBColor(233, 30, 99),  // Pink
    RGBColor(121, 85, 72),  // Brown
];

/// Anchor points of the viridis colour scale.
const VIRIDIS: [RGBColor; 5] = [
    RGBColor(68, 1, 84),
    RGBColor(59, 82, 139),
    RGBColor(33, 145, 140),
    RGBColor(94, 201, 98),
    RGBColor(253, 231, 37),
];

/// `#rrggbb` form of a palette colour, for the HTML page.
pub fn hex(color: RGBColor) -> String {
    format!("#{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}

/// Colour on the viridis scale for `t` in `[0, 1]`.
pub fn viridis(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let idx = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - idx as f64;
    let (a, b) = (VIRIDIS[idx], VIRIDIS[idx + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// `1234567.8` → `"1,234,568"`.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        format!("-{out}")
    } else {
        out
    }
}

pub fn format_currency(value: f64) -> String {
    if value < 0.0 {
        format!("-${}", format_thousands(-value))
    } else {
        format!("${}", format_thousands(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    SalesByRegion,
    SalesTrend,
    ProductPerformance,
    StockHealth,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::SalesByRegion,
        ChartKind::SalesTrend,
        ChartKind::ProductPerformance,
        ChartKind::StockHealth,
    ];

    /// Kinds derived from the sales table.
    pub const SALES: [ChartKind; 3] = [
        ChartKind::SalesByRegion,
        ChartKind::SalesTrend,
        ChartKind::ProductPerformance,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ChartKind::SalesByRegion => "sales-by-region",
            ChartKind::SalesTrend => "sales-trend",
            ChartKind::ProductPerformance => "product-performance",
            ChartKind::StockHealth => "stock-health",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::SalesByRegion => "Sales Performance by Region",
            ChartKind::SalesTrend => "Sales Trend Over Time",
            ChartKind::ProductPerformance => "Product Performance: Sales vs Units Sold",
            ChartKind::StockHealth => "Live Stock Health %",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown chart '{0}'")]
pub struct UnknownChart(pub String);

impl FromStr for ChartKind {
    type Err = UnknownChart;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| UnknownChart(s.to_string()))
    }
}

/// Series behind one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ChartData {
    SalesByRegion { rows: Vec<RegionSales> },
    SalesTrend { rows: Vec<DailySales> },
    ProductPerformance { rows: Vec<ProductPerformance> },
    StockHealth { gauge: StockGauge },
}

impl ChartData {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartData::SalesByRegion { .. } => ChartKind::SalesByRegion,
            ChartData::SalesTrend { .. } => ChartKind::SalesTrend,
            ChartData::ProductPerformance { .. } => ChartKind::ProductPerformance,
            ChartData::StockHealth { .. } => ChartKind::StockHealth,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ChartData::SalesByRegion { rows } => rows.is_empty(),
            ChartData::SalesTrend { rows } => rows.is_empty(),
            ChartData::ProductPerformance { rows } => rows.is_empty(),
            ChartData::StockHealth { .. } => false,
        }
    }
}

/// Builds chart series from the filtered sales rows and the inventory status.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn build(
        kind: ChartKind,
        sales: &DataFrame,
        inventory: &InventoryStatus,
    ) -> Result<ChartData, ProcessorError> {
        Ok(match kind {
            ChartKind::SalesByRegion => ChartData::SalesByRegion {
                rows: DataProcessor::sales_by_region(sales)?,
            },
            ChartKind::SalesTrend => ChartData::SalesTrend {
                rows: DataProcessor::daily_sales(sales)?,
            },
            ChartKind::ProductPerformance => ChartData::ProductPerformance {
                rows: DataProcessor::product_performance(sales)?,
            },
            ChartKind::StockHealth => ChartData::StockHealth {
                gauge: inventory.gauge.clone(),
            },
        })
    }

    /// Colour for the `index`-th category.
    pub fn category_color(index: usize) -> RGBColor {
        PALETTE[index % PALETTE.len()]
    }
}
