//! Report Export Module
//! Packs a dashboard snapshot into a ZIP archive: summary JSON, every chart as SVG
//! and the low stock alerts as CSV.

use crate::charts::{ChartKind, ChartRenderer, RenderError};
use crate::config::DashboardSettings;
use crate::dashboard::DashboardSnapshot;
use crate::data::{InventoryStatus, LowStockItem, SalesFilter};
use crate::stats::KpiSummary;
use chrono::{DateTime, Local};
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use std::io::{Cursor, Write};
use thiserror::Error;
use ::zip::write::FileOptions;
use ::zip::ZipWriter;

pub const SUMMARY_FILE: &str = "summary.json";
pub const LOW_STOCK_FILE: &str = "low_stock.csv";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ZIP error: {0}")]
    Zip(#[from] ::zip::result::ZipError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Serialize)]
struct ReportSummary<'a> {
    title: &'a str,
    generated_at: &'a DateTime<Local>,
    filter: &'a SalesFilter,
    kpis: &'a KpiSummary,
    inventory: &'a InventoryStatus,
}

/// Report exporter for dashboard snapshots
pub struct ReportExporter;

impl ReportExporter {
    /// Build the archive in memory.
    ///
    /// Layout:
    /// - `summary.json`
    /// - `charts/<slug>.svg`, one per chart
    /// - `low_stock.csv`
    pub fn export_zip(
        snapshot: &DashboardSnapshot,
        settings: &DashboardSettings,
    ) -> Result<Vec<u8>, ExportError> {
        let rendered: Vec<(ChartKind, String)> = snapshot
            .charts
            .par_iter()
            .map(|chart| {
                ChartRenderer::render_svg(chart, settings.chart_width, settings.chart_height)
                    .map(|svg| (chart.kind(), svg))
            })
            .collect::<Result<_, _>>()?;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        zip.start_file(SUMMARY_FILE, options)?;
        let summary = ReportSummary {
            title: &snapshot.title,
            generated_at: &snapshot.generated_at,
            filter: &snapshot.filter,
            kpis: &snapshot.kpis,
            inventory: &snapshot.inventory,
        };
        serde_json::to_writer_pretty(&mut zip, &summary)?;

        for (kind, svg) in &rendered {
            zip.start_file(Self::chart_path(*kind), options)?;
            zip.write_all(svg.as_bytes())?;
        }

        zip.start_file(LOW_STOCK_FILE, options)?;
        let mut low_stock = Self::low_stock_frame(&snapshot.inventory.low_stock)?;
        CsvWriter::new(&mut zip)
            .include_header(true)
            .finish(&mut low_stock)?;

        let cursor = zip.finish()?;
        let bytes = cursor.into_inner();

        tracing::info!(
            bytes = bytes.len(),
            charts = rendered.len(),
            "Report archive generated"
        );
        Ok(bytes)
    }

    pub fn chart_path(kind: ChartKind) -> String {
        format!("charts/{}.svg", kind.slug())
    }

    /// Download name, stamped with the snapshot time.
    pub fn file_name(snapshot: &DashboardSnapshot) -> String {
        format!(
            "salesboard-report-{}.zip",
            snapshot.generated_at.format("%Y%m%d-%H%M%S")
        )
    }

    fn low_stock_frame(items: &[LowStockItem]) -> PolarsResult<DataFrame> {
        let products: Vec<&str> = items.iter().map(|i| i.product.as_str()).collect();
        let stock: Vec<i64> = items.iter().map(|i| i.stock).collect();
        let reorder: Vec<i64> = items.iter().map(|i| i.reorder_level).collect();
        let status: Vec<&str> = items.iter().map(|i| i.severity.label()).collect();

        df!(
            "Product" => products,
            "Current_Stock" => stock,
            "Reorder_Level" => reorder,
            "Status" => status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::data::fixture_dataset;
    use std::io::Read;
    use ::zip::ZipArchive;

    fn archive() -> ZipArchive<Cursor<Vec<u8>>> {
        let settings = Settings::default();
        let snapshot = DashboardSnapshot::build(
            &fixture_dataset(),
            &settings,
            SalesFilter::default(),
            0,
        )
        .unwrap();
        let bytes = ReportExporter::export_zip(&snapshot, &settings.dashboard).unwrap();
        ZipArchive::new(Cursor::new(bytes)).unwrap()
    }

    fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut content = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
    }

    #[test]
    fn archive_holds_summary_charts_and_alerts() {
        let mut archive = archive();

        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "charts/product-performance.svg",
                "charts/sales-by-region.svg",
                "charts/sales-trend.svg",
                "charts/stock-health.svg",
                "low_stock.csv",
                "summary.json",
            ]
        );

        let summary: serde_json::Value =
            serde_json::from_str(&read_entry(&mut archive, SUMMARY_FILE)).unwrap();
        assert_eq!(summary["kpis"]["order_count"], 7);
        assert_eq!(summary["filter"]["region"], "all");
        assert_eq!(summary["inventory"]["low_stock"][1]["severity"], "critical");

        let svg = read_entry(&mut archive, "charts/sales-by-region.svg");
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn low_stock_csv_lists_alerts() {
        let mut archive = archive();
        let csv = read_entry(&mut archive, LOW_STOCK_FILE);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Product,Current_Stock,Reorder_Level,Status");
        assert_eq!(lines[1], "Gadget,8,10,LOW");
        assert_eq!(lines[2], "Manual,3,10,CRITICAL");
        assert_eq!(lines.len(), 3);
    }
}
