//! Static Chart Renderer
//! Draws the dashboard charts as SVG documents with plotters.
//!
//! Layout per chart:
//! 1. Title centered at the top
//! 2. Plot area with axis descriptions
//! 3. For empty data, a framed notice instead of the plot

use crate::charts::plotter::{
    format_currency, format_thousands, viridis, ChartData, ChartPlotter, DANGER, DARK, LIGHT,
    MUTED, NEUTRAL, PRIMARY, SUCCESS, WARNING,
};
use crate::data::{
    DailySales, ProductPerformance, RegionSales, StockGauge, NEUTRAL_BAND, SUCCESS_BAND,
    WARNING_BAND,
};
use chrono::Duration;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use thiserror::Error;

const FONT: &str = "sans-serif";
const NO_DATA: &str = "No data for the selected filters";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to draw chart: {0}")]
    Drawing(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Drawing(err.to_string())
    }
}

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

pub struct ChartRenderer;

impl ChartRenderer {
    /// Render `data` to a standalone SVG document of `width` x `height` pixels.
    pub fn render_svg(data: &ChartData, width: u32, height: u32) -> Result<String, RenderError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
            root.fill(&WHITE)?;

            let title = data.kind().title();
            if data.is_empty() {
                Self::draw_notice(&root, title, width, height)?;
            } else {
                match data {
                    ChartData::SalesByRegion { rows } => Self::draw_region_bars(&root, title, rows)?,
                    ChartData::SalesTrend { rows } => Self::draw_trend_line(&root, title, rows)?,
                    ChartData::ProductPerformance { rows } => {
                        Self::draw_product_scatter(&root, title, rows)?
                    }
                    ChartData::StockHealth { gauge } => {
                        Self::draw_gauge(&root, title, gauge, width, height)?
                    }
                }
            }

            root.present()?;
        }
        Ok(svg)
    }

    fn draw_notice(root: &Area, title: &str, width: u32, height: u32) -> Result<(), RenderError> {
        let (w, h) = (width as i32, height as i32);
        let centered = Pos::new(HPos::Center, VPos::Center);

        root.draw(&Text::new(
            title.to_string(),
            (w / 2, 24),
            (FONT, 20).into_font().color(&DARK).pos(centered),
        ))?;
        root.draw(&Rectangle::new(
            [(20, 50), (w - 20, h - 20)],
            ShapeStyle::from(&LIGHT).stroke_width(2),
        ))?;
        root.draw(&Text::new(
            NO_DATA.to_string(),
            (w / 2, h / 2 + 15),
            (FONT, 16).into_font().color(&MUTED).pos(centered),
        ))?;
        Ok(())
    }

    /// Bar chart, bars coloured by value on the viridis scale.
    fn draw_region_bars(root: &Area, title: &str, rows: &[RegionSales]) -> Result<(), RenderError> {
        let max = rows.iter().map(|r| r.sales).fold(0.0_f64, f64::max);
        let min = rows.iter().map(|r| r.sales).fold(0.0_f64, f64::min);
        let y_max = if max > 0.0 { max * 1.15 } else { 1.0 };
        let n = rows.len() as u32;

        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, 20).into_font().color(&DARK))
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(80)
            .build_cartesian_2d((0u32..n).into_segmented(), min..y_max)?;

        let labels: Vec<String> = rows.iter().map(|r| r.region.clone()).collect();
        let x_formatter = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        };
        let y_formatter = |v: &f64| format_currency(*v);

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(rows.len())
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .x_desc("Region")
            .y_desc("Sales Amount")
            .label_style((FONT, 12))
            .axis_desc_style((FONT, 14))
            .draw()?;

        chart.draw_series(rows.iter().enumerate().map(|(i, row)| {
            let t = if max > 0.0 { row.sales / max } else { 0.0 };
            let i = i as u32;
            Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0.0),
                    (SegmentValue::Exact(i + 1), row.sales),
                ],
                viridis(t).filled(),
            )
        }))?;

        let above = Pos::new(HPos::Center, VPos::Bottom);
        chart.draw_series(rows.iter().enumerate().map(|(i, row)| {
            Text::new(
                format_currency(row.sales),
                (SegmentValue::CenterOf(i as u32), row.sales),
                (FONT, 12).into_font().color(&DARK).pos(above),
            )
        }))?;

        Ok(())
    }

    /// Daily sales as a line over the calendar.
    fn draw_trend_line(root: &Area, title: &str, rows: &[DailySales]) -> Result<(), RenderError> {
        let first = rows[0].date;
        let points: Vec<(i32, f64)> = rows
            .iter()
            .map(|r| ((r.date - first).num_days() as i32, r.sales))
            .collect();
        let span = points.last().map(|p| p.0).unwrap_or(0).max(1);
        let max = points.iter().map(|p| p.1).fold(0.0_f64, f64::max);
        let y_max = if max > 0.0 { max * 1.15 } else { 1.0 };

        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, 20).into_font().color(&DARK))
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(80)
            .build_cartesian_2d(0i32..span, 0f64..y_max)?;

        let x_formatter =
            |d: &i32| (first + Duration::days(*d as i64)).format("%Y-%m-%d").to_string();
        let y_formatter = |v: &f64| format_currency(*v);

        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .x_desc("Date")
            .y_desc("Sales Amount")
            .label_style((FONT, 12))
            .axis_desc_style((FONT, 14))
            .draw()?;

        chart.draw_series(LineSeries::new(points.iter().copied(), PRIMARY.stroke_width(3)))?;
        chart.draw_series(
            points
                .iter()
                .map(|&p| Circle::new(p, 3, PRIMARY.filled())),
        )?;

        Ok(())
    }

    /// Units vs sales, one colour per category, marker size by sales.
    fn draw_product_scatter(
        root: &Area,
        title: &str,
        rows: &[ProductPerformance],
    ) -> Result<(), RenderError> {
        let max_sales = rows.iter().map(|r| r.sales).fold(0.0_f64, f64::max);
        let max_units = rows.iter().map(|r| r.units).max().unwrap_or(0) as f64;
        let x_max = if max_units > 0.0 { max_units * 1.15 } else { 1.0 };
        let y_max = if max_sales > 0.0 { max_sales * 1.2 } else { 1.0 };

        let mut categories: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
        categories.sort_unstable();
        categories.dedup();

        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, 20).into_font().color(&DARK))
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(80)
            .build_cartesian_2d(0f64..x_max, 0f64..y_max)?;

        let x_formatter = |v: &f64| format_thousands(*v);
        let y_formatter = |v: &f64| format_currency(*v);

        chart
            .configure_mesh()
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .x_desc("Units Sold")
            .y_desc("Sales Amount")
            .label_style((FONT, 12))
            .axis_desc_style((FONT, 14))
            .draw()?;

        for (idx, category) in categories.iter().enumerate() {
            let color = ChartPlotter::category_color(idx);
            chart
                .draw_series(rows.iter().filter(|r| r.category == *category).map(|row| {
                    let radius = Self::marker_radius(row.sales, max_sales);
                    EmptyElement::at((row.units as f64, row.sales))
                        + Circle::new((0, 0), radius, color.mix(0.7).filled())
                        + Text::new(
                            row.product.clone(),
                            (radius + 3, -radius),
                            (FONT, 11).into_font().color(&DARK),
                        )
                }))?
                .label(*category)
                .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.85))
            .border_style(&LIGHT)
            .label_font((FONT, 12))
            .draw()?;

        Ok(())
    }

    fn marker_radius(sales: f64, max_sales: f64) -> i32 {
        if max_sales <= 0.0 || sales <= 0.0 {
            return 4;
        }
        4 + (16.0 * (sales / max_sales).sqrt()).round() as i32
    }

    /// Bullet gauge: coloured bands, value bar and target marker.
    fn draw_gauge(
        root: &Area,
        title: &str,
        gauge: &StockGauge,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let (upper, lower) = root.split_vertically((height as f64 * 0.45) as u32);
        let (w, h) = (width as i32, (height as f64 * 0.45) as i32);
        let centered = Pos::new(HPos::Center, VPos::Center);

        upper.draw(&Text::new(
            title.to_string(),
            (w / 2, 24),
            (FONT, 20).into_font().color(&DARK).pos(centered),
        ))?;
        upper.draw(&Text::new(
            format!("{:.1}%", gauge.value),
            (w / 2, h / 2 + 10),
            (FONT, 44).into_font().color(&DARK).pos(centered),
        ))?;
        let (arrow, delta_color) = if gauge.delta >= 0.0 {
            ("▲", SUCCESS)
        } else {
            ("▼", DANGER)
        };
        upper.draw(&Text::new(
            format!("{} {:+.1} vs target {:.0}%", arrow, gauge.delta, gauge.target),
            (w / 2, h - 12),
            (FONT, 15).into_font().color(&delta_color).pos(centered),
        ))?;

        let mut chart = ChartBuilder::on(&lower)
            .margin(25)
            .x_label_area_size(30)
            .build_cartesian_2d(0f64..100f64, 0f64..1f64)?;

        let x_formatter = |v: &f64| format!("{:.0}%", v);
        chart
            .configure_mesh()
            .disable_mesh()
            .disable_y_axis()
            .x_labels(11)
            .x_label_formatter(&x_formatter)
            .label_style((FONT, 12))
            .draw()?;

        let bands = [
            (NEUTRAL_BAND, NEUTRAL),
            (WARNING_BAND, WARNING),
            (SUCCESS_BAND, SUCCESS),
        ];
        chart.draw_series(bands.iter().map(|((from, to), color)| {
            Rectangle::new([(*from, 0.2), (*to, 0.8)], color.mix(0.6).filled())
        }))?;

        let value = gauge.value.clamp(0.0, 100.0);
        chart.draw_series(std::iter::once(Rectangle::new(
            [(0.0, 0.38), (value, 0.62)],
            PRIMARY.filled(),
        )))?;

        let target = gauge.target.clamp(0.0, 100.0);
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(target, 0.1), (target, 0.9)],
            DANGER.stroke_width(4),
        )))?;

        Ok(())
    }
}
