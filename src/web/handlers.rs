use crate::charts::{ChartData, ChartKind, ChartPlotter, ChartRenderer};
use crate::dashboard::{DashboardSnapshot, FilterOptions};
use crate::data::{DataProcessor, InventoryMonitor, InventoryStatus};
use crate::report::ReportExporter;
use crate::stats::{KpiSummary, StatsCalculator};
use crate::web::{error::AppError, page, query::DashboardQuery, AppState};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use std::sync::Arc;

fn snapshot(state: &AppState, query: &DashboardQuery) -> Result<DashboardSnapshot, AppError> {
    let filter = query.filter()?;
    Ok(DashboardSnapshot::build(
        &state.dataset,
        &state.settings,
        filter,
        query.tick()?,
    )?)
}

/// # GET /
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, AppError> {
    let snapshot = snapshot(&state, &query)?;
    let html = page::render_page(
        &snapshot,
        query.tab(),
        query.tick()?,
        &state.settings.dashboard,
    )?;
    Ok(Html(html))
}

/// # GET /api/filters
pub async fn get_filters(State(state): State<Arc<AppState>>) -> Json<FilterOptions> {
    Json(FilterOptions::from_dataset(&state.dataset))
}

/// # GET /api/dashboard
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardSnapshot>, AppError> {
    Ok(Json(snapshot(&state, &query)?))
}

/// # GET /api/kpis
pub async fn get_kpis(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<KpiSummary>, AppError> {
    // KPIs ignore the tick but reject a malformed one like every other route.
    query.tick()?;
    let filter = query.filter()?;
    let kpis = StatsCalculator::compute_kpis(&state.dataset, &filter)?;
    Ok(Json(kpis))
}

fn inventory_status(state: &AppState, tick: u64) -> Result<InventoryStatus, AppError> {
    Ok(InventoryMonitor::status(
        &state.dataset,
        tick,
        &state.settings.inventory,
        state.settings.dashboard.stock_health_target,
    )?)
}

/// # GET /api/inventory
pub async fn get_inventory(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<InventoryStatus>, AppError> {
    Ok(Json(inventory_status(&state, query.tick()?)?))
}

fn chart_data(
    state: &AppState,
    kind: &str,
    query: &DashboardQuery,
) -> Result<ChartData, AppError> {
    let kind: ChartKind = kind.parse()?;
    let filter = query.filter()?;
    let sales = DataProcessor::filter_sales(&state.dataset, &filter)?;
    let inventory = inventory_status(state, query.tick()?)?;
    Ok(ChartPlotter::build(kind, &sales, &inventory)?)
}

/// # GET /api/charts/:kind
pub async fn get_chart(
    Path(kind): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<ChartData>, AppError> {
    Ok(Json(chart_data(&state, &kind, &query)?))
}

/// # GET /api/charts/:kind/svg
pub async fn get_chart_svg(
    Path(kind): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    let data = chart_data(&state, &kind, &query)?;
    let settings = &state.settings.dashboard;
    let svg = ChartRenderer::render_svg(&data, settings.chart_width, settings.chart_height)?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}

/// # GET /api/export
/// Builds the ZIP report off the async runtime.
pub async fn export_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = query.filter()?;
    let tick = query.tick()?;

    let (file_name, bytes) = tokio::task::spawn_blocking(move || -> Result<_, AppError> {
        let snapshot = DashboardSnapshot::build(&state.dataset, &state.settings, filter, tick)?;
        let bytes = ReportExporter::export_zip(&snapshot, &state.settings.dashboard)?;
        Ok((ReportExporter::file_name(&snapshot), bytes))
    })
    .await??;

    tracing::info!(file = %file_name, bytes = bytes.len(), "Report exported");

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    ))
}
