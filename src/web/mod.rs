//! Web module - axum router serving the dashboard page and its JSON/SVG API

use crate::config::Settings;
use crate::data::Dataset;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;
mod page;
pub mod query;

pub use error::AppError;
pub use query::{DashboardQuery, DashboardTab};

/// The shared application state that all handlers can access.
/// Loaded once at start-up and only read afterwards.
pub struct AppState {
    pub dataset: Dataset,
    pub settings: Settings,
}

/// Builds the application router.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/filters", get(handlers::get_filters))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/kpis", get(handlers::get_kpis))
        .route("/api/charts/:kind", get(handlers::get_chart))
        .route("/api/charts/:kind/svg", get(handlers::get_chart_svg))
        .route("/api/inventory", get(handlers::get_inventory))
        .route("/api/export", get(handlers::export_report))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Binds `addr` and serves until the process is stopped.
pub async fn run_server(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Dashboard listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
