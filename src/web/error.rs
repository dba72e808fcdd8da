use crate::charts::{RenderError, UnknownChart};
use crate::dashboard::DashboardError;
use crate::data::{InventoryError, ProcessorError};
use crate::report::ExportError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Processing error: {0}")]
    Processor(ProcessorError),
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Filter mistakes are the caller's fault, everything else is ours.
impl From<ProcessorError> for AppError {
    fn from(err: ProcessorError) -> Self {
        match err {
            ProcessorError::InvalidDateRange { .. } => AppError::BadRequest(err.to_string()),
            other => AppError::Processor(other),
        }
    }
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Processor(err) => err.into(),
            DashboardError::Inventory(err) => err.into(),
        }
    }
}

impl From<UnknownChart> for AppError {
    fn from(err: UnknownChart) -> Self {
        AppError::NotFound(err.to_string())
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Processor(err) => {
                tracing::error!(error = ?err, "Processing error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to process the sales data".to_string(),
                )
            }
            AppError::Inventory(err) => {
                tracing::error!(error = ?err, "Inventory error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to compute the inventory status".to_string(),
                )
            }
            AppError::Render(err) => {
                tracing::error!(error = ?err, "Render error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to render the chart".to_string(),
                )
            }
            AppError::Export(err) => {
                tracing::error!(error = ?err, "Export error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to export the report".to_string(),
                )
            }
            AppError::Task(err) => {
                tracing::error!(error = ?err, "Background task error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
