//! HTTP surface of the report service.
//!
//! Endpoints:
//! - GET /api/export        - wellness report as a PDF attachment
//! - GET /api/trust/export  - trust report as a PDF attachment
//! - GET /api/wellness      - wellness rows as JSON
//! - GET /health            - liveness probe
//!
//! Session checks happen in front of this router, not here.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::error;
use serde::Serialize;
use serde_json::Value;

use crate::model::ReportKind;
use crate::pipeline::{ExportError, ExportOutcome, RenderedReport, ReportPipeline};
use crate::store::{RowQuery, StoreError};

/// Message returned when a report has no rows.
pub const NO_DATA_MESSAGE: &str = "No data available";

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

fn error_response(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { error: message }),
    )
        .into_response()
}

impl IntoResponse for ExportError {
    fn into_response(self) -> Response {
        error!("PDF export error: {}", self);
        error_response(self.to_string())
    }
}

impl IntoResponse for ExportOutcome {
    fn into_response(self) -> Response {
        match self {
            ExportOutcome::NoData => (
                StatusCode::NOT_FOUND,
                Json(MessageResponse {
                    message: NO_DATA_MESSAGE,
                }),
            )
                .into_response(),
            ExportOutcome::Rendered(report) => pdf_attachment(report),
        }
    }
}

fn pdf_attachment(report: RenderedReport) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", report.file_name());
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, "no-store".to_owned()),
        ],
        report.bytes,
    )
        .into_response()
}

/// Builds the router over a shared pipeline.
pub fn router(pipeline: ReportPipeline) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/export", get(export_wellness))
        .route("/api/trust/export", get(export_trust))
        .route("/api/wellness", get(wellness_rows))
        .with_state(pipeline)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/export
async fn export_wellness(
    State(pipeline): State<ReportPipeline>,
) -> Result<ExportOutcome, ExportError> {
    pipeline.export(ReportKind::Wellness).await
}

/// GET /api/trust/export
async fn export_trust(
    State(pipeline): State<ReportPipeline>,
) -> Result<ExportOutcome, ExportError> {
    pipeline.export(ReportKind::Trust).await
}

/// GET /api/wellness
///
/// Raw rows for the dashboard charts, oldest first.
async fn wellness_rows(State(pipeline): State<ReportPipeline>) -> Response {
    let query = RowQuery::for_kind(ReportKind::Wellness);
    match pipeline.store().select(&query).await {
        Ok(rows) => Json(Value::Array(rows)).into_response(),
        Err(err) => wellness_fetch_error(err),
    }
}

fn wellness_fetch_error(err: StoreError) -> Response {
    error!("Wellness fetch error: {}", err);
    error_response(err.to_string())
}
