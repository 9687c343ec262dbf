// GET handlers: version, api/metrics, api/report

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::AppState;
use crate::report::{self, ReportFormat};

/// GET /version: service name and version from Cargo.toml at build time.
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/metrics: current snapshot keyed by domain name.
pub(super) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.aggregator.snapshot().await)
}

#[derive(Debug, Deserialize)]
pub(super) struct ReportQuery {
    format: Option<String>,
}

/// GET /api/report?format=json|csv|pdf: snapshot as a file download.
pub(super) async fn report_handler(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Response {
    let format = ReportFormat::parse_lenient(query.format.as_deref());
    let snapshot = state.aggregator.snapshot().await;
    match report::render(&snapshot, format, chrono::Local::now()) {
        Ok(r) => (
            [
                (header::CONTENT_TYPE, r.content_type().to_string()),
                (header::CONTENT_DISPOSITION, r.content_disposition()),
            ],
            r.body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, format = format.extension(), "report generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("error generating {} report", format.extension()),
            )
                .into_response()
        }
    }
}
