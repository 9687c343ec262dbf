// Embedded dashboard page

use axum::response::{Html, IntoResponse};

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// GET /: single page that polls /api/metrics every 5 seconds.
pub(super) async fn index_handler() -> impl IntoResponse {
    Html(INDEX_HTML)
}
