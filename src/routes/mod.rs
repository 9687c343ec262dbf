// HTTP routes: dashboard page, metrics JSON and report downloads

mod dashboard;
mod http;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};

use crate::aggregator::Aggregator;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) aggregator: Aggregator,
}

pub fn app(aggregator: Aggregator) -> Router {
    let state = AppState { aggregator };
    Router::new()
        .route("/", get(dashboard::index_handler)) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/metrics", get(http::metrics_handler)) // GET /api/metrics
        .route("/api/report", get(http::report_handler)) // GET /api/report?format=
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
