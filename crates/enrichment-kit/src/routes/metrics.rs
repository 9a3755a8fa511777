use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::metrics::{MetricsRegistry, PROMETHEUS_CONTENT_TYPE};

/// Default scrape path.
pub const METRICS_PATH: &str = "/metrics";

/// `GET <path>` rendering `registry` for Prometheus scrapes.
pub fn metrics_routes(path: &str, registry: MetricsRegistry) -> Router {
    Router::new()
        .route(path, get(render_metrics))
        .with_state(registry)
}

async fn render_metrics(State(registry): State<MetricsRegistry>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        registry.render(),
    )
}
