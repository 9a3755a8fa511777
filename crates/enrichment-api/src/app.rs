use axum::routing::{get, post};
use axum::Router;
use enrichment_kit::RouterExt;

use crate::handlers::{enrich, index, ENRICH_PATH, INDEX_PATH};
use crate::state::AppState;

/// Full service router: business routes, probe, metrics, fallback and middleware.
pub fn router(state: AppState) -> Router {
    let metrics = state.metrics.clone();
    let config = state.config.clone();

    Router::new()
        .route(INDEX_PATH, get(index))
        .route(ENRICH_PATH, post(enrich))
        .with_state(state)
        .with_health_check()
        .with_metrics(metrics)
        .with_fallback()
        .with_default_layers(&*config)
}
