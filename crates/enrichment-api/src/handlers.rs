//! Instrumented request handlers.
//!
//! Each handler opens a [`RequestTimer`](enrichment_kit::RequestTimer) before
//! doing any work and finishes it with the resolved status, so the recorded
//! duration covers reading the body and the simulated latency.

use axum::extract::{FromRequest, Request, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use enrichment_kit::HttpError;

use crate::error::ApiError;
use crate::model::{EnrichmentRequest, EnrichmentResult, IndexResponse, GREETING};
use crate::state::AppState;

pub const INDEX_PATH: &str = "/";
pub const ENRICH_PATH: &str = "/enrich";

/// `GET /`
pub async fn index(State(state): State<AppState>) -> Response {
    let timer = state.metrics.start_timer("GET", INDEX_PATH);

    let response = Json(IndexResponse {
        message: GREETING,
        version: &state.config.app_version,
    })
    .into_response();

    timer.finish(response.status());
    response
}

/// `POST /enrich`
pub async fn enrich(State(state): State<AppState>, request: Request) -> Response {
    let timer = state.metrics.start_timer("POST", ENRICH_PATH);

    let response = match enrich_transaction(&state, request).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => {
            tracing::warn!(
                status = err.status_code().as_u16(),
                exception = %err,
                "rejected enrichment request"
            );
            err.into_response()
        }
    };

    timer.finish(response.status());
    response
}

async fn enrich_transaction(
    state: &AppState,
    request: Request,
) -> Result<EnrichmentResult, ApiError> {
    let Json(payload) = Json::<EnrichmentRequest>::from_request(request, state).await?;
    let transaction_id = payload.into_transaction_id()?;

    // Stand-in for the downstream enrichment call.
    tokio::time::sleep(state.config.enrich_delay()).await;

    tracing::info!(transaction_id = %transaction_id, "transaction enriched");
    Ok(EnrichmentResult::for_transaction(&transaction_id))
}
