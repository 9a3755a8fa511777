use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::error::ErrorResponse;

/// JSON 404 for unmatched routes.
///
/// Not instrumented: recording arbitrary client paths as metric labels would
/// grow the label set without bound.
pub async fn fallback_handler(uri: Uri) -> Response {
    tracing::debug!(path = %uri.path(), "no route matched");
    (
        StatusCode::NOT_FOUND,
        axum::Json(ErrorResponse::new("The requested resource was not found")),
    )
        .into_response()
}
