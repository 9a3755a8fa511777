use axum::routing::get;
use axum::Router;

/// Liveness probe path.
pub const HEALTH_PATH: &str = "/healthz";

/// `GET /healthz` answering plain-text `ok`.
pub fn health_routes() -> Router {
    Router::new().route(HEALTH_PATH, get(|| async { "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let response = health_routes()
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }
}
