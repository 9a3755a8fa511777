use axum::body::Body;
use axum::http::{header, HeaderValue, Request, Response};
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::error::ErrorResponse;
use crate::Environment;

/// Rewrites non-JSON error responses into the `{"error": ...}` envelope.
///
/// Catches what handlers never see: panics, timeouts, 405s from the router.
/// Responses that already carry `application/json` pass through untouched.
#[derive(Clone, Copy)]
pub struct JsonErrorLayer {
    environment: Environment,
}

impl JsonErrorLayer {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }
}

impl<S> Layer<S> for JsonErrorLayer {
    type Service = JsonErrorService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        JsonErrorService {
            inner,
            environment: self.environment,
        }
    }
}

#[derive(Clone)]
pub struct JsonErrorService<S> {
    inner: S,
    environment: Environment,
}

fn is_json(response: &Response<impl Sized>) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

impl<S, B> Service<Request<Body>> for JsonErrorService<S>
where
    S: Service<Request<Body>, Response = Response<B>> + Clone + Send + 'static,
    S::Future: Send,
    B: axum::body::HttpBody<Data = axum::body::Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let hide_details = self.environment.is_production();

        Box::pin(async move {
            let response = inner.call(req).await?;
            let status = response.status();

            if !(status.is_client_error() || status.is_server_error()) || is_json(&response) {
                let (parts, body) = response.into_parts();
                return Ok(Response::from_parts(parts, Body::new(body)));
            }

            let (mut parts, body) = response.into_parts();
            let text = match body.collect().await {
                Ok(collected) => String::from_utf8_lossy(&collected.to_bytes()).into_owned(),
                Err(_) => String::new(),
            };

            let envelope = if hide_details || text.trim().is_empty() {
                ErrorResponse::from_status(status)
            } else {
                ErrorResponse::new(text.trim())
            };

            if status.is_server_error() {
                tracing::error!(status = status.as_u16(), exception = %text, "request failed");
            }

            parts.headers.remove(header::CONTENT_LENGTH);
            parts.headers.remove(header::CONTENT_ENCODING);
            parts.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            let mut rewritten = (status, axum::Json(envelope)).into_response();
            *rewritten.headers_mut() = parts.headers;

            Ok(rewritten)
        })
    }
}
