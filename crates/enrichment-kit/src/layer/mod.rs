mod json_error;
mod trace;

use axum::http::StatusCode;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;

#[cfg(feature = "compression")]
use tower_http::compression::CompressionLayer;

use crate::ServerConfig;

pub use json_error::JsonErrorLayer;
pub use trace::AccessLogLayer;

/// Applies the default middleware stack to a router.
pub(crate) fn default_layers(router: Router, config: &ServerConfig) -> Router {
    // Responses travel outward:
    //   handler -> CatchPanic -> RequestId -> AccessLog -> Timeout -> JsonError -> Compression
    // JsonError sits outside Timeout and CatchPanic so it rewrites their responses,
    // and inside Compression so it only ever reads plain bodies.
    let router = router
        .layer(CatchPanicLayer::new())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(AccessLogLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout(),
        ))
        .layer(JsonErrorLayer::new(config.environment));

    #[cfg(feature = "compression")]
    let router = router.layer(CompressionLayer::new());

    router
}
