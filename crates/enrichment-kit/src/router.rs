//! Router extension trait.

use axum::Router;

use crate::routes::{fallback_handler, health_routes};
use crate::ServerConfig;

/// Chainable server plumbing on top of a plain axum [`Router`].
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::post};
/// use enrichment_kit::{MetricsRegistry, RouterExt};
///
/// let metrics = MetricsRegistry::new()?;
/// Router::new()
///     .route("/enrich", post(enrich))
///     .with_health_check()
///     .with_metrics(metrics)
///     .with_fallback()
///     .with_default_layers(&config)
///     .serve(&config)
///     .await?;
/// ```
pub trait RouterExt: Sized {
    /// Adds the `GET /healthz` liveness probe.
    fn with_health_check(self) -> Self;

    /// Adds a JSON 404 fallback for unmatched routes.
    fn with_fallback(self) -> Self;

    /// Applies the default middleware stack.
    ///
    /// Layers applied (innermost to outermost):
    /// - `CatchPanicLayer` - Converts panics to 500 responses
    /// - `SetRequestIdLayer` / `PropagateRequestIdLayer` - X-Request-Id handling
    /// - `AccessLogLayer` - Request span and response log with latency
    /// - `TimeoutLayer` - Request timeout from config
    /// - `CompressionLayer` - Response compression (feature: `compression`)
    /// - `JsonErrorLayer` - Converts error responses to JSON (outermost)
    fn with_default_layers(self, config: &impl AsRef<ServerConfig>) -> Self;

    /// Adds `GET /metrics` rendering `registry`.
    ///
    /// Handlers record into the same registry through their own timers;
    /// nothing is recorded for the scrape itself.
    #[cfg(feature = "metrics")]
    fn with_metrics(self, registry: crate::MetricsRegistry) -> Self;

    /// Like [`RouterExt::with_metrics`] with a custom scrape path.
    #[cfg(feature = "metrics")]
    fn with_metrics_at(self, path: &str, registry: crate::MetricsRegistry) -> Self;

    /// Serve the router until SIGINT or SIGTERM, draining in-flight requests.
    fn serve(
        self,
        config: &(impl AsRef<ServerConfig> + Sync),
    ) -> impl std::future::Future<Output = Result<(), crate::ServerError>> + Send;
}

impl RouterExt for Router {
    fn with_health_check(self) -> Self {
        self.merge(health_routes())
    }

    fn with_fallback(self) -> Self {
        self.fallback(fallback_handler)
    }

    fn with_default_layers(self, config: &impl AsRef<ServerConfig>) -> Self {
        crate::layer::default_layers(self, config.as_ref())
    }

    #[cfg(feature = "metrics")]
    fn with_metrics(self, registry: crate::MetricsRegistry) -> Self {
        self.with_metrics_at(crate::routes::METRICS_PATH, registry)
    }

    #[cfg(feature = "metrics")]
    fn with_metrics_at(self, path: &str, registry: crate::MetricsRegistry) -> Self {
        self.merge(crate::routes::metrics_routes(path, registry))
    }

    async fn serve(
        self,
        config: &(impl AsRef<ServerConfig> + Sync),
    ) -> Result<(), crate::ServerError> {
        crate::server::serve_router(self, config.as_ref()).await
    }
}
