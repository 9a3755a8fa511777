//! # enrichment-kit
//!
//! Thin plumbing for axum services: layered configuration, JSON-line
//! logging, an injectable Prometheus registry, a JSON error envelope and a
//! default middleware stack.
//!
//! ## Features
//!
//! - `tracing` - logging initialization and the JSON line event format
//! - `compression` - response compression in the default layers
//! - `metrics` - [`MetricsRegistry`] and the `/metrics` route

mod config;
mod environment;
mod error;
mod layer;
mod logging;
#[cfg(feature = "metrics")]
mod metrics;
mod router;
mod routes;
mod server;

pub use axum::http::StatusCode;
pub use self::config::{
    deserialize_number, load_config_file, load_from_env, ConfigBuilder, ConfigError,
    ConfigFormat, ServerConfig,
};
pub use environment::Environment;
pub use error::{ErrorResponse, HttpError};
pub use layer::{AccessLogLayer, JsonErrorLayer};
pub use logging::LogFormat;
#[cfg(feature = "tracing")]
pub use logging::{JsonLineFormat, Logging};
#[cfg(feature = "metrics")]
pub use self::metrics::{
    MetricsError, MetricsRegistry, RequestTimer, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION_SECONDS, PROMETHEUS_CONTENT_TYPE,
};
pub use router::RouterExt;
pub use routes::{fallback_handler, health_routes, HEALTH_PATH};
#[cfg(feature = "metrics")]
pub use routes::{metrics_routes, METRICS_PATH};
pub use server::ServerError;
