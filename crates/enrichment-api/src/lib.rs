//! Mock transaction enrichment service.
//!
//! Routes:
//! - `GET /` greeting and version
//! - `GET /healthz` liveness probe
//! - `POST /enrich` echoes `transactionId` after a simulated delay
//! - `GET /metrics` Prometheus exposition

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
