mod fallback;
mod health;
#[cfg(feature = "metrics")]
mod metrics;

pub use fallback::fallback_handler;
pub use health::{health_routes, HEALTH_PATH};
#[cfg(feature = "metrics")]
pub use self::metrics::{metrics_routes, METRICS_PATH};
