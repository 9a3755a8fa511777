use enrichment_kit::{MetricsError, MetricsRegistry};
use std::sync::Arc;

use crate::config::AppConfig;

/// Shared per-process state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub metrics: MetricsRegistry,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, MetricsError> {
        Ok(Self {
            config: Arc::new(config),
            metrics: MetricsRegistry::new()?,
        })
    }
}
