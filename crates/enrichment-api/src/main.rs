use enrichment_api::{router, AppConfig, AppState};
use enrichment_kit::{Logging, RouterExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    Logging::new(&config.app_name, &config.app_version)
        .format(config.log_format)
        .filter(&config.log_level)
        .init();

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        version = %config.app_version,
        enrich_delay_ms = config.enrich_delay_ms,
        "starting enrichment service"
    );

    let state = AppState::new(config)?;
    let config = state.config.clone();

    router(state).serve(&*config).await?;

    Ok(())
}
