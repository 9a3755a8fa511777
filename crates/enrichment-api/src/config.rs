//! Service configuration.

use enrichment_kit::{deserialize_number, ConfigBuilder, ConfigError, LogFormat, ServerConfig};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Settings for the enrichment service.
///
/// Every field maps to an upper-case environment variable of the same name
/// (`PORT`, `APP_VERSION`, `ENRICH_DELAY_MS`, ...).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(flatten)]
    pub server: ServerConfig,
    pub app_name: String,
    pub app_version: String,
    /// Simulated downstream latency applied to every successful enrichment.
    #[serde(deserialize_with = "deserialize_number")]
    pub enrich_delay_ms: u64,
    pub log_format: LogFormat,
    /// Filter directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            app_name: "enrichment-api".to_string(),
            app_version: "v1.0.0".to_string(),
            enrich_delay_ms: 100,
            log_format: LogFormat::Json,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `.env`, the file named by `CONFIG_FILE` (if set) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::new().with_dotenv();
        if let Ok(path) = env::var("CONFIG_FILE") {
            builder = builder.with_config_file(path);
        }
        builder.build()
    }

    pub fn enrich_delay(&self) -> Duration {
        Duration::from_millis(self.enrich_delay_ms)
    }
}

impl AsRef<ServerConfig> for AppConfig {
    fn as_ref(&self) -> &ServerConfig {
        &self.server
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests that read the process environment must not interleave.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_match_the_deployment_contract() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.app_version, "v1.0.0");
        assert_eq!(config.enrich_delay(), Duration::from_millis(100));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn file_overrides_defaults() {
        let _env = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enrichment.toml");
        std::fs::write(
            &path,
            r#"
            app_version = "v2.3.4"
            enrich_delay_ms = 50
            log_format = "text"
            request_timeout_secs = 3
            "#,
        )
        .unwrap();

        let config: AppConfig = ConfigBuilder::new().with_config_file(&path).build().unwrap();

        assert_eq!(config.app_version, "v2.3.4");
        assert_eq!(config.enrich_delay(), Duration::from_millis(50));
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.server.request_timeout_secs, 3);
        assert_eq!(config.app_name, "enrichment-api");
    }

    #[test]
    fn environment_overrides_keep_strings_verbatim() {
        let _env = ENV_LOCK.lock().unwrap();
        env::set_var("PORT", "9090");
        env::set_var("APP_VERSION", "1.10");
        env::set_var("ENRICH_DELAY_MS", "75");

        let loaded = AppConfig::load();

        env::remove_var("PORT");
        env::remove_var("APP_VERSION");
        env::remove_var("ENRICH_DELAY_MS");

        let config = loaded.unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.app_version, "1.10");
        assert_eq!(config.enrich_delay(), Duration::from_millis(75));
    }

    #[test]
    fn exposes_server_settings() {
        let config = AppConfig::default();
        let server: &ServerConfig = config.as_ref();
        assert_eq!(server.addr(), "0.0.0.0:8080");
    }
}
