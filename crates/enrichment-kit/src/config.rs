//! Configuration loading.
//!
//! Sources are layered lowest to highest: `.env` files, one structured config
//! file (toml, yaml or json), then process environment variables. Nested keys
//! use `__` as separator in the environment (`SERVER__PORT`).

use serde::de::{self, DeserializeOwned, Unexpected, Visitor};
use serde::{Deserialize, Deserializer};
use std::env;
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::Environment;

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Configuration file not found.
    NotFound(PathBuf),
    /// Failed to parse or deserialize configuration.
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "Config file not found: {}", path.display()),
            Self::Parse(msg) => write!(f, "Failed to parse config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Supported config file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    DotEnv,
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let file_name = path.file_name()?.to_str()?;
        if file_name.starts_with(".env") {
            return Some(Self::DotEnv);
        }

        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "env" => Some(Self::DotEnv),
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Listener settings shared by every service built on this crate.
///
/// Embed it with `#[serde(flatten)]` so `PORT`, `HOST` and friends stay
/// top-level environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub environment: Environment,
    pub host: String,
    #[serde(deserialize_with = "deserialize_number")]
    pub port: u16,
    #[serde(deserialize_with = "deserialize_number")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AsRef<ServerConfig> for ServerConfig {
    fn as_ref(&self) -> &ServerConfig {
        self
    }
}

/// Reads an unsigned integer given either natively or as a string.
///
/// Environment values are never number-parsed, so string settings such as
/// `APP_VERSION=1.10` survive intact. Numeric fields of a struct that uses
/// `#[serde(flatten)]` receive those raw strings and need this helper.
pub fn deserialize_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + TryFrom<u64>,
    <T as FromStr>::Err: fmt::Display,
{
    deserializer.deserialize_any(NumberVisitor(PhantomData))
}

struct NumberVisitor<T>(PhantomData<T>);

impl<'de, T> Visitor<'de> for NumberVisitor<T>
where
    T: FromStr + TryFrom<u64>,
    <T as FromStr>::Err: fmt::Display,
{
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an unsigned integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
        T::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
        u64::try_from(v)
            .ok()
            .and_then(|v| T::try_from(v).ok())
            .ok_or_else(|| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
        v.trim()
            .parse()
            .map_err(|e| E::custom(format!("invalid number {v:?}: {e}")))
    }
}

/// Configuration builder.
///
/// # Example
///
/// ```ignore
/// use enrichment_kit::ConfigBuilder;
///
/// let config: AppConfig = ConfigBuilder::new()
///     .with_dotenv()
///     .with_config_file("config.toml")
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    load_default_dotenv: bool,
    config_files: Vec<PathBuf>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load environment variables from `.env` in the current directory, if present.
    pub fn with_dotenv(mut self) -> Self {
        self.load_default_dotenv = true;
        self
    }

    /// Add a configuration file.
    ///
    /// `.env`-style files are all loaded into the process environment;
    /// for structured files the last one added wins.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_files.push(path.into());
        self
    }

    pub fn build<C: DeserializeOwned>(self) -> Result<C, ConfigError> {
        if self.load_default_dotenv {
            let _ = dotenvy::dotenv();
        }

        let mut main_config_file = None;
        for path in self.config_files {
            match ConfigFormat::from_path(&path) {
                Some(ConfigFormat::DotEnv) => {
                    if path.exists() {
                        dotenvy::from_path(&path).map_err(|e| ConfigError::Parse(e.to_string()))?;
                    }
                }
                Some(_) => main_config_file = Some(path),
                None => {
                    return Err(ConfigError::Parse(format!(
                        "unsupported config format: {}",
                        path.display()
                    )))
                }
            }
        }

        match main_config_file {
            Some(path) => load_config_file(&path),
            None => load_from_env(),
        }
    }
}

/// Load config from environment variables only.
pub fn load_from_env<C: DeserializeOwned>() -> Result<C, ConfigError> {
    config::Config::builder()
        .add_source(EnvSource)
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Load config from a file, with environment variables taking precedence.
pub fn load_config_file<C: DeserializeOwned>(path: &Path) -> Result<C, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(EnvSource)
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Process environment, with `ENVIRONMENT`/`APP_ENV`/`RUST_ENV` folded into `environment`.
#[derive(Debug, Clone)]
struct EnvSource;

impl config::Source for EnvSource {
    fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        use config::{Value, ValueKind};

        let mut map = config::Environment::default().separator("__").collect()?;

        if !map.contains_key("environment") {
            if let Ok(val) = env::var("APP_ENV").or_else(|_| env::var("RUST_ENV")) {
                map.insert(
                    "environment".to_string(),
                    Value::new(None, ValueKind::String(val)),
                );
            }
        }

        Ok(map)
    }
}
