//! Layered process configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. an optional YAML file
//! 3. `EDGE_REGISTRY__` variables, `__` separating nested keys
//!    (`EDGE_REGISTRY__HEALTH__INTERVAL=10s`)
//! 4. the flat `EDGE_DEVICE_REGISTRY_AUTH_MODE`, `EDGE_DEVICE_REGISTRY_API_KEY`
//!    and `EDGE_DEVICE_REGISTRY_ALLOWED_API_KEYS` variables
//! 5. command-line overrides

use crate::access::AuthConfig;
use crate::device::adapters::http::HttpProberConfig;
use crate::device::services::{DiscoveryConfig, HealthMonitorConfig};
use camino::Utf8PathBuf;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::Deserialize;
use std::net::{Ipv4Addr, SocketAddr};
use thiserror::Error;

/// Prefix of the nested environment variables.
pub const ENV_PREFIX: &str = "EDGE_REGISTRY__";

const LEGACY_ENV_PREFIX: &str = "EDGE_DEVICE_REGISTRY_";
const LEGACY_AUTH_KEYS: [&str; 3] = ["auth_mode", "api_key", "allowed_api_keys"];

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly named configuration file does not exist.
    #[error("configuration file {0} does not exist")]
    MissingFile(Utf8PathBuf),
    /// A source could not be read or did not match the expected shape.
    #[error("invalid configuration: {0}")]
    Invalid(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Invalid(Box::new(err))
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8082)),
        }
    }
}

/// Device store settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Registry file.
    pub path: Utf8PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: Utf8PathBuf::from("devices.json"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::default(),
        }
    }
}

/// Complete process configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener.
    pub server: ServerConfig,
    /// Device store.
    pub store: StoreConfig,
    /// Discovery coordinator.
    pub discovery: DiscoveryConfig,
    /// Network prober.
    pub prober: HttpProberConfig,
    /// Health monitor.
    pub health: HealthMonitorConfig,
    /// Access gate.
    pub auth: AuthConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// YAML file to read.
    pub config_path: Option<Utf8PathBuf>,
    /// Listen address.
    pub bind_addr: Option<SocketAddr>,
}

impl AppConfig {
    /// Assembles the layered figment without extracting it.
    #[must_use]
    pub fn figment(overrides: &ConfigOverrides) -> Figment {
        let mut figment = Figment::new();
        if let Some(path) = &overrides.config_path {
            figment = figment.merge(Yaml::file(path.as_std_path()));
        }
        figment = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(legacy_auth_env());
        if let Some(bind_addr) = overrides.bind_addr {
            figment = figment.merge(Serialized::default("server.bind_addr", bind_addr));
        }
        figment
    }

    /// Loads configuration from every source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFile`] when `config_path` names a file
    /// that does not exist, and [`ConfigError::Invalid`] when a source is
    /// unreadable or a value is malformed.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(path) = overrides
            .config_path
            .as_ref()
            .filter(|path| !path.exists())
        {
            return Err(ConfigError::MissingFile(path.clone()));
        }
        Ok(Self::figment(overrides).extract()?)
    }
}

fn legacy_auth_env() -> Env {
    Env::prefixed(LEGACY_ENV_PREFIX)
        .only(&LEGACY_AUTH_KEYS)
        .map(|key| match key.as_str() {
            "auth_mode" => "auth.mode".into(),
            other => format!("auth.{other}").into(),
        })
}
