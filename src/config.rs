//! Service configuration.
//!
//! Settings come from an optional TOML file and are then overlaid with the
//! environment. The store URI is resolved in this order:
//!
//! 1. `MONGODB_URI`
//! 2. the file named by `MONGODB_SECRET_PATH`: JSON with a
//!    `connection_string` field, or the raw file contents if it is not JSON
//! 3. `[store].uri` from the config file
//! 4. `mongodb://localhost:27017`
//!
//! `PORT` overrides `[server].port`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

pub const MONGODB_URI_ENV: &str = "MONGODB_URI";
pub const MONGODB_SECRET_PATH_ENV: &str = "MONGODB_SECRET_PATH";
pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_STORE_URI: &str = "mongodb://localhost:27017";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: None,
            database: default_database(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_database() -> String {
    "insecurazon".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

impl StoreConfig {
    /// The resolved store URI. Only `None` before [`Config::apply_env`] runs.
    pub fn uri(&self) -> &str {
        self.uri.as_deref().unwrap_or(DEFAULT_STORE_URI)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Shape of the mounted store secret. Other fields in the secret are ignored.
#[derive(Debug, Deserialize)]
struct StoreSecret {
    #[serde(default)]
    connection_string: Option<String>,
}

impl Config {
    /// Overlay environment settings. `env` returns `None` for unset or empty
    /// variables.
    pub fn apply_env(&mut self, env: &dyn Fn(&str) -> Option<String>) -> Result<()> {
        self.store.uri = Some(resolve_store_uri(env, self.store.uri.as_deref()));

        if let Some(port) = env(PORT_ENV) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("{} must be a port number, got '{}'", PORT_ENV, port))?;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.store.timeout_secs == 0 {
            anyhow::bail!("store.timeout_secs must be > 0");
        }
        if self.store.database.trim().is_empty() {
            anyhow::bail!("store.database must not be empty");
        }
        if self.server.host.trim().is_empty() {
            anyhow::bail!("server.host must not be empty");
        }
        Ok(())
    }
}

/// Pick the store URI by precedence: environment, mounted secret, config
/// file, built-in default.
pub fn resolve_store_uri(env: &dyn Fn(&str) -> Option<String>, configured: Option<&str>) -> String {
    if let Some(uri) = env(MONGODB_URI_ENV) {
        debug!("store uri taken from {}", MONGODB_URI_ENV);
        return uri;
    }

    if let Some(path) = env(MONGODB_SECRET_PATH_ENV) {
        match read_secret_uri(Path::new(&path)) {
            Ok(Some(uri)) => {
                debug!(path = %path, "store uri taken from mounted secret");
                return uri;
            }
            Ok(None) => warn!(path = %path, "store secret has no connection string"),
            Err(e) => {
                let reason = format!("{:#}", e);
                warn!(path = %path, error = %reason, "could not read store secret");
            }
        }
    }

    match configured.filter(|uri| !uri.trim().is_empty()) {
        Some(uri) => uri.to_string(),
        None => DEFAULT_STORE_URI.to_string(),
    }
}

fn read_secret_uri(path: &Path) -> Result<Option<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read secret file: {}", path.display()))?;

    let uri = match serde_json::from_str::<StoreSecret>(&raw) {
        Ok(secret) => secret.connection_string.unwrap_or_default(),
        Err(_) => raw,
    };
    let uri = uri.trim();

    Ok((!uri.is_empty()).then(|| uri.to_string()))
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Load the config file (if any), overlay the process environment, and
/// validate the result.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content).with_context(|| "Failed to parse config file")?
        }
        None => Config::default(),
    };

    config.apply_env(&process_env)?;
    config.validate()?;

    Ok(config)
}
