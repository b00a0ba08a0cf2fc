//! Service configuration.
//!
//! Sources, later overriding earlier:
//! 1. built-in defaults (per binary)
//! 2. `orderpay.yaml` in the working directory, if present
//! 3. the YAML file named by `ORDERPAY_CONFIG`, if set
//! 4. `ORDERPAY__*` environment variables, e.g. `ORDERPAY__STORE_TIMEOUT_MS=2000`
//! 5. the plain `PORT` and `DATABASE_URL` variables

use std::collections::HashMap;
use std::time::Duration;

use ::config::{Config as ConfigLib, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "orderpay";
pub const CONFIG_ENV_VAR: &str = "ORDERPAY_CONFIG";
pub const CONFIG_ENV_PREFIX: &str = "ORDERPAY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// SQLite URL. Each binary falls back to its own file when unset.
    pub database_url: Option<String>,
    /// Bound on every repository call, and the pool acquire timeout.
    pub store_timeout_ms: u64,
    /// Root of the payment service, used for payment notices.
    pub payment_service_url: String,
    /// Request timeout for one payment notice.
    pub notify_timeout_ms: u64,
    /// Payment notices allowed to wait for delivery; further notices are dropped.
    pub notify_queue_capacity: usize,
    /// Header carrying the already-authenticated user id.
    pub identity_header: String,
    /// Used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: None,
            store_timeout_ms: 5_000,
            payment_service_url: "http://localhost:8081".to_string(),
            notify_timeout_ms: 3_000,
            notify_queue_capacity: 1_024,
            identity_header: "x-user-id".to_string(),
            log_filter: "info,tower_http=debug".to_string(),
        }
    }
}

impl Settings {
    /// Load from every source on top of [`Settings::default`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::default())
    }

    /// Load from every source on top of the given defaults.
    pub fn load_from(defaults: Settings) -> Result<Self, ConfigError> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::from_sources(defaults, &env)
    }

    fn from_sources(defaults: Settings, env: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigLib::builder()
            .add_source(ConfigLib::try_from(&defaults)?)
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(path) = env.get(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(path, FileFormat::Yaml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(CONFIG_ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(Some(env.clone().into_iter().collect())),
        );

        if let Some(port) = env.get("PORT") {
            builder = builder.set_override("port", port.as_str())?;
        }
        if let Some(url) = env.get("DATABASE_URL") {
            builder = builder.set_override("database_url", url.as_str())?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn database_url_or(&self, fallback: &str) -> String {
        self.database_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms)
    }
}
