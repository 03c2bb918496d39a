//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `webthing.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;
use webthing_adapter_virtual::VirtualThings;
use webthing_app::config::RuntimeConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Thing runtime knobs.
    pub runtime: RuntimeConfig,
    /// Which demo Things to serve.
    pub things: ThingsConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Demo Thing toggles.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ThingsConfig {
    pub lamp: bool,
    pub thermostat: bool,
    pub sensor: bool,
    /// Period of simulated sensor readings; `0` disables the simulation.
    pub sensor_period_ms: u64,
}

impl Config {
    /// Load configuration from `webthing.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("webthing.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("WEBTHING_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("WEBTHING_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("WEBTHING_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("WEBTHING_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = self.runtime.problems();
        if self.server.port == 0 {
            problems.insert(0, "port must be non-zero".to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(problems.join(", ")))
        }
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the demo Things selection.
    #[must_use]
    pub fn virtual_things(&self) -> VirtualThings {
        VirtualThings {
            lamp: self.things.lamp,
            thermostat: self.things.thermostat,
            sensor: self.things.sensor,
            sensor_period: (self.things.sensor_period_ms > 0)
                .then(|| Duration::from_millis(self.things.sensor_period_ms)),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8888,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "webthingd=info,webthing_app=info,webthing_adapter_virtual=info,tower_http=debug"
                .to_string(),
        }
    }
}

impl Default for ThingsConfig {
    fn default() -> Self {
        Self {
            lamp: true,
            thermostat: true,
            sensor: true,
            sensor_period_ms: 5000,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
