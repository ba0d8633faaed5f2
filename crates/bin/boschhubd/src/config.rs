//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `boschhub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::collections::HashSet;

use boschhub_adapter_bosch::BoschConfig;
use boschhub_adapter_virtual::VirtualGatewayConfig;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Bosch integration settings.
    pub bosch: BoschConfig,
    /// Simulated gateway served to the Bosch integration.
    pub gateway: VirtualGatewayConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `boschhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("boschhub.toml")?;
        config.apply_env_overrides();
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

    fn apply_env_overrides(&mut self) {
        if let Some(secs) = std::env::var("BOSCHHUB_UPDATE_INTERVAL_SECS")
            .ok()
            .and_then(|val| val.parse().ok())
        {
            self.bosch.update_interval_secs = secs;
        }
        if let Ok(val) = std::env::var("BOSCHHUB_GATEWAY_UUID") {
            self.gateway.uuid = val;
        }
        if let Ok(val) = std::env::var("BOSCHHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bosch.update_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "bosch.update_interval_secs must be non-zero".to_string(),
            ));
        }
        if self.gateway.uuid.is_empty() {
            return Err(ConfigError::Validation(
                "gateway.uuid must not be empty".to_string(),
            ));
        }
        let mut names = HashSet::new();
        for circuit in &self.gateway.circuits {
            if circuit.name.is_empty() {
                return Err(ConfigError::Validation(
                    "gateway circuit name must not be empty".to_string(),
                ));
            }
            if !names.insert(circuit.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate gateway circuit {}",
                    circuit.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "boschhubd=info,boschhub=info".to_string(),
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
