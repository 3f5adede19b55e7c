//! AuthGate configuration.
//!
//! Configuration covers which flows the validation chain runs and in what
//! order, where the service registry lives, what gets audited, and how client
//! secrets are encoded.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::crypto::{DigestAlgorithm, is_supported_encoding};
use crate::oauth::LOWEST_PRECEDENCE;
use crate::types::ResponseType;

/// Root configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [chain]
/// enforce_client_binding = true
///
/// [[chain.flows]]
/// response_type = "code"
/// order = 0
///
/// [[chain.flows]]
/// response_type = "token"
/// enabled = false
///
/// [registry]
/// location = "services.json"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthGateConfig {
    /// Validation chain configuration.
    pub chain: ChainConfig,

    /// Service registry configuration.
    pub registry: RegistryConfig,

    /// Audit configuration.
    pub audit: AuditConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Client secret encoding.
    pub encoder: EncoderConfig,
}

/// Validation chain configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Flows in the chain. Response types not listed here are not handled.
    pub flows: Vec<FlowConfig>,

    /// Require the service resolved from `redirect_uri` to be registered to
    /// the requesting `client_id`.
    pub enforce_client_binding: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            flows: ResponseType::ALL.into_iter().map(FlowConfig::new).collect(),
            enforce_client_binding: false,
        }
    }
}

/// A single flow of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FlowConfig {
    /// Response type the flow handles.
    pub response_type: ResponseType,

    /// Whether the flow takes part in dispatch.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Precedence. Lower values are consulted first.
    #[serde(default = "default_order")]
    pub order: i32,
}

impl FlowConfig {
    /// An enabled flow at the lowest precedence.
    #[must_use]
    pub fn new(response_type: ResponseType) -> Self {
        Self {
            response_type,
            enabled: true,
            order: LOWEST_PRECEDENCE,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_order() -> i32 {
    LOWEST_PRECEDENCE
}

/// Service registry configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Path of a JSON file holding an array of registered services.
    pub location: Option<String>,
}

/// Audit configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Record every access strategy decision.
    pub log_access_decisions: bool,

    /// Record every admit/deny verdict of the chain.
    pub log_verdicts: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_access_decisions: true,
            log_verdicts: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level or `EnvFilter` directive.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Client secret encoding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Digest algorithm name, e.g. `SHA-256`.
    pub algorithm: String,

    /// Character encoding of secrets.
    pub character_encoding: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            algorithm: DigestAlgorithm::Sha256.as_str().to_string(),
            character_encoding: "UTF-8".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    Missing(String),

    #[error("Failed to load configuration: {0}")]
    Load(String),
}

impl AuthGateConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - A response type appears in more than one flow
    /// - The digest algorithm is unknown
    /// - The character encoding is not UTF-8
    /// - The log level is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for flow in &self.chain.flows {
            if !seen.insert(flow.response_type) {
                return Err(ConfigError::InvalidValue(format!(
                    "response type '{}' is configured more than once",
                    flow.response_type
                )));
            }
        }

        if DigestAlgorithm::parse(&self.encoder.algorithm).is_none() {
            return Err(ConfigError::InvalidValue(format!(
                "unknown digest algorithm '{}'",
                self.encoder.algorithm
            )));
        }

        if !is_supported_encoding(&self.encoder.character_encoding) {
            return Err(ConfigError::InvalidValue(format!(
                "unsupported character encoding '{}'",
                self.encoder.character_encoding
            )));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "logging.level cannot be empty".to_string(),
            ));
        }

        if self.chain.flows.iter().all(|flow| !flow.enabled) {
            tracing::warn!("Every flow is disabled; all authorization requests will be denied");
        }

        Ok(())
    }
}

pub mod loader {
    //! Layered configuration loading.

    use super::{AuthGateConfig, ConfigError};
    use config::{Config, Environment, File};
    use std::path::{Path, PathBuf};

    /// Default configuration file, looked up in the working directory.
    pub const DEFAULT_CONFIG_FILE: &str = "authgate.toml";

    /// Prefix of environment variable overrides.
    pub const ENV_PREFIX: &str = "AUTHGATE";

    /// Loads configuration from a TOML file and the environment.
    ///
    /// A missing file is skipped. Environment variables override file values,
    /// e.g. `AUTHGATE__LOGGING__LEVEL=debug`.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the merged
    /// configuration does not validate.
    pub fn load_config(path: Option<&Path>) -> Result<AuthGateConfig, ConfigError> {
        let mut builder = Config::builder();
        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if file.exists() {
            builder = builder.add_source(File::from(file));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .try_parsing(true)
                .separator("__"),
        );

        let cfg = builder
            .build()
            .map_err(|e| ConfigError::Load(format!("config build error: {e}")))?;
        let merged: AuthGateConfig = cfg
            .try_deserialize()
            .map_err(|e| ConfigError::Load(format!("config deserialize error: {e}")))?;

        merged.validate()?;
        Ok(merged)
    }
}
