//! Configuration management for the KMS emulator
//!
//! Values come from `KMS_EMULATOR_*` environment variables (optionally loaded
//! from a `.env` file), layered over built-in defaults.

use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

const ENV_PREFIX: &str = "KMS_EMULATOR";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Console,
}

/// Authorization mode for the external permission check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IamMode {
    /// No permission checks
    #[default]
    Off,
    /// Fail-open: check errors and missing principals are allowed
    Permissive,
    /// Fail-closed: check errors and missing principals are denied
    Strict,
}

/// Emulator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmulatorConfig {
    pub host: String,
    /// HTTP gateway port
    pub port: u16,
    /// gRPC port
    pub grpc_port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub iam_mode: IamMode,
    /// Base URL of the IAM service, required unless `iam_mode` is `off`
    pub iam_host: Option<String>,
    /// Validate version state transitions (false accepts any state change)
    pub strict_transitions: bool,
}

impl EmulatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        Self::build(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    /// Load configuration from an explicit variable map (full names, e.g.
    /// `KMS_EMULATOR_PORT`)
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::build(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(Some(vars.into_iter().collect())),
        )
    }

    fn build(environment: config::Environment) -> Result<Self, ConfigError> {
        let config: Self = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("grpc_port", 9090)?
            .set_default("log_level", "info")?
            .set_default("log_format", "console")?
            .set_default("iam_mode", "off")?
            .set_default("strict_transitions", true)?
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.iam_mode != IamMode::Off && self.iam_host.is_none() {
            return Err(ConfigError::Invalid(format!(
                "{}_IAM_HOST is required when IAM mode is {:?}",
                ENV_PREFIX, self.iam_mode
            )));
        }
        Ok(())
    }

    /// Socket address to bind the HTTP gateway to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Socket address to bind the gRPC server to
    pub fn grpc_addr(&self) -> String {
        format!("{}:{}", self.host, self.grpc_port)
    }

    /// Get log level, defaulting to "info"
    pub fn log_level(&self) -> &str {
        if self.log_level.is_empty() {
            "info"
        } else {
            &self.log_level
        }
    }
}
