//! `studybot-config`: runtime configuration from environment variables.
//!
//! Provides:
//! - Typed config schema with defaults
//! - Environment loading (`from_env`, or `from_lookup` for tests)
//! - Redacted snapshots for safe startup logging
//! - Startup validation (missing credentials, impossible limits)

pub mod defaults;
pub mod env;
pub mod redact;
pub mod schema;
pub mod validation;

pub use redact::{mask, redact};
pub use schema::{
    BotConfig, DiscordConfig, GateConfig, GeminiConfig, LoggingConfig, OcrConfig, ServerConfig, StorageConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid { var: &'static str, value: String, reason: String },
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        env::from_env()
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        env::from_lookup(lookup)
    }

    /// JSON snapshot with every secret masked.
    pub fn redacted(&self) -> serde_json::Value {
        serde_json::to_value(self).map(|v| redact(&v)).unwrap_or_default()
    }

    /// Non-fatal findings, for the startup log.
    pub fn warnings(&self) -> Vec<ConfigValidationError> {
        validate(self).warnings
    }

    pub fn require_discord_token(&self) -> Result<&str, ConfigError> {
        self.discord.token.as_deref().ok_or(ConfigError::Missing("DISCORD_TOKEN"))
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.server.bind_address, self.server.port);
        raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            var: "BIND_ADDRESS",
            value: self.server.bind_address.clone(),
            reason: e.to_string(),
        })
    }
}
