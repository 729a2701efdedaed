//! Studybot runtime configuration schema.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::defaults::*;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    pub discord: DiscordConfig,
    pub gemini: GeminiConfig,
    pub ocr: OcrConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
    pub gate: GateConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Only messages from this channel are answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_channel_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self { api_key: None, model: DEFAULT_GEMINI_MODEL.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub free_keys: Vec<String>,
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            free_keys: DEFAULT_OCR_FREE_KEYS.iter().map(|k| k.to_string()).collect(),
            language: DEFAULT_OCR_LANGUAGE.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding book pages, material sheets and `ha.jpg`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mega_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mega_password: Option<String>,
}

impl StorageConfig {
    /// MEGA login, when both halves are set.
    pub fn mega_credentials(&self) -> Option<(&str, &str)> {
        Some((self.mega_email.as_deref()?, self.mega_password.as_deref()?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: DEFAULT_BIND_ADDRESS.into(), port: DEFAULT_PORT }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    pub cooldown_ms: u64,
    pub max_active_commands: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self { cooldown_ms: DEFAULT_COOLDOWN_MS, max_active_commands: DEFAULT_MAX_ACTIVE_COMMANDS }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Daily-rolling JSON log files go here when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.into(), dir: None }
    }
}
