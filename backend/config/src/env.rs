//! Load [`BotConfig`] from environment variables.
//!
//! Unset, blank and sample values (`your_..._here`) count as missing.
//! Numbers that do not parse are reported, not defaulted.

use std::path::PathBuf;
use std::str::FromStr;

use crate::schema::BotConfig;
use crate::ConfigError;

/// Read a variable, treating blank and sample values as unset.
fn lookup_var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !is_sample_value(v))
}

/// Values copied verbatim from a `.env.example`.
pub fn is_sample_value(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("your_") && lower.ends_with("_here")
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup_var(lookup, name) else {
        return Ok(None);
    };
    raw.parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::Invalid { var: name, value: raw, reason: e.to_string() })
}

/// Comma-separated list, empty entries dropped.
fn list_var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<Vec<String>> {
    lookup_var(lookup, name).map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    })
}

/// Build a config from any variable source.
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<BotConfig, ConfigError> {
    let mut config = BotConfig::default();

    config.discord.token = lookup_var(&lookup, "DISCORD_TOKEN");
    config.discord.allowed_channel_id = lookup_var(&lookup, "ALLOWED_CHANNEL_ID");

    config.gemini.api_key = lookup_var(&lookup, "GEMINI_API_KEY");
    if let Some(model) = lookup_var(&lookup, "GEMINI_MODEL") {
        config.gemini.model = model;
    }

    config.ocr.api_key = lookup_var(&lookup, "OCR_API_KEY");
    if let Some(keys) = list_var(&lookup, "OCR_FREE_KEYS") {
        config.ocr.free_keys = keys;
    }
    if let Some(language) = lookup_var(&lookup, "OCR_LANGUAGE") {
        config.ocr.language = language;
    }

    config.storage.dir = lookup_var(&lookup, "STORAGE_DIR").map(PathBuf::from);
    config.storage.mega_email = lookup_var(&lookup, "MEGA_EMAIL");
    config.storage.mega_password = lookup_var(&lookup, "MEGA_PASSWORD");

    if let Some(bind) = lookup_var(&lookup, "BIND_ADDRESS") {
        config.server.bind_address = bind;
    }
    if let Some(port) = parse_var(&lookup, "PORT")? {
        config.server.port = port;
    }

    if let Some(cooldown) = parse_var(&lookup, "COOLDOWN_MS")? {
        config.gate.cooldown_ms = cooldown;
    }
    if let Some(max) = parse_var(&lookup, "MAX_ACTIVE_COMMANDS")? {
        config.gate.max_active_commands = max;
    }

    if let Some(level) = lookup_var(&lookup, "LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.dir = lookup_var(&lookup, "LOG_DIR").map(PathBuf::from);

    Ok(config)
}

/// Build a config from the process environment.
pub fn from_env() -> Result<BotConfig, ConfigError> {
    from_lookup(|name| std::env::var(name).ok())
}
