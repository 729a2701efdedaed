//! Config validation: startup checks with operator-friendly messages.

use thiserror::Error;

use crate::schema::BotConfig;

/// A config finding with the variable it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{var}: {message}")]
pub struct ConfigValidationError {
    pub var: &'static str,
    pub message: String,
}

/// A collection of validation findings from one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, var: &'static str, message: impl Into<String>) {
        self.errors.push(ConfigValidationError { var, message: message.into() });
    }

    fn warn(&mut self, var: &'static str, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError { var, message: message.into() });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &BotConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.discord.token.is_none() {
        report.warn("DISCORD_TOKEN", "not set; `serve` cannot connect to Discord");
    }
    if config.gemini.api_key.is_none() {
        report.warn("GEMINI_API_KEY", "not set; .ha, .lsg, .ai and .a will answer with a config error");
    }
    if config.ocr.api_key.is_none() {
        report.warn("OCR_API_KEY", "not set; OCR uses free-tier keys only");
    }
    if config.storage.mega_credentials().is_none() {
        let fallback = match &config.storage.dir {
            Some(_) => "using STORAGE_DIR instead",
            None => ".lsg and .material are unavailable",
        };
        report.warn("MEGA_EMAIL", format!("MEGA_EMAIL/MEGA_PASSWORD not set; {fallback}"));
        if let Some(dir) = &config.storage.dir {
            if !dir.is_dir() {
                report.warn("STORAGE_DIR", format!("{} is not a directory", dir.display()));
            }
        }
    }

    if config.gate.max_active_commands == 0 {
        report.error("MAX_ACTIVE_COMMANDS", "must be at least 1, otherwise no command is ever admitted");
    }
    if config.server.port == 0 {
        report.error("PORT", "must not be 0");
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_warn_about_missing_credentials() {
        let report = validate(&BotConfig::default());
        assert!(report.is_valid());
        let vars: Vec<_> = report.warnings.iter().map(|w| w.var).collect();
        assert_eq!(vars, vec!["DISCORD_TOKEN", "GEMINI_API_KEY", "OCR_API_KEY", "MEGA_EMAIL"]);
    }

    #[test]
    fn zero_active_commands_is_an_error() {
        let mut config = BotConfig::default();
        config.gate.max_active_commands = 0;
        let report = validate(&config);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].var, "MAX_ACTIVE_COMMANDS");
    }

    #[test]
    fn missing_storage_directory_is_flagged() {
        let mut config = BotConfig::default();
        config.storage.dir = Some("/definitely/not/here".into());
        let report = validate(&config);
        assert!(report.warnings.iter().any(|w| w.message.contains("not a directory")));
    }

    #[test]
    fn mega_login_silences_storage_warnings() {
        let mut config = BotConfig::default();
        config.storage.mega_email = Some("schule@example.org".into());
        config.storage.mega_password = Some("geheim".into());
        let report = validate(&config);
        assert!(report.warnings.iter().all(|w| w.var != "MEGA_EMAIL" && w.var != "STORAGE_DIR"));
    }
}
