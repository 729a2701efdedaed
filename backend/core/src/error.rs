use thiserror::Error;

use crate::types::LookupQuery;

/// Byte-level image validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("image too large: {size} bytes (max 10 MiB)")]
    TooLarge { size: usize },

    #[error("image too small: {size} bytes (min 1 KiB)")]
    TooSmall { size: usize },

    #[error("unsupported image format, only PNG, JPEG and WEBP are supported")]
    UnsupportedFormat,
}

/// Top-level error type for studybot.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("missing configuration: {0}")]
    ConfigMissing(String),

    #[error("unsupported subject: {0}")]
    UnsupportedSubject(String),

    #[error("no document found for {query}")]
    NotFound {
        query: LookupQuery,
        expected: Vec<String>,
        near_misses: Vec<String>,
    },

    #[error("image validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("provider error ({provider}): {message}")]
    ProviderFailure { provider: String, message: String },

    #[error("all OCR providers failed")]
    ExhaustedFallback,

    #[error("malformed command: {0}")]
    Usage(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BotError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderFailure {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether the end user can act on this error (fix a command, upload a
    /// file, ask the operator for a key) rather than just retry later.
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            Self::ConfigMissing(_)
                | Self::UnsupportedSubject(_)
                | Self::NotFound { .. }
                | Self::ValidationFailed(_)
                | Self::Usage(_)
        )
    }

    /// German message shown in the chat for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::ConfigMissing(what) => {
                format!("❌ {what} ist nicht konfiguriert. Bitte den Bot-Betreiber kontaktieren.")
            }
            Self::UnsupportedSubject(subject) => format!(
                "❌ Fach \"{subject}\" wird nicht unterstützt. Verfügbare Fächer: {}",
                crate::types::Subject::supported_inputs().join(", ")
            ),
            Self::NotFound {
                query,
                expected,
                ..
            } => {
                let mut text = format!(
                    "❌ Datei nicht gefunden für: {} Seite {}\n\nErwartete Dateiformate:",
                    query.subject, query.page
                );
                for pattern in expected {
                    text.push_str(&format!("\n• {pattern}"));
                }
                text.push_str("\n\nStelle sicher, dass die Datei hochgeladen ist.");
                text
            }
            Self::ValidationFailed(err) => match err {
                ValidationError::TooLarge { .. } => "❌ Bild ist zu groß (max. 10MB).".to_string(),
                ValidationError::TooSmall { .. } => "❌ Bild ist zu klein (min. 1KB).".to_string(),
                ValidationError::UnsupportedFormat => {
                    "❌ Nicht unterstütztes Bildformat. Nur PNG, JPEG und WEBP.".to_string()
                }
            },
            Self::ProviderFailure { provider, message } => format!(
                "❌ Problem mit {provider}: {message}. Versuche es in ein paar Minuten nochmal."
            ),
            Self::ExhaustedFallback => {
                "❌ Problem mit der Texterkennung. Versuche ein besseres Bild.".to_string()
            }
            Self::Usage(usage) => usage.clone(),
            Self::Other(_) => "❌ Ein Fehler ist aufgetreten. Versuche es nochmal!".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Subject;

    #[test]
    fn not_found_message_lists_patterns() {
        let err = BotError::NotFound {
            query: LookupQuery::new(Subject::Mathe, "5"),
            expected: vec!["mathe_seite_5.jpg/.png".into()],
            near_misses: vec!["mathe_seite_50.jpg".into()],
        };
        let msg = err.user_message();
        assert!(msg.contains("mathe Seite 5"));
        assert!(msg.contains("mathe_seite_5.jpg/.png"));
        assert!(err.is_user_actionable());
    }

    #[test]
    fn provider_failures_are_not_user_actionable() {
        let err = BotError::provider("OCR.space", "timeout");
        assert!(!err.is_user_actionable());
        assert!(err.to_string().contains("OCR.space"));
    }

    #[test]
    fn validation_errors_convert() {
        let err: BotError = ValidationError::TooSmall { size: 10 }.into();
        assert!(matches!(err, BotError::ValidationFailed(ValidationError::TooSmall { size: 10 })));
    }
}
