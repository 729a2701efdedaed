//! Log Redaction
//!
//! Scrubs Google API keys, `key=` query parameters, bearer tokens and Discord
//! bot tokens from strings prior to logging.

use std::sync::LazyLock;

use regex::Regex;

static GOOGLE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"AIza[0-9A-Za-z\-_]{30,}").expect("static regex"));
static KEY_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b((?:api)?key=)[^&\s]+").expect("static regex"));
static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").expect("static regex"));
static DISCORD_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9_\-]{23,28}\.[A-Za-z0-9_\-]{6,7}\.[A-Za-z0-9_\-]{27,}").expect("static regex")
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = GOOGLE_KEY_RE.replace_all(input, "[REDACTED_KEY]");
    let redacted = KEY_PARAM_RE.replace_all(&redacted, "${1}[REDACTED]");
    let redacted = BEARER_RE.replace_all(&redacted, "[REDACTED_TOKEN]");
    DISCORD_TOKEN_RE.replace_all(&redacted, "[REDACTED_TOKEN]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrubs_google_keys_and_query_params() {
        let raw = "request to https://example.com/v1?key=K87899142388957&x=1 failed, key AIzaSyA1b2C3d4E5f6G7h8I9j0KlMnOpQrStUv";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("K87899142388957"));
        assert!(!clean.contains("AIzaSyA1b2C3"));
        assert!(clean.contains("key=[REDACTED]&x=1"));
    }

    #[test]
    fn scrubs_bearer_and_discord_tokens() {
        let raw = "Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9 and MTAxMjM0NTY3ODkwMTIzNDU2.GhIjKl.abcdefghijklmnopqrstuvwxyz0123";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("eyJhbGci"));
        assert!(!clean.contains("GhIjKl"));
    }

    #[test]
    fn leaves_plain_text_alone() {
        let raw = "Datei nicht gefunden: mathe_seite_5.jpg";
        assert_eq!(redact_sensitive_data(raw), raw);
    }
}
