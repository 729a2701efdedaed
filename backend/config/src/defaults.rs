//! Config defaults applied when a variable is unset.

/// Gemini model used when `GEMINI_MODEL` is unset.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Public OCR.space demo keys tried after the primary key.
pub const DEFAULT_OCR_FREE_KEYS: &[&str] = &["helloworld", "K87899142388957"];

pub const DEFAULT_OCR_LANGUAGE: &str = "ger";

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Minimum gap between two commands of one user.
pub const DEFAULT_COOLDOWN_MS: u64 = 3000;
pub const DEFAULT_MAX_ACTIVE_COMMANDS: usize = 3;

pub const DEFAULT_LOG_LEVEL: &str = "info";
