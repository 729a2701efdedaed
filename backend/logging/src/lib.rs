//! Structured logging for studybot.
//!
//! Console output, optional daily-rolling NDJSON files, and secret scrubbing
//! for error strings that may echo request URLs or headers.

pub mod logger;
pub mod redact;

pub use logger::init_logger;
pub use redact::redact_sensitive_data;
