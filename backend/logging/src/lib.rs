//! Structured logging for Triage.
//!
//! Handles subscriber setup (console and rolling NDJSON file) and secret redaction.

pub mod logger;
pub mod redact;

pub use logger::{LogOutput, init_logger};
pub use redact::redact_sensitive_data;
