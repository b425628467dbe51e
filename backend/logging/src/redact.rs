//! Log Redaction
//!
//! Scrubs API keys and bearer tokens from strings before they are logged or shown.

use regex::Regex;
use std::sync::LazyLock;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(gsk_[a-zA-Z0-9]{16,})|(sk-[a-zA-Z0-9_\-]{20,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)")
        .expect("static redaction pattern is valid")
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    API_KEY_RE.replace_all(input, "[REDACTED_TOKEN]").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_groq_keys_and_bearer_tokens() {
        let raw = "Invalid API Key: gsk_abcdEFGH1234ijklMNOP5678 sent with Bearer eyJhbGciOiJIUzI1NiJ9.x";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("gsk_abcdEFGH1234ijklMNOP5678"));
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiJ9"));
        assert!(clean.starts_with("Invalid API Key: [REDACTED_TOKEN]"));
    }

    #[test]
    fn leaves_ordinary_text_alone() {
        let raw = "INC-1042 database failover at 2024-03-01 12:00";
        assert_eq!(redact_sensitive_data(raw), raw);
    }
}
