use thiserror::Error;

/// Top-level error type for the Triage assistant.
#[derive(Debug, Error)]
pub enum TriageError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("{}", format_request_error(.status, .message))]
    Request {
        status: Option<u16>,
        message: String,
    },
}

fn format_request_error(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("completion request failed ({code}): {message}"),
        None => format!("completion request failed: {message}"),
    }
}

impl TriageError {
    /// Transport or API failure without an HTTP status.
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            status: None,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TriageError>;
