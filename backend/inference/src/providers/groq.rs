use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use triage_core::{CompletionClient, CompletionRequest, FragmentStream, Result, TriageError};
use triage_logging::redact_sensitive_data;

use crate::sse::{decode_sse, extract_api_error_message};

/// Groq's OpenAI-compatible API root.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Streamed chat completions against Groq (or any OpenAI-compatible endpoint).
pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GroqClient {
    /// Fails with `TriageError::Auth` when the key is blank, before any request is made.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TriageError::Auth("API key is empty".to_string()));
        }
        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> ChatRequest<'a> {
    fn streamed(request: &'a CompletionRequest) -> Self {
        Self {
            model: request.model.as_str(),
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            stream: true,
        }
    }
}

/// Map a non-success HTTP response to the error taxonomy.
fn status_error(status: StatusCode, body: &str) -> TriageError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| extract_api_error_message(&json))
        .unwrap_or_else(|| body.trim().to_string());
    let message = redact_sensitive_data(&message);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            TriageError::Auth(format!("endpoint rejected the API key ({status}): {message}"))
        }
        _ => TriageError::Request {
            status: Some(status.as_u16()),
            message,
        },
    }
}

#[async_trait]
impl CompletionClient for GroqClient {
    fn name(&self) -> &str {
        "groq"
    }

    async fn stream_completion(&self, request: &CompletionRequest) -> Result<FragmentStream> {
        let body = ChatRequest::streamed(request);

        debug!(
            model = %request.model,
            prompt_chars = request.user_prompt.len(),
            context_chars = request.system_prompt.len(),
            "Opening streamed completion"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                TriageError::request(redact_sensitive_data(&format!("HTTP request failed: {e}")))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let err = status_error(status, &error_body);
            warn!(status = status.as_u16(), error = %err, "Completion endpoint returned an error");
            return Err(err);
        }

        Ok(decode_sse(response.bytes_stream()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::ModelId;

    #[test]
    fn blank_key_fails_before_any_request() {
        assert!(matches!(GroqClient::new("  "), Err(TriageError::Auth(_))));
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = GroqClient::new("gsk_test")
            .unwrap()
            .with_base_url("http://localhost:9000/v1/");
        assert_eq!(client.base_url(), "http://localhost:9000/v1");
    }

    #[test]
    fn request_body_has_exactly_system_and_user() {
        let request = CompletionRequest {
            model: ModelId::Llama31_8bInstant,
            system_prompt: "sys".into(),
            user_prompt: "Analyze the database outage".into(),
        };
        let json = serde_json::to_value(ChatRequest::streamed(&request)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "llama-3.1-8b-instant",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "Analyze the database outage"}
                ],
                "stream": true
            })
        );
    }

    #[test]
    fn unauthorized_maps_to_auth_error() {
        let body = r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#;
        let err = status_error(StatusCode::UNAUTHORIZED, body);
        assert!(matches!(err, TriageError::Auth(ref m) if m.contains("Invalid API Key")));
    }

    #[test]
    fn rate_limit_maps_to_request_error_with_status() {
        let err = status_error(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(matches!(
            err,
            TriageError::Request { status: Some(429), ref message } if message == "slow down"
        ));
    }
}
