//! Decodes an OpenAI-compatible chat-completion SSE body into text fragments.

use std::fmt::Display;

use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, trace, warn};

use triage_core::{FragmentStream, Result, TriageError};

const CHAT_COMPLETION_CHUNK_OBJECT: &str = "chat.completion.chunk";
const DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Deserialize)]
struct ChunkData {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

/// What a single SSE `data:` payload means for the fragment stream.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Fragment(String),
    Skip,
    Done,
}

fn is_chat_completion_chunk(event_json: &Value) -> bool {
    matches!(
        event_json.get("object").and_then(|value| value.as_str()),
        Some(CHAT_COMPLETION_CHUNK_OBJECT)
    )
}

/// Message of an `error` payload, in either object or string shape.
pub(crate) fn extract_api_error_message(event_json: &Value) -> Option<String> {
    let error = event_json.get("error")?;
    if let Some(message) = error.get("message").and_then(|value| value.as_str()) {
        return Some(message.to_string());
    }
    if let Some(message) = error.as_str() {
        return Some(message.to_string());
    }
    Some("an error occurred during streaming".to_string())
}

fn decode_event(raw: &str) -> Result<Step> {
    trace!("Completion SSE: {:?}", raw);
    if raw.trim() == DONE_MARKER {
        return Ok(Step::Done);
    }

    let event_json: Value = serde_json::from_str(raw)
        .map_err(|e| TriageError::request(format!("malformed SSE chunk: {e}")))?;

    if let Some(message) = extract_api_error_message(&event_json) {
        return Err(TriageError::request(format!("API error: {message}")));
    }

    if !is_chat_completion_chunk(&event_json) {
        warn!(
            "Skipping non-standard SSE event; object={}",
            event_json
                .get("object")
                .and_then(|value| value.as_str())
                .unwrap_or("<missing>")
        );
        return Ok(Step::Skip);
    }

    let chunk: ChunkData = serde_json::from_value(event_json)
        .map_err(|e| TriageError::request(format!("SSE chunk schema error: {e}")))?;

    // Only the first choice carries content for single-completion requests.
    let content = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|text| !text.is_empty());

    Ok(match content {
        Some(text) => Step::Fragment(text),
        None => Step::Skip,
    })
}

/// Turn a raw SSE byte stream into a lazy [`FragmentStream`].
///
/// The stream ends cleanly on `[DONE]`. A transport error, an API error
/// payload, a malformed chunk, or EOF before `[DONE]` yields one `Err` and ends it.
pub fn decode_sse<S, B, E>(bytes: S) -> FragmentStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let events = Box::pin(bytes.eventsource());

    Box::pin(futures::stream::unfold(Some(events), |state| async move {
        let mut events = state?;
        loop {
            let sse = match events.next().await {
                Some(Ok(sse)) => sse,
                Some(Err(e)) => {
                    let err = TriageError::request(format!("SSE stream error: {e}"));
                    error!(error = %err, "Completion stream failed");
                    return Some((Err(err), None));
                }
                None => {
                    let err = TriageError::request("SSE stream closed before response completed");
                    error!(error = %err, "Completion stream failed");
                    return Some((Err(err), None));
                }
            };

            match decode_event(&sse.data) {
                Ok(Step::Fragment(text)) => return Some((Ok(text), Some(events))),
                Ok(Step::Skip) => continue,
                Ok(Step::Done) => return None,
                Err(err) => {
                    error!(error = %err, "Completion stream failed");
                    return Some((Err(err), None));
                }
            }
        }
    }))
}
