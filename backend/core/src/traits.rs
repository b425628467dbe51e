use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::Result;
use crate::types::ModelId;

/// Lazily produced text fragments, in emission order.
///
/// Ends after the remote side signals completion. An `Err` item is always the last item.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Trait for chat-completion backends that stream their output.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Client name for logs (e.g., "groq").
    fn name(&self) -> &str;

    /// Open a streamed completion for a system instruction and one user message.
    async fn stream_completion(&self, request: &CompletionRequest) -> Result<FragmentStream>;
}

/// The two messages sent for one interaction.
///
/// Prior turns are never included; the system prompt is rebuilt every turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: ModelId,
    pub system_prompt: String,
    pub user_prompt: String,
}
