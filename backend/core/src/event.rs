use crate::types::ModelId;

/// Progress of a single interaction, as reported to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    /// The user turn was recorded and the model is being called.
    Started { prompt: String, model: ModelId },
    /// One streamed fragment of the assistant reply, in arrival order.
    Fragment(String),
    /// The stream finished and the reply was appended to history.
    Committed { content: String },
    /// The turn was aborted; no assistant turn was appended.
    Failed { error: String },
}

impl TurnEvent {
    /// Whether no further events will follow for this turn.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnEvent::Committed { .. } | TurnEvent::Failed { .. })
    }
}
