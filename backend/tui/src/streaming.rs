//! Applies session worker events to the UI state.

use tracing::debug;
use triage_core::{ConversationTurn, TurnEvent};

use crate::app::AppState;

/// Update the transcript and in-flight reply for one turn event.
pub fn apply_turn_event(state: &mut AppState, event: TurnEvent) {
    match event {
        TurnEvent::Started { prompt, model } => {
            debug!(%model, "Turn started");
            state.transcript.push(ConversationTurn::user(prompt));
            state.streaming.clear();
            state.in_flight = true;
        }
        TurnEvent::Fragment(fragment) => {
            state.streaming.push_str(&fragment);
        }
        TurnEvent::Committed { content } => {
            state.transcript.push(ConversationTurn::assistant(content));
            state.streaming.clear();
            state.in_flight = false;
        }
        TurnEvent::Failed { error } => {
            state.streaming.clear();
            state.in_flight = false;
            state.error_banner = Some(format!("Inference error: {error}"));
        }
    }
}
