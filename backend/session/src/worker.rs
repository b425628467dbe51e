//! Background task that owns a session and runs prompts one at a time.
//!
//! Used by interactive front ends that cannot hold the session borrow across
//! their own event loop. Commands are handled strictly in order, so at most one
//! stream is in flight per session.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use triage_core::{ModelId, TurnEvent};

use crate::history::ConversationSession;
use crate::manager::{SessionManager, TurnState};

/// Requests from the front end to the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Submit { prompt: String, model: ModelId },
}

/// Channels and task handle for a running worker.
///
/// Dropping `commands` stops the worker after the current turn; the task
/// then returns the session.
pub struct SessionWorker {
    pub commands: mpsc::UnboundedSender<SessionCommand>,
    pub events: mpsc::UnboundedReceiver<TurnEvent>,
    pub handle: JoinHandle<ConversationSession>,
}

/// Spawn a worker that owns `session` on the current Tokio runtime.
pub fn spawn_session_worker(
    manager: Arc<SessionManager>,
    session: ConversationSession,
) -> SessionWorker {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run_worker(manager, session, command_rx, event_tx));
    SessionWorker {
        commands: command_tx,
        events: event_rx,
        handle,
    }
}

async fn run_worker(
    manager: Arc<SessionManager>,
    mut session: ConversationSession,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    events: mpsc::UnboundedSender<TurnEvent>,
) -> ConversationSession {
    info!(session_id = %session.id(), "Session worker started");

    while let Some(command) = commands.recv().await {
        match command {
            SessionCommand::Submit { prompt, model } => {
                if !run_one(&manager, &mut session, model, prompt, &events).await {
                    debug!(session_id = %session.id(), "Event receiver gone; stopping worker");
                    break;
                }
            }
        }
    }

    info!(
        session_id = %session.id(),
        turns = session.history().len(),
        "Session worker stopped"
    );
    session
}

/// Run a single turn, reporting progress. Returns false once nobody is listening.
async fn run_one(
    manager: &SessionManager,
    session: &mut ConversationSession,
    model: ModelId,
    prompt: String,
    events: &mpsc::UnboundedSender<TurnEvent>,
) -> bool {
    let started = TurnEvent::Started {
        prompt: prompt.clone(),
        model,
    };
    if events.send(started).is_err() {
        return false;
    }

    let mut turn = match manager.submit(session, model, &prompt).await {
        Ok(turn) => turn,
        Err(e) => {
            return events
                .send(TurnEvent::Failed {
                    error: e.to_string(),
                })
                .is_ok()
        }
    };

    loop {
        let next = tokio::select! {
            item = turn.next() => Some(item),
            _ = events.closed() => None,
        };
        let Some(item) = next else {
            turn.cancel();
            return false;
        };
        let Some(item) = item else {
            break;
        };
        match item {
            Ok(fragment) => {
                if events.send(TurnEvent::Fragment(fragment)).is_err() {
                    turn.cancel();
                    return false;
                }
            }
            Err(e) => {
                drop(turn);
                return events
                    .send(TurnEvent::Failed {
                        error: e.to_string(),
                    })
                    .is_ok();
            }
        }
    }

    let state = turn.state();
    drop(turn);

    let event = match (state, session.history().last()) {
        (TurnState::Committed, Some(last)) => TurnEvent::Committed {
            content: last.content.clone(),
        },
        _ => TurnEvent::Failed {
            error: "stream ended without a reply".to_string(),
        },
    };
    events.send(event).is_ok()
}
