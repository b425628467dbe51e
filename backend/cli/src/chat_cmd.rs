//! CLI Chat Command
//!
//! Runs the TUI on a blocking thread while a session worker streams turns.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use triage_config::TriageConfig;
use triage_core::ModelId;
use triage_session::{spawn_session_worker, ConversationSession, SessionManager, SessionWorker};
use triage_tui::{run_app, AppState};

use crate::runtime::{completion_client, dataset_loader};

pub async fn run(config: &TriageConfig, model: ModelId) -> Result<()> {
    let client = completion_client(config)?;
    let loader = dataset_loader(config);

    let state = match loader.load() {
        Ok(dataset) => AppState::new(model).with_dataset(dataset, loader.path()),
        Err(err) => {
            warn!(error = %err, "Incident data unreadable");
            AppState::new(model).with_data_error(err.to_string())
        }
    };

    let manager = Arc::new(SessionManager::new(client, loader));
    let session = ConversationSession::new();
    info!(session_id = %session.id(), %model, "Starting chat");

    let SessionWorker {
        commands,
        events,
        handle,
    } = spawn_session_worker(manager, session);

    let ui_result = tokio::task::spawn_blocking(move || run_app(state, commands, events))
        .await
        .context("chat UI task panicked")?;
    let session = handle.await.context("session worker panicked")?;
    info!(
        session_id = %session.id(),
        turns = session.history().len(),
        "Chat ended"
    );

    ui_result
}
