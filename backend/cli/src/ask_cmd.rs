//! CLI Ask Command
//!
//! One interaction, fragments written to stdout as they arrive.

use std::io;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use triage_config::TriageConfig;
use triage_core::ModelId;
use triage_session::{ConversationSession, SessionManager};

use crate::runtime::{completion_client, dataset_loader, dataset_warning};
use crate::terminal_output::{note_warn, stream_write};

pub async fn run(config: &TriageConfig, model: ModelId, prompt: &str) -> Result<()> {
    let client = completion_client(config)?;
    let loader = dataset_loader(config);
    if let Some(warning) = dataset_warning(&loader) {
        note_warn(&warning);
    }

    let manager = SessionManager::new(client, loader);
    let mut session = ConversationSession::new();
    let mut stdout = io::stdout();
    let mut write_error = None;

    let result = manager
        .run_turn(&mut session, model, prompt, |fragment| {
            if write_error.is_none() {
                if let Err(err) = stream_write(&mut stdout, fragment) {
                    write_error = Some(err);
                }
            }
        })
        .await;
    println!();

    if let Some(err) = write_error {
        warn!(error = %err, "Could not write reply to stdout");
    }
    let content = result.context("Inference error")?;
    debug!(chars = content.chars().count(), "Reply committed");
    Ok(())
}
