//! Terminal chat UI for Triage.
//!
//! Renders the transcript, the streamed reply, the incident table preview and
//! banners. Prompts go to a session worker; its events drive the state.

pub mod app;
pub mod input;
pub mod render;
pub mod streaming;

pub use app::AppState;
pub use input::handle_key_event;
pub use render::draw_ui;
pub use streaming::apply_turn_event;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use tokio::sync::mpsc;
use tracing::{info, warn};

use triage_core::TurnEvent;
use triage_session::SessionCommand;

const INPUT_POLL: Duration = Duration::from_millis(50);

/// Run the UI until the user quits. Blocks the calling thread.
pub fn run_app(
    mut state: AppState,
    commands: mpsc::UnboundedSender<SessionCommand>,
    mut events: mpsc::UnboundedReceiver<TurnEvent>,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    info!("Chat UI started");
    let result = event_loop(&mut terminal, &mut state, &commands, &mut events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!(turns = state.transcript.len(), "Chat UI closed");

    result
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut AppState,
    commands: &mpsc::UnboundedSender<SessionCommand>,
    events: &mut mpsc::UnboundedReceiver<TurnEvent>,
) -> Result<()> {
    loop {
        while let Ok(turn_event) = events.try_recv() {
            apply_turn_event(state, turn_event);
        }

        terminal.draw(|f| draw_ui(f, state))?;
        if state.should_quit {
            return Ok(());
        }

        if !event::poll(INPUT_POLL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(command) = handle_key_event(key, state) {
                if commands.send(command).is_err() {
                    warn!("Session worker is gone; prompt dropped");
                    state.in_flight = false;
                    state.error_banner = Some("Session worker stopped unexpectedly.".to_string());
                }
            }
        }
    }
}
