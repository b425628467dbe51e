//! Keyboard Input Handler
//!
//! Maps crossterm key events onto `AppState` and, on Enter, a prompt for the session worker.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use triage_session::SessionCommand;

use crate::app::AppState;

/// Handles a single keyboard event. Returns a command when a prompt is submitted.
///
/// Submitting is refused while a turn is in flight.
pub fn handle_key_event(key: KeyEvent, state: &mut AppState) -> Option<SessionCommand> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => state.should_quit = true,
        KeyCode::Esc => state.should_quit = true,
        KeyCode::Char('n') if ctrl => state.cycle_model(),
        KeyCode::Tab => state.show_table = !state.show_table,
        KeyCode::PageUp => state.scroll_back = state.scroll_back.saturating_add(5),
        KeyCode::PageDown => state.scroll_back = state.scroll_back.saturating_sub(5),
        KeyCode::Enter => {
            if state.in_flight {
                return None;
            }
            let prompt = state.input.trim().to_string();
            if prompt.is_empty() {
                return None;
            }
            state.input.clear();
            state.in_flight = true;
            state.error_banner = None;
            state.scroll_back = 0;
            return Some(SessionCommand::Submit {
                prompt,
                model: state.model,
            });
        }
        KeyCode::Backspace => {
            state.input.pop();
        }
        KeyCode::Char(c) if !ctrl => state.input.push(c),
        _ => {}
    }
    None
}
