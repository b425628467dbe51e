//! TUI App State
//!
//! Top-level state for the chat screen. `transcript` mirrors the session
//! history; `streaming` holds the reply currently arriving.

use std::path::Path;

use triage_core::{ConversationTurn, ModelId};
use triage_dataset::{missing_data_message, Dataset, IncidentTable};

pub struct AppState {
    pub transcript: Vec<ConversationTurn>,
    pub streaming: String,
    /// A prompt was sent and its turn has not committed or failed yet.
    pub in_flight: bool,
    pub input: String,
    pub model: ModelId,
    pub table: Option<IncidentTable>,
    pub show_table: bool,
    pub data_warning: Option<String>,
    pub error_banner: Option<String>,
    /// Lines scrolled up from the bottom of the transcript.
    pub scroll_back: u16,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(model: ModelId) -> Self {
        Self {
            transcript: Vec::new(),
            streaming: String::new(),
            in_flight: false,
            input: String::new(),
            model,
            table: None,
            show_table: false,
            data_warning: None,
            error_banner: None,
            scroll_back: 0,
            should_quit: false,
        }
    }

    /// Attach the loaded dataset, or a warning banner when there is none.
    pub fn with_dataset(mut self, dataset: &Dataset, source: &Path) -> Self {
        match dataset.table() {
            Some(table) => {
                self.table = Some(table.clone());
                self.data_warning = None;
            }
            None => {
                self.table = None;
                self.data_warning = Some(missing_data_message(source));
            }
        }
        self
    }

    pub fn with_data_error(mut self, message: impl Into<String>) -> Self {
        self.data_warning = Some(message.into());
        self
    }

    pub fn cycle_model(&mut self) {
        if !self.in_flight {
            self.model = self.model.next();
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ModelId::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_dataset_sets_warning_banner() {
        let state = AppState::default().with_dataset(&Dataset::Absent, Path::new("incidents.csv"));
        assert!(state.table.is_none());
        assert_eq!(
            state.data_warning.as_deref(),
            Some("'incidents.csv' not found. Add it to use the analysis features.")
        );
    }

    #[test]
    fn present_dataset_fills_preview() {
        let table = IncidentTable::new(vec!["id".into()], vec![vec!["INC-1".into()]]);
        let state = AppState::default()
            .with_data_error("stale")
            .with_dataset(&Dataset::Present(table.clone()), Path::new("incidents.csv"));
        assert_eq!(state.table, Some(table));
        assert!(state.data_warning.is_none());
    }
}
