//! TUI Rendering
//!
//! Translates `AppState` into Ratatui widgets and draws to the terminal frame.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Row, Table, Wrap},
};
use triage_core::Role;
use triage_dataset::IncidentTable;

use crate::app::AppState;

pub fn draw_ui(f: &mut Frame, state: &AppState) {
    let banners = banner_lines(state);
    let mut constraints = Vec::new();
    if !banners.is_empty() {
        constraints.push(Constraint::Length(banners.len() as u16 + 2));
    }
    if state.show_table {
        constraints.push(Constraint::Percentage(40));
    }
    constraints.push(Constraint::Min(3)); // Transcript
    constraints.push(Constraint::Length(3)); // Input
    constraints.push(Constraint::Length(1)); // Status

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.size());
    let mut next = 0;

    if !banners.is_empty() {
        let widget = Paragraph::new(Text::from(banners))
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(widget, chunks[next]);
        next += 1;
    }

    if state.show_table {
        draw_table(f, chunks[next], state.table.as_ref());
        next += 1;
    }

    draw_transcript(f, chunks[next], state);
    next += 1;

    let input_title = if state.in_flight {
        "Waiting for the reply..."
    } else {
        "Ask about the incidents (Enter to send)"
    };
    let input_widget = Paragraph::new(state.input.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().title(input_title).borders(Borders::ALL));
    f.render_widget(input_widget, chunks[next]);
    next += 1;

    let status = Line::from(vec![
        Span::styled(
            format!(" model: {} ", state.model),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::raw("  Ctrl-N model  Tab table  PgUp/PgDn scroll  Esc quit"),
    ]);
    f.render_widget(Paragraph::new(status), chunks[next]);
}

fn banner_lines(state: &AppState) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(warning) = &state.data_warning {
        lines.push(Line::from(Span::styled(
            warning.clone(),
            Style::default().fg(Color::Yellow),
        )));
    }
    if let Some(error) = &state.error_banner {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    lines
}

fn draw_table(f: &mut Frame, area: Rect, table: Option<&IncidentTable>) {
    let block = Block::default().title("Incident data").borders(Borders::ALL);
    let Some(table) = table else {
        f.render_widget(Paragraph::new("No incident data loaded.").block(block), area);
        return;
    };

    let widths: Vec<Constraint> = (0..table.column_count())
        .map(|col| {
            let widest = table
                .rows()
                .iter()
                .filter_map(|row| row.get(col))
                .chain(table.headers().get(col))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0);
            Constraint::Length(widest.min(40) as u16)
        })
        .collect();

    let header = Row::new(table.headers().to_vec())
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = table.rows().iter().map(|row| Row::new(row.clone()));
    let widget = Table::new(rows, widths).header(header).block(block);
    f.render_widget(widget, area);
}

fn draw_transcript(f: &mut Frame, area: Rect, state: &AppState) {
    let mut lines: Vec<Line> = Vec::new();
    for turn in &state.transcript {
        push_turn(&mut lines, turn.role, &turn.content);
    }
    if state.in_flight && !state.streaming.is_empty() {
        push_turn(&mut lines, Role::Assistant, &state.streaming);
    }

    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    let total = wrapped_height(&lines, inner_width);
    let offset = total
        .saturating_sub(inner_height)
        .saturating_sub(state.scroll_back);

    let widget = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .scroll((offset, 0))
        .block(Block::default().title("Conversation").borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn push_turn<'a>(lines: &mut Vec<Line<'a>>, role: Role, content: &'a str) {
    let (label, color) = match role {
        Role::User => ("You", Color::Green),
        Role::Assistant => ("Assistant", Color::Cyan),
    };
    lines.push(Line::from(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));
    for text in content.lines() {
        lines.push(Line::raw(text));
    }
    lines.push(Line::raw(""));
}

/// Rows the lines occupy once wrapped at `width` (character-count estimate).
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    let width = width as usize;
    let rows: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum();
    rows.min(u16::MAX as usize) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};
    use triage_core::{ConversationTurn, ModelId};

    fn rendered(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw_ui(f, state)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn wrapped_height_counts_overflowing_lines() {
        let lines = vec![Line::raw("abcdefghij"), Line::raw(""), Line::raw("abc")];
        assert_eq!(wrapped_height(&lines, 4), 3 + 1 + 1);
        assert_eq!(wrapped_height(&lines, 0), 0);
    }

    #[test]
    fn draws_banner_model_and_table() {
        let mut state = AppState::new(ModelId::Llama31_8bInstant);
        state.table = Some(IncidentTable::new(
            vec!["id".into(), "service".into()],
            vec![vec!["1".into(), "database".into()]],
        ));
        state.show_table = true;
        state.error_banner = Some("Inference error: boom".into());

        let screen = rendered(&state);
        assert!(screen.contains("Inference error: boom"));
        assert!(screen.contains("llama-3.1-8b-instant"));
        assert!(screen.contains("database"));
    }

    #[test]
    fn in_flight_reply_is_shown_after_transcript() {
        let mut state = AppState::default();
        state.transcript.push(ConversationTurn::user("What broke?"));
        state.in_flight = true;
        state.streaming = "The database".into();

        let screen = rendered(&state);
        assert!(screen.contains("What broke?"));
        assert!(screen.contains("The database"));
    }
}
