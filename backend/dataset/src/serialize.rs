//! Flattens an incident table into the text block embedded in the system prompt.
//!
//! Output is a fixed-width grid: a left-aligned row index, then every column
//! right-aligned to its widest cell. Every row and column is included.

use crate::loader::{Dataset, IncidentTable};

/// Context used when no incident table is available.
pub const NO_DATA_SENTINEL: &str = "No incident data available.";

const COLUMN_GAP: &str = "  ";

enum Align {
    Left,
    Right,
}

/// Render the dataset for prompt context.
pub fn serialize(dataset: &Dataset) -> String {
    match dataset {
        Dataset::Present(table) => render_table(table),
        Dataset::Absent => NO_DATA_SENTINEL.to_string(),
    }
}

fn render_table(table: &IncidentTable) -> String {
    if table.row_count() == 0 {
        return format!("Empty table\nColumns: [{}]", table.headers().join(", "));
    }

    let headers: Vec<String> = table.headers().iter().map(|h| one_line(h)).collect();
    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| {
            (0..headers.len())
                .map(|i| row.get(i).map(|c| one_line(c)).unwrap_or_default())
                .collect()
        })
        .collect();

    let index_width = (table.row_count() - 1).to_string().len();
    let mut widths: Vec<usize> = headers.iter().map(|h| display_len(h)).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(display_len(cell));
        }
    }

    let mut out = String::new();

    out.push_str(&" ".repeat(index_width));
    for (i, header) in headers.iter().enumerate() {
        out.push_str(COLUMN_GAP);
        out.push_str(&pad_cell(header, widths[i], Align::Right));
    }

    for (idx, row) in rows.iter().enumerate() {
        out.push('\n');
        out.push_str(&pad_cell(&idx.to_string(), index_width, Align::Left));
        for (i, cell) in row.iter().enumerate() {
            out.push_str(COLUMN_GAP);
            out.push_str(&pad_cell(cell, widths[i], Align::Right));
        }
    }

    out
}

/// Keep each record on one line of output.
fn one_line(cell: &str) -> String {
    cell.replace("\r\n", "\\n").replace(['\n', '\r'], "\\n")
}

fn display_len(s: &str) -> usize {
    s.chars().count()
}

fn pad_cell(s: &str, width: usize, align: Align) -> String {
    let pad = width.saturating_sub(display_len(s));
    match align {
        Align::Left => format!("{s}{}", " ".repeat(pad)),
        Align::Right => format!("{}{s}", " ".repeat(pad)),
    }
}
