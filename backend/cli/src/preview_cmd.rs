//! CLI Preview Command
//!
//! Prints the raw incident table.

use anyhow::Result;

use triage_config::TriageConfig;
use triage_dataset::{missing_data_message, Dataset};

use crate::runtime::dataset_loader;
use crate::terminal_output::{note_info, note_warn, render_table, Column};

pub fn run(config: &TriageConfig) -> Result<()> {
    let loader = dataset_loader(config);
    match loader.load()? {
        Dataset::Absent => note_warn(&missing_data_message(loader.path())),
        Dataset::Present(table) => {
            let columns: Vec<Column> = table.headers().iter().map(Column::left).collect();
            print!("{}", render_table(&columns, table.rows()));
            note_info(&format!(
                "{} rows, {} columns from {}",
                table.row_count(),
                table.column_count(),
                loader.path().display()
            ));
        }
    }
    Ok(())
}
