//! CLI Models Command
//!
//! Lists the selectable models.

use anyhow::Result;

use triage_config::TriageConfig;
use triage_core::ModelId;

use crate::terminal_output::{render_table, Column};

pub fn run(config: &TriageConfig) -> Result<()> {
    print!("{}", models_table(config.provider.default_model));
    Ok(())
}

fn models_table(default: ModelId) -> String {
    let columns = [Column::left("Model"), Column::right("Default")];
    let rows: Vec<Vec<String>> = ModelId::ALL
        .iter()
        .map(|model| {
            let marker = if *model == default { "*" } else { "" };
            vec![model.to_string(), marker.to_string()]
        })
        .collect();
    render_table(&columns, &rows)
}
