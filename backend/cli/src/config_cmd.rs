//! CLI Config Command
//!
//! Prints the effective configuration as YAML with secrets masked.

use std::path::Path;

use anyhow::Result;

use triage_config::{redact, TriageConfig};

use crate::terminal_output::note_info;

pub fn run(config: &TriageConfig, source: Option<&Path>) -> Result<()> {
    match source {
        Some(path) => note_info(&format!("Loaded from {}", path.display())),
        None => note_info("No config file found; showing defaults and environment overrides"),
    }
    print!("{}", render(config)?);
    Ok(())
}

fn render(config: &TriageConfig) -> Result<String> {
    let value = serde_json::to_value(config)?;
    Ok(serde_yaml::to_string(&redact(&value))?)
}
