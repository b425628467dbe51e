//! Config file discovery and reading.

use crate::env::resolve_env_vars_with;
use crate::schema::TriageConfig;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Config file looked up in the working directory first.
pub const LOCAL_CONFIG_FILE: &str = "triage.yaml";

/// Config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the Triage config directory.
/// Priority: `TRIAGE_CONFIG_DIR` env > `<platform config dir>/triage` > `.triage`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TRIAGE_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .map(|dir| dir.join("triage"))
        .unwrap_or_else(|| PathBuf::from(".triage"))
}

/// Pick the config file to load.
///
/// An explicit path is always returned (and must exist); otherwise the first
/// existing of `./triage.yaml` and `<config_dir>/config.yaml`.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    [PathBuf::from(LOCAL_CONFIG_FILE), config_dir().join(CONFIG_FILE_NAME)]
        .into_iter()
        .find(|candidate| candidate.is_file())
}

/// Read a config file, substituting `${VAR}` references from `env`.
pub async fn load_config(path: &Path, env: &HashMap<String, String>) -> Result<TriageConfig> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&raw, env)
        .with_context(|| format!("Failed to load config at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Parse YAML text into a config, resolving env references first.
pub fn parse_config(raw: &str, env: &HashMap<String, String>) -> Result<TriageConfig> {
    if raw.trim().is_empty() {
        debug!("Config file is empty; using defaults");
        return Ok(TriageConfig::default());
    }

    let value: Value = serde_yaml::from_str(raw).context("Failed to parse config YAML")?;
    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;
    serde_json::from_value(value).context("Config does not match the expected schema")
}
