//! Environment variable handling for config values.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references inside string values of the config file, resolved at load time.
//!   Only uppercase `[A-Z_][A-Z0-9_]*` names are matched; `$${VAR}` escapes to a literal `${VAR}`.
//! - Well-known variables (`GROQ_API_KEY`, `TRIAGE_DATA`, ...) that override file values.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::warn;

use crate::schema::TriageConfig;

/// `$${NAME}` (escaped) or `${NAME}`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\$\{([A-Z_][A-Z0-9_]*)\}").expect("static env pattern is valid"));

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
pub const BASE_URL_VAR: &str = "TRIAGE_BASE_URL";
pub const DATA_PATH_VAR: &str = "TRIAGE_DATA";
pub const MODEL_VAR: &str = "TRIAGE_MODEL";
pub const LOG_DIR_VAR: &str = "TRIAGE_LOG_DIR";
pub const LOG_LEVEL_VAR: &str = "RUST_LOG";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Snapshot of the process environment.
pub fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Substitute `${VAR}` references in a config value tree using the given environment.
///
/// Returns an error if any referenced var is unset or empty.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => {
            let result: Result<Vec<_>> = arr
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let whole = &caps[0];
        let var_name = &caps[1];
        if whole.starts_with("$$") {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

fn non_empty<'a>(env: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Apply well-known environment overrides on top of file values.
pub fn apply_env_overrides(mut config: TriageConfig, env: &HashMap<String, String>) -> TriageConfig {
    if let Some(key) = non_empty(env, API_KEY_VAR) {
        config.provider.api_key = Some(key.to_string());
    }
    if let Some(url) = non_empty(env, BASE_URL_VAR) {
        config.provider.base_url = url.to_string();
    }
    if let Some(path) = non_empty(env, DATA_PATH_VAR) {
        config.dataset.path = PathBuf::from(path);
    }
    if let Some(model) = non_empty(env, MODEL_VAR) {
        match model.parse() {
            Ok(model) => config.provider.default_model = model,
            Err(e) => warn!(var = MODEL_VAR, error = %e, "Ignoring invalid model override"),
        }
    }
    if let Some(dir) = non_empty(env, LOG_DIR_VAR) {
        config.logging.dir = Some(PathBuf::from(dir));
    }
    if let Some(level) = non_empty(env, LOG_LEVEL_VAR) {
        config.logging.level = level.to_string();
    }
    config
}
