//! `triage-config`: configuration for the Triage assistant.
//!
//! Provides:
//! - Typed config schema (provider, dataset, logging)
//! - YAML loading with `${ENV_VAR}` substitution
//! - Environment overrides for the well-known variables
//! - Config redaction for safe display
//! - Validation with path-scoped errors and warnings

pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use env::{apply_env_overrides, process_env, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, load_config, parse_config, resolve_config_path};
pub use redact::redact;
pub use schema::{DatasetConfig, LoggingConfig, ProviderConfig, TriageConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A prepared config plus where it came from and what validation found.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: TriageConfig,
    pub source: Option<PathBuf>,
    pub report: ValidationReport,
}

/// Load the config file (if any), apply env overrides from the process
/// environment, and validate.
pub async fn load_and_prepare(explicit: Option<&Path>) -> Result<LoadedConfig> {
    load_and_prepare_with(explicit, &process_env()).await
}

/// Same as [`load_and_prepare`] with an explicit environment map.
pub async fn load_and_prepare_with(
    explicit: Option<&Path>,
    env: &HashMap<String, String>,
) -> Result<LoadedConfig> {
    let source = resolve_config_path(explicit);
    let config = match &source {
        Some(path) => load_config(path, env).await?,
        None => {
            debug!("No config file found; using defaults");
            TriageConfig::default()
        }
    };

    let config = apply_env_overrides(config, env);
    let report = validate(&config);

    Ok(LoadedConfig {
        config,
        source,
        report,
    })
}
