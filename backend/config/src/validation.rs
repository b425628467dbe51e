//! Config validation with field paths and user-facing messages.

use crate::schema::TriageConfig;
use thiserror::Error;

/// A config validation finding with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// All errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &TriageConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_provider(config, &mut report);
    validate_dataset(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_provider(config: &TriageConfig, report: &mut ValidationReport) {
    let url = config.provider.base_url.trim();
    if url.is_empty() {
        report.error("provider.baseUrl", "Base URL cannot be empty");
    } else if !(url.starts_with("http://") || url.starts_with("https://")) {
        report.error("provider.baseUrl", format!("Base URL must be http(s): {url}"));
    }
    if config.provider.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
        report.warn("provider.apiKey", "No API key configured; completions will be unavailable");
    }
}

fn validate_dataset(config: &TriageConfig, report: &mut ValidationReport) {
    if config.dataset.path.as_os_str().is_empty() {
        report.error("dataset.path", "Dataset path cannot be empty");
    }
}

fn validate_logging(config: &TriageConfig, report: &mut ValidationReport) {
    // Directive strings like "triage=debug,info" are passed through as-is.
    let level = config.logging.level.trim();
    if !level.contains('=') && !is_known_level(level) {
        report.warn(
            "logging.level",
            format!("Unknown log level '{level}'; expected trace, debug, info, warn, or error"),
        );
    }
}

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

fn is_known_level(level: &str) -> bool {
    LOG_LEVELS.iter().any(|l| l.eq_ignore_ascii_case(level))
}
