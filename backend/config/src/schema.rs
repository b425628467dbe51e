//! Triage configuration schema.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use triage_core::{ModelId, Result, TriageError};

/// Default completion endpoint root (Groq's OpenAI-compatible API).
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default incident data file, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "incidents.csv";

/// Default log level when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TriageConfig {
    pub provider: ProviderConfig,
    pub dataset: DatasetConfig,
    pub logging: LoggingConfig,
}

/// Remote completion endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: ModelId,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: ModelId::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DatasetConfig {
    pub path: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATA_PATH),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for rolling JSON logs; no file logging when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            dir: None,
        }
    }
}

impl TriageConfig {
    /// The API credential, or a fatal config error when it is missing.
    pub fn require_api_key(&self) -> Result<&str> {
        match self.provider.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(TriageError::Config(
                "GROQ_API_KEY is not set; export it or add provider.apiKey to the config file"
                    .to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "provider:\n  defaultModel: llama-3.1-8b-instant\n";
        let config: TriageConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.provider.default_model, ModelId::Llama31_8bInstant);
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.dataset.path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn missing_or_blank_key_is_config_error() {
        let mut config = TriageConfig::default();
        assert!(matches!(config.require_api_key(), Err(TriageError::Config(_))));
        config.provider.api_key = Some("   ".into());
        assert!(config.require_api_key().is_err());
        config.provider.api_key = Some("gsk_live".into());
        assert_eq!(config.require_api_key().unwrap(), "gsk_live");
    }
}
