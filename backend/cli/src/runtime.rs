//! Shared wiring for the commands: completion client and dataset handle.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use triage_config::TriageConfig;
use triage_core::CompletionClient;
use triage_dataset::{missing_data_message, Dataset, DatasetLoader};
use triage_inference::GroqClient;

/// Build the Groq client. Fails when no API key is configured.
pub fn completion_client(config: &TriageConfig) -> Result<Arc<dyn CompletionClient>> {
    let api_key = config.require_api_key()?;
    let client = GroqClient::new(api_key)?.with_base_url(&config.provider.base_url);
    info!(
        provider = client.name(),
        base_url = client.base_url(),
        "Completion client ready"
    );
    Ok(Arc::new(client))
}

pub fn dataset_loader(config: &TriageConfig) -> Arc<DatasetLoader> {
    Arc::new(DatasetLoader::new(&config.dataset.path))
}

/// Log the dataset outcome; returns a user-facing warning when there is no data.
pub fn dataset_warning(loader: &DatasetLoader) -> Option<String> {
    match loader.load() {
        Ok(Dataset::Present(table)) => {
            info!(
                rows = table.row_count(),
                columns = table.column_count(),
                "Incident data loaded"
            );
            None
        }
        Ok(Dataset::Absent) => {
            warn!(path = %loader.path().display(), "No incident data");
            Some(missing_data_message(loader.path()))
        }
        Err(err) => {
            warn!(error = %err, "Incident data unreadable");
            Some(err.to_string())
        }
    }
}
