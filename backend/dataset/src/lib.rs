//! Incident dataset handling.
//!
//! Loads the incident CSV once per [`DatasetLoader`] and flattens it into the
//! text block embedded in the system prompt.

pub mod loader;
pub mod serialize;

pub use loader::{missing_data_message, Dataset, DatasetLoader, IncidentTable, DEFAULT_DATA_FILE};
pub use serialize::{serialize, NO_DATA_SENTINEL};
