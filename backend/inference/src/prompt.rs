//! System prompt template for incident analysis.

use triage_dataset::{serialize, Dataset};

pub struct PromptComposer;

impl PromptComposer {
    /// Builds the system instruction around a serialized context block.
    ///
    /// The context is embedded verbatim.
    pub fn compose(context: &str) -> String {
        format!(
            "You are a Senior SRE. Use the following incident logs: {context}. \
            When asked to analyze an incident, provide a step-by-step process: \
            1. Detection & Alerting, 2. Immediate Triage, 3. Root Cause Analysis (RCA), \
            4. Resolution Steps, and 5. Post-Mortem Recommendations."
        )
    }

    pub fn for_dataset(dataset: &Dataset) -> String {
        Self::compose(&serialize(dataset))
    }
}
