use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TriageError;

/// Who authored a turn in the conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in the conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The fixed set of hosted models a user can pick from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum ModelId {
    #[default]
    #[serde(rename = "llama-3.3-70b-versatile")]
    Llama33_70bVersatile,
    #[serde(rename = "llama-3.1-8b-instant")]
    Llama31_8bInstant,
}

impl ModelId {
    /// All selectable models, in picker order.
    pub const ALL: [ModelId; 2] = [ModelId::Llama33_70bVersatile, ModelId::Llama31_8bInstant];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Llama33_70bVersatile => "llama-3.3-70b-versatile",
            ModelId::Llama31_8bInstant => "llama-3.1-8b-instant",
        }
    }

    /// The model after this one in picker order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(ModelId::as_str).collect();
                TriageError::Config(format!(
                    "unknown model '{wanted}' (expected one of: {})",
                    known.join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_serializes_with_lowercase_role() {
        let json = serde_json::to_value(ConversationTurn::assistant("done")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "done"}));
    }

    #[test]
    fn model_id_parses_known_identifiers() {
        assert_eq!(
            "llama-3.1-8b-instant".parse::<ModelId>().unwrap(),
            ModelId::Llama31_8bInstant
        );
        assert_eq!(
            " LLAMA-3.3-70B-VERSATILE ".parse::<ModelId>().unwrap(),
            ModelId::Llama33_70bVersatile
        );
    }

    #[test]
    fn model_id_rejects_unknown_identifier() {
        let err = "gpt-4o".parse::<ModelId>().unwrap_err();
        assert!(err.to_string().contains("llama-3.1-8b-instant"));
    }

    #[test]
    fn model_id_cycles_through_all() {
        let first = ModelId::default();
        assert_eq!(first, ModelId::Llama33_70bVersatile);
        assert_eq!(first.next(), ModelId::Llama31_8bInstant);
        assert_eq!(first.next().next(), first);
    }

    #[test]
    fn model_id_serde_uses_wire_name() {
        let json = serde_json::to_string(&ModelId::Llama31_8bInstant).unwrap();
        assert_eq!(json, "\"llama-3.1-8b-instant\"");
    }
}
