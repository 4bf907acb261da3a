//! Conversation log types.

use crate::Action;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogEntryRole {
    /// The human player
    Player,
    /// The model acting as game master or storyteller
    Gm,
}

/// The narrative style of a turn's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogEntryMode {
    /// The player performs an action ("Action: ...")
    Do,
    /// The player speaks in-world ("You say: ...")
    Say,
    /// Free prose inserted into the story verbatim
    #[default]
    Story,
    /// An out-of-band instruction to the narrator ("[Director's Note: ...]")
    Direct,
    /// Ask the model to continue the previous narration
    Continue,
}

/// One turn of conversation.
///
/// Created empty (or with player text) when a turn starts, mutated
/// incrementally as stream fragments arrive, and stable once the turn
/// completes except for explicit user edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique entry id
    pub id: String,
    /// Author of the entry
    pub role: LogEntryRole,
    /// Narrative style of the entry
    #[serde(default)]
    pub mode: LogEntryMode,
    /// Entry text; partially filled while streaming
    pub text: String,
    /// Groups GM entries that form one continued narration turn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    /// State mutations decoded from the model's response for this entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Action>>,
    /// Set when the structured `actions` block could not be recovered
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_action_error: bool,
    /// Transport error payload recorded when the turn failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LogEntry {
    /// Create a player entry with the given text and mode.
    pub fn player(text: impl Into<String>, mode: LogEntryMode) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: LogEntryRole::Player,
            mode,
            text: text.into(),
            chain_id: None,
            actions: None,
            is_action_error: false,
            error: None,
        }
    }

    /// Create an empty GM entry chained to `chain_id` (or to itself when
    /// starting a fresh narration turn).
    pub fn gm(chain_id: Option<String>) -> Self {
        let id = Uuid::new_v4().to_string();
        let chain_id = chain_id.unwrap_or_else(|| id.clone());
        Self {
            id,
            role: LogEntryRole::Gm,
            mode: LogEntryMode::Story,
            text: String::new(),
            chain_id: Some(chain_id),
            actions: None,
            is_action_error: false,
            error: None,
        }
    }

    /// The chain key of this entry: its `chain_id` when present, otherwise
    /// its own `id` (a singleton chain).
    pub fn chain_key(&self) -> &str {
        self.chain_id.as_deref().unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gm_entry_chains_to_itself_by_default() {
        let entry = LogEntry::gm(None);
        assert_eq!(entry.chain_key(), entry.id);
    }

    #[test]
    fn gm_entry_joins_existing_chain() {
        let entry = LogEntry::gm(Some("chain-1".to_string()));
        assert_eq!(entry.chain_key(), "chain-1");
        assert_ne!(entry.id, "chain-1");
    }
}
