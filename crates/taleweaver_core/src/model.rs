//! Model descriptor returned by transport adapters.

use serde::{Deserialize, Serialize};

/// A language model offered by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmModel {
    /// Provider-scoped model identifier (e.g., "mistralai/mistral-small")
    pub id: String,
    /// Human-readable model name
    pub name: String,
    /// Maximum context window in tokens, when the provider reports one
    pub context_length: Option<usize>,
}

impl LlmModel {
    /// Create a new model descriptor.
    pub fn new(id: impl Into<String>, name: impl Into<String>, context_length: Option<usize>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            context_length,
        }
    }
}
