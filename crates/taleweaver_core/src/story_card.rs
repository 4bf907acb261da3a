//! Storybook entries: triggerable lore snippets injected into the prompt.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Grouping for storybook entries in the editor.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Default,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum StorybookCategory {
    /// No category assigned
    #[default]
    Uncategorized,
    /// People and creatures
    Character,
    /// Places
    Location,
    /// Objects
    Item,
    /// History, customs, and world facts
    Lore,
}

/// A triggerable lore/context snippet.
///
/// Pinned cards bypass trigger matching entirely and are always injected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryCard {
    /// Unique card id
    pub id: String,
    /// Card title, shown as the label in the storybook block
    pub title: String,
    /// Text injected into the prompt when the card is selected
    pub content: String,
    /// Keywords matched case-insensitively as substrings of recent text
    pub triggers: Vec<String>,
    /// Editor grouping; not consulted during selection
    #[serde(default)]
    pub category: StorybookCategory,
    /// Always include this card regardless of trigger matches
    #[serde(default)]
    pub is_pinned: bool,
}

impl StoryCard {
    /// Create a new unpinned card.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        triggers: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            content: content.into(),
            triggers,
            category: StorybookCategory::default(),
            is_pinned: false,
        }
    }
}
