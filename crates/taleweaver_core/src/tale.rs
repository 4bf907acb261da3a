//! Persisted record shapes: tales, scenarios, and inventory items.

use crate::{GameMode, LogEntry, Stat, StoryCard};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An inventory item.
///
/// Inventory is an ordered list; duplicate names are permitted and are
/// told apart by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique item id
    pub id: String,
    /// Item name
    pub name: String,
}

impl Item {
    /// Create a new item with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
        }
    }
}

/// A reusable template used to start new tales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique scenario id
    pub id: String,
    /// Scenario name
    pub name: String,
    /// Opening description injected as system context
    pub description: String,
    /// Author's note injected as system context
    pub author_note: String,
    /// Starting stats
    pub initial_stats: Vec<Stat>,
    /// Starting inventory item names
    pub initial_inventory: Vec<String>,
    /// Starting storybook
    pub initial_story_cards: Vec<StoryCard>,
    /// Game mode new tales start in
    #[serde(default)]
    pub game_mode: GameMode,
}

/// One persisted playthrough: log, world state, and metadata.
///
/// The persistence layer treats this shape as opaque; all mutation goes
/// through the engine's tale session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tale {
    /// Unique tale id
    pub id: String,
    /// Tale name
    pub name: String,
    /// Scenario description carried into the prompt
    pub description: String,
    /// Author's note carried into the prompt
    pub author_note: String,
    /// Storybook for this tale
    pub story_cards: Vec<StoryCard>,
    /// Scenario this tale was started from, if any
    pub scenario_id: Option<String>,
    /// Current stats
    pub stats: Vec<Stat>,
    /// Current inventory
    pub inventory: Vec<Item>,
    /// Conversation log, oldest first
    pub log: Vec<LogEntry>,
    /// Active game mode
    #[serde(default)]
    pub game_mode: GameMode,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last-updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Tale {
    /// Create an empty tale with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            author_note: String::new(),
            story_cards: Vec::new(),
            scenario_id: None,
            stats: Vec::new(),
            inventory: Vec::new(),
            log: Vec::new(),
            game_mode: GameMode::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a tale from a scenario template.
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let mut tale = Self::new(scenario.name.clone());
        tale.description = scenario.description.clone();
        tale.author_note = scenario.author_note.clone();
        tale.story_cards = scenario.initial_story_cards.clone();
        tale.scenario_id = Some(scenario.id.clone());
        tale.stats = scenario.initial_stats.clone();
        tale.inventory = scenario
            .initial_inventory
            .iter()
            .map(Item::new)
            .collect();
        tale.game_mode = scenario.game_mode;
        tale
    }
}
