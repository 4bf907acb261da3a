//! Game mode selection.

use serde::{Deserialize, Serialize};

/// How the model collaborates with the player.
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
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Game-master mode: structured `{story, actions}` JSON output with
    /// state-changing actions
    #[default]
    Gm,
    /// Free-form narrative only; no state mutation
    StoryTeller,
}
