//! Model-emitted game-state mutations.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A structured instruction from the model to mutate world state.
///
/// Wire format carries the variant in `type` with a `payload` object, e.g.
/// `{"type": "MODIFY_STAT", "payload": {"name": "HP", "value": -5}}`.
///
/// # Examples
///
/// ```
/// use taleweaver_core::Action;
///
/// let json = r#"{"type": "ADD_TO_INVENTORY", "payload": {"item": "Rusty Key"}}"#;
/// let action: Action = serde_json::from_str(json).unwrap();
/// assert_eq!(action, Action::AddToInventory { item: "Rusty Key".into() });
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Change an existing stat by `value` (positive or negative delta)
    ModifyStat {
        /// Stat name
        name: String,
        /// Signed delta applied to the stat, clamped into its range
        value: i64,
    },
    /// Add an item to the player's inventory
    AddToInventory {
        /// Item name
        item: String,
    },
    /// Remove the first inventory item matching `item` by name
    RemoveFromInventory {
        /// Item name
        item: String,
    },
    /// Introduce a new stat with an initial value
    AddToStats {
        /// Stat name
        name: String,
        /// Initial value
        value: i64,
    },
}

impl Action {
    /// Parse a single action from a decoded JSON value.
    ///
    /// Unknown action types and malformed payloads are skipped with a
    /// warning rather than failing the whole batch; the model is an
    /// unreliable collaborator and one bad element must not discard its
    /// valid siblings.
    pub fn from_value(value: &serde_json::Value) -> Option<Action> {
        match serde_json::from_value::<Action>(value.clone()) {
            Ok(action) => Some(action),
            Err(e) => {
                warn!(action = %value, error = %e, "Skipping unrecognized action");
                None
            }
        }
    }

    /// Parse an array of action values, skipping unrecognized elements.
    pub fn from_array(values: &[serde_json::Value]) -> Vec<Action> {
        values.iter().filter_map(Action::from_value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_wire_format() {
        let action = Action::ModifyStat {
            name: "HP".to_string(),
            value: -5,
        };
        let wire = serde_json::to_value(&action).unwrap();
        assert_eq!(
            wire,
            json!({"type": "MODIFY_STAT", "payload": {"name": "HP", "value": -5}})
        );
        let back: Action = serde_json::from_value(wire).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn unknown_type_is_skipped() {
        let values = vec![
            json!({"type": "MODIFY_STAT", "payload": {"name": "HP", "value": 3}}),
            json!({"type": "SUMMON_DRAGON", "payload": {"name": "Smaug"}}),
            json!({"type": "ADD_TO_INVENTORY", "payload": {"item": "Torch"}}),
        ];
        let actions = Action::from_array(&values);
        assert_eq!(actions.len(), 2);
        assert_eq!(
            actions[1],
            Action::AddToInventory {
                item: "Torch".to_string()
            }
        );
    }

    #[test]
    fn malformed_payload_is_skipped() {
        let values = vec![json!({"type": "MODIFY_STAT", "payload": {"name": "HP"}})];
        assert!(Action::from_array(&values).is_empty());
    }
}
