//! The in-memory tale session: the only place world state mutates.
//!
//! The prompt builder and decoders read snapshots; every change to the
//! log, stats, or inventory funnels through this type so that undo/redo
//! and action inverses stay consistent.

use chrono::Utc;
use taleweaver_core::{Action, Item, LogEntry, Stat, Tale};
use taleweaver_error::{TaleError, TaleErrorKind, TaleweaverResult};
use tracing::{debug, warn};

/// How many undone turns are kept for redo before the oldest is evicted.
pub const MAX_UNDO_DEPTH: usize = 50;

/// Default bounds for stats the model introduces mid-game.
const INTRODUCED_STAT_RANGE: [i64; 2] = [0, 100];

/// A loaded tale plus its undo/redo bookkeeping.
#[derive(Debug, Clone)]
pub struct TaleSession {
    tale: Tale,
    /// Entries in the order undo removed them; redo pops the most
    /// recently undone entry from the back.
    undone: Vec<LogEntry>,
}

impl TaleSession {
    /// Start a session over a loaded tale.
    pub fn new(tale: Tale) -> Self {
        Self {
            tale,
            undone: Vec::new(),
        }
    }

    /// The current aggregate, for snapshots and persistence.
    pub fn tale(&self) -> &Tale {
        &self.tale
    }

    /// Mutable access to tale metadata (name, description, storybook).
    ///
    /// Log and world-state changes should go through the session's
    /// operations instead so undo bookkeeping stays correct.
    pub fn tale_mut(&mut self) -> &mut Tale {
        self.touch();
        &mut self.tale
    }

    /// Append a log entry. Starting a new turn invalidates redo.
    pub fn push_entry(&mut self, entry: LogEntry) {
        self.tale.log.push(entry);
        self.undone.clear();
        self.touch();
    }

    /// Replace an entry's text.
    pub fn update_entry_text(&mut self, id: &str, text: impl Into<String>) -> TaleweaverResult<()> {
        let entry = self.entry_mut(id)?;
        entry.text = text.into();
        self.touch();
        Ok(())
    }

    /// Append a streamed fragment to an entry's text.
    pub fn append_entry_text(&mut self, id: &str, fragment: &str) -> TaleweaverResult<()> {
        let entry = self.entry_mut(id)?;
        entry.text.push_str(fragment);
        self.touch();
        Ok(())
    }

    /// Record the decoded actions on an entry.
    pub fn set_entry_actions(&mut self, id: &str, actions: Vec<Action>) -> TaleweaverResult<()> {
        let entry = self.entry_mut(id)?;
        entry.actions = Some(actions);
        self.touch();
        Ok(())
    }

    /// Mark an entry as having lost its structured actions block.
    pub fn flag_action_error(&mut self, id: &str) -> TaleweaverResult<()> {
        let entry = self.entry_mut(id)?;
        entry.is_action_error = true;
        self.touch();
        Ok(())
    }

    /// Record a transport error payload on an entry.
    pub fn set_entry_error(&mut self, id: &str, message: impl Into<String>) -> TaleweaverResult<()> {
        let entry = self.entry_mut(id)?;
        entry.error = Some(message.into());
        self.touch();
        Ok(())
    }

    /// Apply a model action to world state.
    pub fn apply_action(&mut self, action: &Action) {
        match action {
            Action::ModifyStat { name, value } => {
                match self.tale.stats.iter_mut().find(|s| &s.name == name) {
                    Some(stat) => stat.apply_delta(*value),
                    None => warn!(name, "MODIFY_STAT for unknown stat; ignoring"),
                }
            }
            Action::AddToInventory { item } => {
                self.tale.inventory.push(Item::new(item.clone()));
            }
            Action::RemoveFromInventory { item } => {
                match self.tale.inventory.iter().position(|i| &i.name == item) {
                    Some(index) => {
                        self.tale.inventory.remove(index);
                    }
                    None => warn!(item, "REMOVE_FROM_INVENTORY for absent item; ignoring"),
                }
            }
            Action::AddToStats { name, value } => {
                self.tale
                    .stats
                    .push(Stat::new(name.clone(), *value, INTRODUCED_STAT_RANGE));
            }
        }
        self.touch();
    }

    /// Reverse a previously-applied action.
    ///
    /// MODIFY_STAT negates its delta and reapplies with clamping, so an
    /// undo across a clamped boundary is best-effort rather than exact.
    /// ADD/REMOVE_INVENTORY are mutual inverses by name (first match);
    /// ADD_TO_STATS deletes the stat by name.
    pub fn unapply_action(&mut self, action: &Action) {
        match action {
            Action::ModifyStat { name, value } => {
                if let Some(stat) = self.tale.stats.iter_mut().find(|s| &s.name == name) {
                    stat.apply_delta(-value);
                }
            }
            Action::AddToInventory { item } => {
                if let Some(index) = self.tale.inventory.iter().position(|i| &i.name == item) {
                    self.tale.inventory.remove(index);
                }
            }
            Action::RemoveFromInventory { item } => {
                self.tale.inventory.push(Item::new(item.clone()));
            }
            Action::AddToStats { name, .. } => {
                if let Some(index) = self.tale.stats.iter().position(|s| &s.name == name) {
                    self.tale.stats.remove(index);
                }
            }
        }
        self.touch();
    }

    /// Remove the newest log entry, reversing its actions. Used when a
    /// failed turn is discarded before a retry.
    pub fn remove_last_entry(&mut self) -> Option<LogEntry> {
        let entry = self.tale.log.pop()?;
        self.unapply_entry(&entry);
        self.undone.clear();
        self.touch();
        Some(entry)
    }

    /// Undo the newest turn: reverse its actions and move it to the redo
    /// stack. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.tale.log.pop() else {
            return false;
        };
        self.unapply_entry(&entry);
        if self.undone.len() == MAX_UNDO_DEPTH {
            self.undone.remove(0);
        }
        self.undone.push(entry);
        self.touch();
        true
    }

    /// Redo the most recently undone turn: reapply its actions in order
    /// and restore it to the log. Returns false when there is nothing to
    /// redo.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.undone.pop() else {
            return false;
        };
        if let Some(actions) = entry.actions.clone() {
            for action in &actions {
                self.apply_action(action);
            }
        }
        debug!(id = %entry.id, "Restoring undone entry");
        self.tale.log.push(entry);
        self.touch();
        true
    }

    /// Whether redo has anything to restore.
    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    // Reverse an entry's actions in reverse order, so stacked effects on
    // the same stat unwind correctly.
    fn unapply_entry(&mut self, entry: &LogEntry) {
        if let Some(actions) = entry.actions.clone() {
            for action in actions.iter().rev() {
                self.unapply_action(action);
            }
        }
    }

    fn entry_mut(&mut self, id: &str) -> TaleweaverResult<&mut LogEntry> {
        self.tale
            .log
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| TaleError::new(TaleErrorKind::EntryNotFound(id.to_string())).into())
    }

    fn touch(&mut self) {
        self.tale.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taleweaver_core::{LogEntryMode, LogEntryRole};

    fn session_with_stats() -> TaleSession {
        let mut tale = Tale::new("test");
        tale.stats = vec![Stat::new("HP", 100, [0, 100])];
        TaleSession::new(tale)
    }

    fn gm_entry_with_actions(actions: Vec<Action>) -> LogEntry {
        let mut entry = LogEntry::gm(None);
        entry.text = "something happens".to_string();
        entry.actions = Some(actions);
        entry
    }

    #[test]
    fn modify_stat_applies_and_clamps() {
        let mut session = session_with_stats();
        session.apply_action(&Action::ModifyStat {
            name: "HP".to_string(),
            value: -150,
        });
        assert_eq!(session.tale().stats[0].value, 0);
    }

    #[test]
    fn inventory_actions_are_mutual_inverses() {
        let mut session = session_with_stats();
        let add = Action::AddToInventory {
            item: "Torch".to_string(),
        };
        session.apply_action(&add);
        assert_eq!(session.tale().inventory.len(), 1);
        session.unapply_action(&add);
        assert!(session.tale().inventory.is_empty());
    }

    #[test]
    fn remove_from_inventory_deletes_first_match_only() {
        let mut session = session_with_stats();
        session.tale_mut().inventory =
            vec![Item::new("Torch"), Item::new("Torch"), Item::new("Rope")];
        session.apply_action(&Action::RemoveFromInventory {
            item: "Torch".to_string(),
        });
        let names: Vec<_> = session.tale().inventory.iter().map(|i| &i.name).collect();
        assert_eq!(names, ["Torch", "Rope"]);
    }

    #[test]
    fn undo_reverses_actions_and_redo_replays_them() {
        let mut session = session_with_stats();
        let entry = gm_entry_with_actions(vec![
            Action::ModifyStat {
                name: "HP".to_string(),
                value: -30,
            },
            Action::AddToInventory {
                item: "Bandage".to_string(),
            },
        ]);
        session.push_entry(entry);
        // push_entry records the entry; its actions applied by the caller
        session.apply_action(&Action::ModifyStat {
            name: "HP".to_string(),
            value: -30,
        });
        session.apply_action(&Action::AddToInventory {
            item: "Bandage".to_string(),
        });
        assert_eq!(session.tale().stats[0].value, 70);

        assert!(session.undo());
        assert_eq!(session.tale().stats[0].value, 100);
        assert!(session.tale().inventory.is_empty());
        assert!(session.tale().log.is_empty());

        assert!(session.redo());
        assert_eq!(session.tale().stats[0].value, 70);
        assert_eq!(session.tale().inventory.len(), 1);
        assert_eq!(session.tale().log.len(), 1);
    }

    #[test]
    fn add_to_stats_undo_deletes_by_name() {
        let mut session = session_with_stats();
        let entry = gm_entry_with_actions(vec![Action::AddToStats {
            name: "Mana".to_string(),
            value: 40,
        }]);
        session.push_entry(entry);
        session.apply_action(&Action::AddToStats {
            name: "Mana".to_string(),
            value: 40,
        });
        assert_eq!(session.tale().stats.len(), 2);
        assert_eq!(session.tale().stats[1].range, [0, 100]);

        assert!(session.undo());
        assert_eq!(session.tale().stats.len(), 1);
        assert!(session.redo());
        assert_eq!(session.tale().stats.len(), 2);
    }

    #[test]
    fn pushing_a_new_entry_clears_redo() {
        let mut session = session_with_stats();
        session.push_entry(gm_entry_with_actions(vec![]));
        assert!(session.undo());
        assert!(session.can_redo());
        session.push_entry(LogEntry::player("again", LogEntryMode::Do));
        assert!(!session.can_redo());
        assert!(!session.redo());
    }

    #[test]
    fn undo_depth_is_capped() {
        let mut session = session_with_stats();
        for i in 0..(MAX_UNDO_DEPTH + 10) {
            session
                .tale
                .log
                .push(LogEntry::player(format!("turn {i}"), LogEntryMode::Do));
        }
        while session.undo() {}
        assert_eq!(session.undone.len(), MAX_UNDO_DEPTH);
        // Redo rebuilds from the earliest surviving turn; the entries
        // evicted past the cap are gone for good.
        assert!(session.redo());
        assert_eq!(
            session.tale().log.last().map(|e| e.text.as_str()),
            Some("turn 0")
        );
        while session.redo() {}
        assert_eq!(session.tale().log.len(), MAX_UNDO_DEPTH);
    }

    #[test]
    fn entry_edits_touch_only_the_target() {
        let mut session = session_with_stats();
        let entry = LogEntry::gm(None);
        let id = entry.id.clone();
        session.push_entry(entry);
        session.append_entry_text(&id, "The door ").unwrap();
        session.append_entry_text(&id, "creaks open.").unwrap();
        assert_eq!(session.tale().log[0].text, "The door creaks open.");
        assert_eq!(session.tale().log[0].role, LogEntryRole::Gm);
        assert!(session.update_entry_text("missing", "x").is_err());
    }
}
