//! History compaction: folding chained log entries into logical turns.

use taleweaver_core::{ChatMessage, LogEntry, LogEntryRole, Role};

/// Fold a log into the logical turns sent to the model.
///
/// Consecutive GM entries sharing a chain key collapse into one assistant
/// message whose content is their texts concatenated in order. Player
/// entries never merge. Merged assistant turns whose content is empty,
/// whitespace, or an ellipsis placeholder are dropped. A single stable
/// forward pass; output order matches input order.
///
/// # Examples
///
/// ```
/// use taleweaver_core::{LogEntry, LogEntryMode};
/// use taleweaver_prompt::compact_log;
///
/// let mut a = LogEntry::gm(Some("c1".into()));
/// a.text = "Part 1".into();
/// let mut b = LogEntry::gm(Some("c1".into()));
/// b.text = " Part 2".into();
///
/// let turns = compact_log(&[a, b]);
/// assert_eq!(turns.len(), 1);
/// assert_eq!(turns[0].content, "Part 1 Part 2");
/// ```
pub fn compact_log(entries: &[LogEntry]) -> Vec<ChatMessage> {
    let mut turns: Vec<ChatMessage> = Vec::new();
    let mut open_chain: Option<String> = None;

    for entry in entries {
        match entry.role {
            LogEntryRole::Player => {
                open_chain = None;
                turns.push(ChatMessage::new(Role::User, entry.text.clone()));
            }
            LogEntryRole::Gm => {
                let key = entry.chain_key();
                match (open_chain.as_deref(), turns.last_mut()) {
                    (Some(chain), Some(last)) if chain == key => {
                        last.content.push_str(&entry.text);
                    }
                    _ => {
                        turns.push(ChatMessage::new(Role::Assistant, entry.text.clone()));
                        open_chain = Some(key.to_string());
                    }
                }
            }
        }
    }

    turns.retain(|turn| turn.role != Role::Assistant || !is_placeholder(&turn.content));
    turns
}

// "..." and "…" are placeholder turns left by aborted or empty generations.
fn is_placeholder(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed.chars().all(|c| c == '.' || c == '…')
}

#[cfg(test)]
mod tests {
    use super::*;
    use taleweaver_core::LogEntryMode;

    fn gm(text: &str, chain: Option<&str>) -> LogEntry {
        let mut entry = LogEntry::gm(chain.map(str::to_string));
        entry.text = text.to_string();
        entry
    }

    fn player(text: &str) -> LogEntry {
        LogEntry::player(text, LogEntryMode::Say)
    }

    #[test]
    fn same_chain_merges_in_order() {
        let turns = compact_log(&[gm("Part 1", Some("c1")), gm(" Part 2", Some("c1"))]);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::Assistant);
        assert_eq!(turns[0].content, "Part 1 Part 2");
    }

    #[test]
    fn different_chains_stay_separate() {
        let turns = compact_log(&[gm("One", Some("c1")), gm("Two", Some("c2"))]);
        assert_eq!(turns.len(), 2);
    }

    #[test]
    fn player_breaks_a_chain() {
        let turns = compact_log(&[
            gm("Before", Some("c1")),
            player("Hello"),
            gm("After", Some("c1")),
        ]);
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1].role, Role::User);
    }

    #[test]
    fn placeholder_turns_are_dropped() {
        let turns = compact_log(&[gm("...", None), gm("   ", None), gm("Real content", None)]);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].content, "Real content");
    }

    #[test]
    fn singleton_without_chain_id_uses_own_id() {
        let mut a = LogEntry::gm(None);
        a.chain_id = None;
        a.text = "One".to_string();
        let mut b = LogEntry::gm(None);
        b.chain_id = None;
        b.text = "Two".to_string();
        let turns = compact_log(&[a, b]);
        assert_eq!(turns.len(), 2);
    }

    #[test]
    fn player_entries_never_merge() {
        let turns = compact_log(&[player("One"), player("Two")]);
        assert_eq!(turns.len(), 2);
    }
}
