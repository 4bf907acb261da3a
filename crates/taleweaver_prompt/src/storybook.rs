//! Story-card trigger matching and context injection.

use taleweaver_core::StoryCard;

/// Select the cards whose content should be injected for `candidate_text`.
///
/// A card is selected if it is pinned, or if any of its non-empty triggers
/// is a case-insensitive substring of `candidate_text`. Each card is
/// selected at most once, and the input list's relative order is preserved;
/// pinned-first ordering is a rendering concern, not a selection one.
///
/// # Examples
///
/// ```
/// use taleweaver_core::StoryCard;
/// use taleweaver_prompt::select_cards;
///
/// let cards = [StoryCard::new("Dragon", "A fearsome beast", vec!["dragon".into()])];
/// let selected = select_cards("The red DRAGON breathes fire", &cards);
/// assert_eq!(selected.len(), 1);
/// ```
pub fn select_cards<'a>(candidate_text: &str, cards: &'a [StoryCard]) -> Vec<&'a StoryCard> {
    let haystack = candidate_text.to_lowercase();
    cards
        .iter()
        .filter(|card| {
            card.is_pinned
                || card
                    .triggers
                    .iter()
                    .filter(|t| !t.is_empty())
                    .any(|t| haystack.contains(&t.to_lowercase()))
        })
        .collect()
}

/// Append the selected cards' content to `text` as a bracketed context
/// suffix.
///
/// Idempotent for fixed inputs: the same text and cards always produce the
/// same output. Returns `text` unchanged when nothing is selected.
pub fn inject_context(text: &str, cards: &[StoryCard]) -> String {
    let selected = select_cards(text, cards);
    if selected.is_empty() {
        return text.to_string();
    }
    let context: String = selected.iter().map(|c| c.content.as_str()).collect();
    format!("{}\n[Context: {}]", text, context)
}

/// Render the storybook system-message body for the selected cards.
///
/// Pinned cards come first, then trigger-matched cards, each title-labeled
/// exactly once. Returns `None` when nothing is selected.
pub fn render_storybook(candidate_text: &str, cards: &[StoryCard]) -> Option<String> {
    let selected = select_cards(candidate_text, cards);
    if selected.is_empty() {
        return None;
    }
    let (pinned, triggered): (Vec<&StoryCard>, Vec<&StoryCard>) =
        selected.into_iter().partition(|card| card.is_pinned);

    let mut body = String::from("**StoryBook:**");
    for card in pinned.into_iter().chain(triggered) {
        body.push('\n');
        body.push_str(&card.title);
        body.push_str(": ");
        body.push_str(&card.content);
    }
    Some(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(title: &str, triggers: &[&str]) -> StoryCard {
        StoryCard::new(
            title,
            format!("{} content", title),
            triggers.iter().map(|t| t.to_string()).collect(),
        )
    }

    #[test]
    fn multiple_matching_triggers_select_once() {
        let cards = [card("Dragon", &["dragon", "fire", "red"])];
        let selected = select_cards("the red dragon breathes fire", &cards);
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn pinned_bypasses_triggers() {
        let mut hero = card("Hero", &["never-mentioned"]);
        hero.is_pinned = true;
        let cards = [hero];
        let selected = select_cards("nothing relevant here", &cards);
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn empty_triggers_never_match() {
        let blank = card("Blank", &[""]);
        assert!(select_cards("anything at all", &[blank]).is_empty());
    }

    #[test]
    fn selection_preserves_input_order() {
        let cards = [card("Alpha", &["cave"]), card("Beta", &["cave"])];
        let selected = select_cards("into the cave", &cards);
        let titles: Vec<_> = selected.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Alpha", "Beta"]);
    }

    #[test]
    fn injection_is_idempotent_for_fixed_inputs() {
        let dragon = card("Dragon", &["dragon"]);
        let cards = vec![dragon];
        let first = inject_context("I approach the dragon", &cards);
        let second = inject_context("I approach the dragon", &cards);
        assert_eq!(first, second);
        assert!(first.ends_with("[Context: Dragon content]"));
    }

    #[test]
    fn injection_returns_text_unchanged_without_matches() {
        let dragon = card("Dragon", &["dragon"]);
        assert_eq!(inject_context("I walk on", &[dragon]), "I walk on");
    }

    #[test]
    fn storybook_orders_pinned_first() {
        let mut hero = card("Hero", &[]);
        hero.is_pinned = true;
        let dragon = card("Dragon", &["dragon"]);
        let body = render_storybook("a dragon appears", &[dragon, hero]).unwrap();
        let hero_at = body.find("Hero").unwrap();
        let dragon_at = body.find("Dragon").unwrap();
        assert!(hero_at < dragon_at);
        assert!(body.starts_with("**StoryBook:**"));
    }

    #[test]
    fn storybook_lists_each_title_once() {
        let dragon = card("Dragon", &["dragon", "fire", "red"]);
        let body = render_storybook("the red dragon breathes fire", &[dragon]).unwrap();
        assert_eq!(body.matches("Dragon").count(), 2); // title + "Dragon content"
        assert_eq!(body.matches("Dragon:").count(), 1);
    }
}
