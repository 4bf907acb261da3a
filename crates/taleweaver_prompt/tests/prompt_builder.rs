//! End-to-end tests for prompt assembly.

use std::sync::Mutex;

use async_trait::async_trait;
use taleweaver_core::{
    GameMode, Item, LlmModel, LogEntry, LogEntryMode, ResponseMode, Role, SamplingOptions, Stat,
    StoryCard,
};
use taleweaver_error::TaleweaverResult;
use taleweaver_prompt::{
    build_message, LogSource, PromptParams, PromptParamsBuilder, PromptSettings, PromptWarning,
    TurnInput, CONTINUE_AUTHOR_NOTE, GM_SYSTEM_PROMPT, STORY_TELLER_SYSTEM_PROMPT,
    LOOKBACK_TARGET,
};

fn settings() -> PromptSettings {
    PromptSettings {
        context_window: 8000,
        max_tokens: 250,
    }
}

fn model() -> LlmModel {
    LlmModel::new("test/model", "Test Model", None)
}

fn params(turn: TurnInput) -> PromptParamsBuilder {
    PromptParamsBuilder::default()
        .log(Vec::new())
        .turn(turn)
        .model(model())
        .settings(settings())
}

fn build(params: PromptParams) -> taleweaver_prompt::PromptOutput {
    futures_block(build_message(params, None)).unwrap()
}

fn futures_block<F: std::future::Future>(fut: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(fut)
}

fn gm_entry(text: &str) -> LogEntry {
    let mut entry = LogEntry::gm(None);
    entry.text = text.to_string();
    entry
}

#[test]
fn minimal_prompt_is_system_then_user() {
    let out = build(
        params(TurnInput::new("open the door", LogEntryMode::Do))
            .build()
            .unwrap(),
    );
    let messages = &out.request.messages;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(messages[0].content, GM_SYSTEM_PROMPT);
    let user = &messages[1];
    assert_eq!(user.role, Role::User);
    assert!(user.content.contains("Action: open the door"));
    assert!(out.warnings.is_empty());
}

#[test]
fn gm_mode_prefixes_empty_game_state() {
    let out = build(
        params(TurnInput::new("look", LogEntryMode::Do))
            .build()
            .unwrap(),
    );
    let user = out.request.messages.last().unwrap();
    assert!(user.content.starts_with("**Game State:**\n- Stats: []\n- Inventory: []"));
}

#[test]
fn game_state_lists_stats_and_inventory() {
    let out = build(
        params(TurnInput::new("look", LogEntryMode::Do))
            .stats(vec![Stat::new("HP", 10, [0, 20])])
            .inventory(vec![Item::new("Sword")])
            .build()
            .unwrap(),
    );
    let user = out.request.messages.last().unwrap();
    assert!(user.content.contains("\"name\":\"HP\""));
    assert!(user.content.contains("\"Sword\""));
}

#[test]
fn description_and_author_note_follow_the_system_prompt() {
    let out = build(
        params(TurnInput::new("look", LogEntryMode::Do))
            .description("A damp cave system.")
            .author_note("Keep the tone grim.")
            .build()
            .unwrap(),
    );
    let messages = &out.request.messages;
    assert_eq!(messages[1].content, "A damp cave system.");
    assert_eq!(messages[2].content, "Keep the tone grim.");
    assert_eq!(messages[1].role, Role::System);
    assert_eq!(messages[2].role, Role::System);
}

#[test]
fn story_teller_mode_has_no_game_state_and_forces_free_form() {
    let out = build(
        params(TurnInput::new("look", LogEntryMode::Do))
            .game_mode(GameMode::StoryTeller)
            .response_mode(ResponseMode::ResponseFormat)
            .stats(vec![Stat::new("HP", 10, [0, 20])])
            .build()
            .unwrap(),
    );
    assert_eq!(out.request.messages[0].content, STORY_TELLER_SYSTEM_PROMPT);
    assert_eq!(out.request.response_mode, ResponseMode::FreeForm);
    let user = out.request.messages.last().unwrap();
    assert!(!user.content.contains("Game State"));
}

#[test]
fn input_modes_format_the_user_turn() {
    let cases = [
        (LogEntryMode::Do, "sneak past", "Action: sneak past"),
        (LogEntryMode::Say, "hello there", "You say: \"hello there\""),
        (
            LogEntryMode::Direct,
            "more dragons",
            "[Director's Note: more dragons]",
        ),
        (LogEntryMode::Story, "The rain stopped.", "The rain stopped."),
    ];
    for (mode, text, expected) in cases {
        let out = build(params(TurnInput::new(text, mode)).build().unwrap());
        let user = out.request.messages.last().unwrap();
        assert!(
            user.content.ends_with(expected),
            "mode {mode:?}: got {:?}",
            user.content
        );
    }
}

#[test]
fn continue_turn_repeats_last_gm_text_and_appends_the_note() {
    let log = vec![
        LogEntry::player("enter the cave", LogEntryMode::Do),
        gm_entry("The cave yawns before you."),
    ];
    let out = build(
        params(TurnInput::new("", LogEntryMode::Continue))
            .log(log)
            .build()
            .unwrap(),
    );
    let messages = &out.request.messages;
    let user = messages.last().unwrap();
    assert!(user.content.contains("The cave yawns before you."));
    assert_eq!(messages[messages.len() - 2].content, CONTINUE_AUTHOR_NOTE);
    assert_eq!(messages[messages.len() - 2].role, Role::System);
}

#[test]
fn history_appears_between_system_and_user() {
    let log = vec![
        LogEntry::player("enter the cave", LogEntryMode::Do),
        gm_entry("The cave yawns before you."),
    ];
    let out = build(
        params(TurnInput::new("light a torch", LogEntryMode::Do))
            .log(log)
            .build()
            .unwrap(),
    );
    let messages = &out.request.messages;
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[1].role, Role::User);
    assert_eq!(messages[1].content, "enter the cave");
    assert_eq!(messages[2].role, Role::Assistant);
    assert_eq!(messages[2].content, "The cave yawns before you.");
}

#[test]
fn chained_gm_entries_collapse_into_one_assistant_message() {
    let first = LogEntry::gm(None);
    let chain = first.chain_id.clone();
    let mut first = first;
    first.text = "The dragon stirs. ".to_string();
    let mut second = LogEntry::gm(chain);
    second.text = "It opens one eye.".to_string();

    let out = build(
        params(TurnInput::new("freeze", LogEntryMode::Do))
            .log(vec![first, second])
            .build()
            .unwrap(),
    );
    let assistants: Vec<_> = out
        .request
        .messages
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .collect();
    assert_eq!(assistants.len(), 1);
    assert_eq!(assistants[0].content, "The dragon stirs. It opens one eye.");
}

#[test]
fn duplicate_trailing_player_entry_is_not_sent_twice() {
    let log = vec![LogEntry::player("look around", LogEntryMode::Do)];
    let out = build(
        params(TurnInput::new("look around", LogEntryMode::Do))
            .log(log)
            .build()
            .unwrap(),
    );
    let echoes = out
        .request
        .messages
        .iter()
        .filter(|m| m.role == Role::User && m.content.contains("look around"))
        .count();
    assert_eq!(echoes, 1);
}

#[test]
fn in_flight_turn_is_filtered_from_history() {
    // The orchestrator logs the player entry and an empty entry for the
    // narration to stream into before assembling the request.
    let log = vec![
        LogEntry::player("attack the ogre", LogEntryMode::Do),
        LogEntry::gm(None),
    ];
    let out = build(
        params(TurnInput::new("attack the ogre", LogEntryMode::Do))
            .log(log)
            .build()
            .unwrap(),
    );
    let echoes = out
        .request
        .messages
        .iter()
        .filter(|m| m.content.contains("attack the ogre"))
        .count();
    assert_eq!(echoes, 1);
    let last = out.request.messages.last().unwrap();
    assert_eq!(last.role, Role::User);
    assert!(last.content.contains("Action: attack the ogre"));
}

#[test]
fn pinned_card_is_injected_without_a_trigger_match() {
    let mut card = StoryCard::new("The Curse", "Everyone here is cursed.", vec![]);
    card.is_pinned = true;
    let out = build(
        params(TurnInput::new("look", LogEntryMode::Do))
            .story_cards(vec![card])
            .build()
            .unwrap(),
    );
    let storybook = out
        .request
        .messages
        .iter()
        .find(|m| m.content.starts_with("**StoryBook:**"))
        .expect("storybook message");
    assert!(storybook.content.contains("The Curse: Everyone here is cursed."));
}

#[test]
fn card_triggers_match_recent_log_text() {
    let triggered = StoryCard::new(
        "Dragon",
        "The dragon guards the hoard.",
        vec!["dragon".to_string()],
    );
    let dormant = StoryCard::new("Kraken", "Deep sea terror.", vec!["kraken".to_string()]);
    let out = build(
        params(TurnInput::new("draw my sword", LogEntryMode::Do))
            .log(vec![gm_entry("A Dragon circles overhead.")])
            .story_cards(vec![triggered, dormant])
            .build()
            .unwrap(),
    );
    let storybook = out
        .request
        .messages
        .iter()
        .find(|m| m.content.starts_with("**StoryBook:**"))
        .expect("storybook message");
    assert!(storybook.content.contains("Dragon: The dragon guards the hoard."));
    assert!(!storybook.content.contains("Kraken"));
}

#[test]
fn small_window_drops_oldest_history_first() {
    let log: Vec<LogEntry> = (0..30)
        .map(|i| gm_entry(&format!("Turn {i}: {}", "the road goes ever on ".repeat(8))))
        .collect();
    let out = build(
        params(TurnInput::new("go on", LogEntryMode::Do))
            .log(log)
            .game_mode(GameMode::StoryTeller)
            .settings(PromptSettings {
                context_window: 300,
                max_tokens: 250,
            })
            .build()
            .unwrap(),
    );
    let joined: String = out
        .request
        .messages
        .iter()
        .map(|m| m.content.as_str())
        .collect();
    assert!(joined.contains("Turn 29:"));
    assert!(!joined.contains("Turn 0:"));
}

#[test]
fn shrinking_the_window_never_adds_messages() {
    let log: Vec<LogEntry> = (0..20)
        .map(|i| gm_entry(&format!("Turn {i}: {}", "a long winding tale ".repeat(6))))
        .collect();
    let mut previous = usize::MAX;
    for window in [4000usize, 800, 400, 200] {
        let out = build(
            params(TurnInput::new("go on", LogEntryMode::Do))
                .log(log.clone())
                .game_mode(GameMode::StoryTeller)
                .settings(PromptSettings {
                    context_window: window,
                    max_tokens: 250,
                })
                .build()
                .unwrap(),
        );
        let count = out.request.messages.len();
        assert!(count <= previous, "window {window} grew the prompt");
        previous = count;
    }
}

#[test]
fn small_model_context_raises_a_warning() {
    let out = build(
        params(TurnInput::new("look", LogEntryMode::Do))
            .model(LlmModel::new("test/tiny", "Tiny", Some(500)))
            .build()
            .unwrap(),
    );
    assert!(out
        .warnings
        .contains(&PromptWarning::ReducedOutputBudget { max_tokens: 250 }));
}

#[test]
fn oversized_pinned_cards_raise_a_warning() {
    let mut card = StoryCard::new("Atlas", "geography of the realm ".repeat(60), vec![]);
    card.is_pinned = true;
    let out = build(
        params(TurnInput::new("look", LogEntryMode::Do))
            .story_cards(vec![card])
            .settings(PromptSettings {
                context_window: 100,
                max_tokens: 250,
            })
            .build()
            .unwrap(),
    );
    assert!(out
        .warnings
        .iter()
        .any(|w| matches!(w, PromptWarning::PinnedBudget { .. })));
    assert!(!out
        .request
        .messages
        .iter()
        .any(|m| m.content.starts_with("**StoryBook:**")));
}

#[test]
fn user_turn_survives_even_when_it_alone_overflows() {
    let out = build(
        params(TurnInput::new("word ".repeat(200), LogEntryMode::Story))
            .settings(PromptSettings {
                context_window: 50,
                max_tokens: 250,
            })
            .build()
            .unwrap(),
    );
    let last = out.request.messages.last().unwrap();
    assert_eq!(last.role, Role::User);
    assert!(last.content.contains("word word"));
}

struct RecordingSource {
    requested: Mutex<Option<usize>>,
    full_log: Vec<LogEntry>,
}

#[async_trait]
impl LogSource for RecordingSource {
    async fn ensure_loaded(&self, min_len: usize) -> TaleweaverResult<Vec<LogEntry>> {
        *self.requested.lock().unwrap() = Some(min_len);
        Ok(self.full_log.clone())
    }
}

#[tokio::test]
async fn short_window_pages_in_older_history() {
    let full_log: Vec<LogEntry> = (0..60).map(|i| gm_entry(&format!("Turn {i}."))).collect();
    let source = RecordingSource {
        requested: Mutex::new(None),
        full_log: full_log.clone(),
    };
    let params = params(TurnInput::new("go on", LogEntryMode::Do))
        .log(full_log[40..].to_vec())
        .oldest_loaded_index(40usize)
        .total_log_count(60usize)
        .build()
        .unwrap();
    let out = build_message(params, Some(&source)).await.unwrap();
    assert_eq!(*source.requested.lock().unwrap(), Some(LOOKBACK_TARGET));
    let joined: String = out
        .request
        .messages
        .iter()
        .map(|m| m.content.as_str())
        .collect();
    assert!(joined.contains("Turn 0."));
}

#[tokio::test]
async fn full_window_does_not_page() {
    let source = RecordingSource {
        requested: Mutex::new(None),
        full_log: Vec::new(),
    };
    let params = params(TurnInput::new("go on", LogEntryMode::Do))
        .log(vec![gm_entry("Turn 0.")])
        .oldest_loaded_index(0usize)
        .total_log_count(1usize)
        .build()
        .unwrap();
    build_message(params, Some(&source)).await.unwrap();
    assert_eq!(*source.requested.lock().unwrap(), None);
}

#[test]
fn request_carries_sampling_options_and_stream_flag() {
    let out = build(
        params(TurnInput::new("look", LogEntryMode::Do))
            .options(SamplingOptions {
                temperature: Some(0.7),
                ..SamplingOptions::default()
            })
            .build()
            .unwrap(),
    );
    assert_eq!(out.request.model, "test/model");
    assert!(out.request.stream);
    assert_eq!(out.request.max_tokens, Some(250));
    assert_eq!(out.request.options.temperature, Some(0.7));
}
