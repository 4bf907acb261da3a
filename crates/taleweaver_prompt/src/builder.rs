//! The token-budgeted prompt builder.

use async_trait::async_trait;
use derive_builder::Builder;
use taleweaver_core::{
    ChatMessage, ChatRequest, GameMode, Item, LlmModel, LogEntry, LogEntryMode, LogEntryRole,
    ResponseMode, Role, SamplingOptions, Stat, StoryCard,
};
use taleweaver_error::TaleweaverResult;
use tracing::{debug, warn};

use crate::compactor::compact_log;
use crate::prompts::{
    CONTINUE_AUTHOR_NOTE, CONTINUE_SYSTEM_PROMPT, GM_SYSTEM_PROMPT, STORY_TELLER_SYSTEM_PROMPT,
};
use crate::storybook::{inject_context, render_storybook};
use crate::token_counter::count_message_tokens;

/// How many log entries the builder wants loaded before packing history.
///
/// When fewer are in memory and older entries exist on disk, the builder
/// asks its [`LogSource`] to page in up to this many before selection.
pub const LOOKBACK_TARGET: usize = 100;

/// Pages older log entries in from the persistence layer.
///
/// The builder only reads snapshots; the host owns the live log. This
/// collaborator lets the builder extend its snapshot when the loaded
/// window is too short to fill the context budget.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Ensure at least `min_len` entries are loaded (or all that exist),
    /// returning the refreshed window, oldest first.
    async fn ensure_loaded(&self, min_len: usize) -> TaleweaverResult<Vec<LogEntry>>;
}

/// The player's new turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnInput {
    /// Raw input text; may be empty for a continue turn
    pub text: String,
    /// Narrative style of the input
    pub mode: LogEntryMode,
}

impl TurnInput {
    /// Create a new turn input.
    pub fn new(text: impl Into<String>, mode: LogEntryMode) -> Self {
        Self {
            text: text.into(),
            mode,
        }
    }
}

/// Settings snapshot consumed by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptSettings {
    /// User-configured context window in tokens
    pub context_window: usize,
    /// Configured output token budget (`max_tokens` on the request)
    pub max_tokens: u32,
}

/// Non-fatal diagnostics raised while packing the prompt.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum PromptWarning {
    /// The model's context window is smaller than the configured one, so
    /// fewer output tokens are effectively available.
    #[display(
        "Model context is smaller than the configured window; only {} output tokens are available.",
        max_tokens
    )]
    ReducedOutputBudget {
        /// The configured output token figure
        max_tokens: u32,
    },
    /// Pinned cards use so much of the budget that nothing else fits.
    #[display(
        "Pinned cards use {} tokens and consume the entire prompt budget.",
        pinned_tokens
    )]
    PinnedBudget {
        /// Token cost of the rendered storybook message
        pinned_tokens: usize,
    },
}

/// Everything the builder needs to assemble one request.
///
/// A pure snapshot: the builder never reads live state. The orchestrator
/// captures settings and world state and passes them in.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), pattern = "owned")]
pub struct PromptParams {
    /// Loaded log window, oldest first
    pub log: Vec<LogEntry>,
    /// Index of the oldest loaded entry within the full persisted log
    #[builder(default)]
    pub oldest_loaded_index: usize,
    /// Total number of persisted entries
    #[builder(default)]
    pub total_log_count: usize,
    /// Current stats
    #[builder(default)]
    pub stats: Vec<Stat>,
    /// Current inventory
    #[builder(default)]
    pub inventory: Vec<Item>,
    /// The player's new turn
    pub turn: TurnInput,
    /// Scenario description; skipped when empty
    #[builder(default)]
    pub description: String,
    /// Scenario author's note; skipped when empty
    #[builder(default)]
    pub author_note: String,
    /// Storybook for trigger matching
    #[builder(default)]
    pub story_cards: Vec<StoryCard>,
    /// Target model
    pub model: LlmModel,
    /// Sampling options forwarded onto the request
    #[builder(default)]
    pub options: SamplingOptions,
    /// Active game mode
    #[builder(default)]
    pub game_mode: GameMode,
    /// Requested response mode; forced to free-form in Story-Teller mode
    #[builder(default)]
    pub response_mode: ResponseMode,
    /// Settings snapshot
    pub settings: PromptSettings,
}

/// The assembled request plus any non-fatal warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptOutput {
    /// The transport-agnostic chat request
    pub request: ChatRequest,
    /// Budget diagnostics for the host to surface
    pub warnings: Vec<PromptWarning>,
}

/// Assemble a chat request from a tale snapshot and the player's turn.
///
/// Messages are inserted in a strict order: system prompt, description,
/// author's note, storybook, history, continuation note, user turn. The
/// system prompt and the user turn are always sent; everything between
/// them is budget-checked against `min(model context, configured window)`
/// with the user message's cost reserved up front. History is walked
/// newest to oldest and older entries are silently dropped past the
/// budget. A request whose mandatory parts alone exceed the budget is a
/// soft overflow, not an error: sending an oversized request beats
/// sending one without the player's turn. If the caller already logged
/// the current turn (and the empty entry the reply will stream into),
/// those trailing entries are excluded from history so the turn appears
/// once, as the formatted user message.
///
/// # Errors
///
/// Returns an error only when paging older history fails. Budget overflow
/// is never an error; it surfaces in [`PromptOutput::warnings`].
pub async fn build_message(
    mut params: PromptParams,
    log_source: Option<&dyn LogSource>,
) -> TaleweaverResult<PromptOutput> {
    let mut log = std::mem::take(&mut params.log);
    if let Some(source) = log_source {
        let older_exist = params.oldest_loaded_index > 0 && params.total_log_count > log.len();
        if older_exist && log.len() < LOOKBACK_TARGET {
            debug!(
                loaded = log.len(),
                total = params.total_log_count,
                "Paging in older history before prompt assembly"
            );
            log = source.ensure_loaded(LOOKBACK_TARGET).await?;
        }
    }

    let settings = params.settings;
    let model_context = params
        .model
        .context_length
        .unwrap_or(settings.context_window);
    let budget = model_context.min(settings.context_window);

    let mut warnings = Vec::new();
    if model_context < settings.context_window {
        warn!(
            model_context,
            configured = settings.context_window,
            "Model context is smaller than the configured window"
        );
        warnings.push(PromptWarning::ReducedOutputBudget {
            max_tokens: settings.max_tokens,
        });
    }

    // The user message is computed first so its cost can be reserved
    // against every other insertion.
    let user_message = build_user_message(&params.turn, &log, &params);
    let user_cost = count_message_tokens(std::slice::from_ref(&user_message));

    let mut messages: Vec<ChatMessage> = Vec::new();
    let mut used = 0usize;
    let try_push = |messages: &mut Vec<ChatMessage>, used: &mut usize, msg: ChatMessage| {
        let cost = count_message_tokens(std::slice::from_ref(&msg));
        if *used + cost + user_cost <= budget {
            messages.push(msg);
            *used += cost;
            true
        } else {
            false
        }
    };

    // The system prompt and the user turn are mandatory; only the context
    // between them competes for the remaining budget.
    let system_text = match params.game_mode {
        GameMode::Gm => GM_SYSTEM_PROMPT,
        GameMode::StoryTeller => STORY_TELLER_SYSTEM_PROMPT,
    };
    let system_message = ChatMessage::new(Role::System, system_text);
    used += count_message_tokens(std::slice::from_ref(&system_message));
    messages.push(system_message);

    if !params.description.is_empty() {
        try_push(
            &mut messages,
            &mut used,
            ChatMessage::new(Role::System, params.description.clone()),
        );
    }
    if !params.author_note.is_empty() {
        try_push(
            &mut messages,
            &mut used,
            ChatMessage::new(Role::System, params.author_note.clone()),
        );
    }

    let candidate: String = log
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    if let Some(body) = render_storybook(&candidate, &params.story_cards) {
        let msg = ChatMessage::new(Role::System, body);
        let cost = count_message_tokens(std::slice::from_ref(&msg));
        if !try_push(&mut messages, &mut used, msg) {
            let any_pinned = params.story_cards.iter().any(|c| c.is_pinned);
            if any_pinned {
                warn!(
                    pinned_tokens = cost,
                    budget, "Pinned cards consume the entire prompt budget"
                );
                warnings.push(PromptWarning::PinnedBudget {
                    pinned_tokens: cost,
                });
            }
        }
    }

    // The caller may already have logged this turn, plus the empty entry
    // the narration will stream into; neither belongs in history or the
    // user turn would echo twice.
    let mut history_log: &[LogEntry] = &log;
    if let [rest @ .., last] = history_log {
        if last.role == LogEntryRole::Gm && last.text.is_empty() {
            history_log = rest;
        }
    }
    if let [rest @ .., last] = history_log {
        if last.role == LogEntryRole::Player
            && last.text == params.turn.text
            && last.mode == params.turn.mode
        {
            history_log = rest;
        }
    }

    // History, newest first, prepended while it still fits.
    let mut history: Vec<ChatMessage> = Vec::new();
    let mut history_cost = 0usize;
    for turn in compact_log(history_log).iter().rev() {
        let cost = count_message_tokens(std::slice::from_ref(turn));
        if used + history_cost + cost + user_cost > budget {
            debug!(kept = history.len(), "History budget reached; older entries dropped");
            break;
        }
        history.push(turn.clone());
        history_cost += cost;
    }
    history.reverse();
    used += history_cost;
    messages.extend(history);

    if params.turn.mode == LogEntryMode::Continue {
        try_push(
            &mut messages,
            &mut used,
            ChatMessage::new(Role::System, CONTINUE_AUTHOR_NOTE),
        );
    }

    messages.push(user_message);

    let response_mode = match params.game_mode {
        GameMode::StoryTeller => ResponseMode::FreeForm,
        GameMode::Gm => params.response_mode,
    };

    Ok(PromptOutput {
        request: ChatRequest {
            model: params.model.id,
            messages,
            stream: true,
            max_tokens: Some(settings.max_tokens),
            options: params.options,
            response_mode,
        },
        warnings,
    })
}

fn build_user_message(turn: &TurnInput, log: &[LogEntry], params: &PromptParams) -> ChatMessage {
    let payload = if turn.mode == LogEntryMode::Continue && turn.text.is_empty() {
        log.iter()
            .rev()
            .find(|e| e.role == LogEntryRole::Gm && !e.text.is_empty())
            .map(|e| e.text.clone())
            .unwrap_or_else(|| CONTINUE_SYSTEM_PROMPT.to_string())
    } else {
        turn.text.clone()
    };

    let formatted = match turn.mode {
        LogEntryMode::Do => format!("Action: {}", payload),
        LogEntryMode::Say => format!("You say: \"{}\"", payload),
        LogEntryMode::Direct => format!("[Director's Note: {}]", payload),
        LogEntryMode::Story | LogEntryMode::Continue => payload,
    };
    let injected = inject_context(&formatted, &params.story_cards);

    let content = match params.game_mode {
        GameMode::Gm => format!(
            "{}\n\n{}",
            game_state_block(&params.stats, &params.inventory),
            injected
        ),
        GameMode::StoryTeller => injected,
    };
    ChatMessage::new(Role::User, content)
}

// Renders `Stats: []` / `Inventory: []` literally when empty; the model is
// told the state is empty rather than left to guess.
fn game_state_block(stats: &[Stat], inventory: &[Item]) -> String {
    let stats_json = serde_json::to_string(stats).unwrap_or_else(|_| "[]".to_string());
    let names: Vec<&str> = inventory.iter().map(|i| i.name.as_str()).collect();
    let inventory_json = serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string());
    format!(
        "**Game State:**\n- Stats: {}\n- Inventory: {}",
        stats_json, inventory_json
    )
}
