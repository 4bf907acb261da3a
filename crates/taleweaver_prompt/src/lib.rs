//! Token-budgeted prompt assembly.
//!
//! This crate turns a tale snapshot (conversation log, world state,
//! storybook, scenario metadata) plus the player's new turn into a
//! transport-agnostic [`taleweaver_core::ChatRequest`] that fits the active
//! model's context window.
//!
//! Selection is strictly ordered and budget-checked: system prompt, then
//! scenario description and author's note, then triggered storybook
//! content, then as much recent history as fits, and finally the player's
//! formatted turn. Overflow is resolved by progressive exclusion and
//! reported through a warning side-channel, never a hard failure.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod compactor;
mod prompts;
mod storybook;
mod token_counter;

pub use builder::{
    build_message, LogSource, PromptOutput, PromptParams, PromptParamsBuilder,
    PromptParamsBuilderError, PromptSettings, PromptWarning, TurnInput, LOOKBACK_TARGET,
};
pub use compactor::compact_log;
pub use prompts::{
    CONTINUE_AUTHOR_NOTE, CONTINUE_SYSTEM_PROMPT, GM_SYSTEM_PROMPT, STORY_TELLER_SYSTEM_PROMPT,
};
pub use storybook::{inject_context, render_storybook, select_cards};
pub use token_counter::{count_message_tokens, count_tokens};
