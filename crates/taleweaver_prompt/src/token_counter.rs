//! Token counting for prompt budgeting.
//!
//! Counts are a budgeting heuristic, not transport-level truth: providers
//! may tokenize differently, so the builder treats these figures as an
//! upper-bound estimate when packing the context window.

use std::sync::OnceLock;

use taleweaver_core::ChatMessage;
use tiktoken_rs::CoreBPE;
use tracing::warn;

// TODO: pick the encoding from the active model once providers report it
const FALLBACK_BYTES_PER_TOKEN: usize = 4;

fn tokenizer() -> Option<&'static CoreBPE> {
    static TOKENIZER: OnceLock<Option<CoreBPE>> = OnceLock::new();
    TOKENIZER
        .get_or_init(|| match tiktoken_rs::cl100k_base() {
            Ok(bpe) => Some(bpe),
            Err(e) => {
                warn!(error = %e, "Failed to load cl100k_base; falling back to byte estimate");
                None
            }
        })
        .as_ref()
}

/// Count tokens in `text` using the shared `cl100k_base` tokenizer.
///
/// Pure function of `text` alone; the tokenizer is lazily initialized once
/// per process and reused. An empty string always counts as zero.
///
/// # Examples
///
/// ```
/// use taleweaver_prompt::count_tokens;
///
/// assert_eq!(count_tokens(""), 0);
/// assert!(count_tokens("Hello, world!") > 0);
/// ```
pub fn count_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    match tokenizer() {
        Some(bpe) => bpe.encode_with_special_tokens(text).len(),
        None => text.len().div_ceil(FALLBACK_BYTES_PER_TOKEN),
    }
}

/// Count tokens across a message list.
///
/// Sums `count_tokens(role) + count_tokens(content)` per message, where the
/// role is counted by its lowercase wire name.
pub fn count_message_tokens(messages: &[ChatMessage]) -> usize {
    messages
        .iter()
        .map(|m| count_tokens(m.role.wire_name()) + count_tokens(&m.content))
        .sum()
}
