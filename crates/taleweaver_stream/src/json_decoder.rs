//! Incremental decoder for structured (GM-mode) responses.
//!
//! The model answers with one JSON object of the shape
//! `{"story": "...", "actions": [...]}` delivered as arbitrary text
//! fragments. Narrative must reach the player as it streams, so the
//! decoder watches an accumulating buffer for the story field and yields
//! newly-decoded story text as soon as it appears; the actions array is
//! only parsed once the stream has fully ended.

use futures_util::{pin_mut, Stream, StreamExt};
use serde_json::Value;
use taleweaver_core::Action;
use taleweaver_error::TaleweaverResult;
use tracing::{debug, warn};

use crate::escape::{decode_escape_at, EscapeOutcome};
use crate::event::DecodeEvent;

// Literal opening of the story field as the model is instructed to emit it.
const STORY_MARKER: &str = "\"story\": \"";

/// Decode a GM-mode fragment stream into story fragments plus a final
/// actions event.
///
/// The buffer is append-only, so the story span is re-scanned from its
/// start on every fragment and only the suffix beyond the previously
/// yielded length is emitted; redundant scanning is the simplest correct
/// approach at expected narrative sizes. A truncated escape sequence at
/// the buffer edge halts the scan until more input arrives.
///
/// A source error ends the stream immediately with that error; no
/// actions are ever emitted for an interrupted response.
pub fn decode_json_stream<S>(
    fragments: S,
) -> impl Stream<Item = TaleweaverResult<DecodeEvent>>
where
    S: Stream<Item = TaleweaverResult<String>>,
{
    async_stream::stream! {
        let mut buffer = String::new();
        let mut in_story = false;
        let mut story_done = false;
        let mut yielded_len = 0usize;

        pin_mut!(fragments);
        while let Some(fragment) = fragments.next().await {
            let fragment = match fragment {
                Ok(fragment) => fragment,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            buffer.push_str(&fragment);
            if story_done {
                continue;
            }
            if !in_story {
                in_story = buffer.contains(STORY_MARKER);
            }
            if in_story {
                let start = buffer
                    .find(STORY_MARKER)
                    .map(|p| p + STORY_MARKER.len())
                    .unwrap_or(buffer.len());
                let (decoded, done) = decode_story_span(&buffer[start..]);
                story_done = done;
                if decoded.len() > yielded_len {
                    yield Ok(DecodeEvent::Story(decoded[yielded_len..].to_string()));
                    yielded_len = decoded.len();
                }
            }
        }

        match parse_actions(&buffer) {
            ActionsOutcome::Actions(actions) => {
                debug!(count = actions.len(), "Recovered actions block");
                yield Ok(DecodeEvent::Actions(actions));
            }
            ActionsOutcome::Absent => {}
            ActionsOutcome::Unrecoverable => yield Ok(DecodeEvent::ActionParseError),
        }
    }
}

// Decode the story value from its content start up to the first unescaped
// quote. Returns the decoded text and whether the closing quote was seen.
fn decode_story_span(src: &str) -> (String, bool) {
    let mut out = String::new();
    let mut i = 0;
    while i < src.len() {
        let Some(ch) = src[i..].chars().next() else {
            break;
        };
        if ch == '\\' {
            match decode_escape_at(src, i) {
                EscapeOutcome::Incomplete => break,
                EscapeOutcome::Decoded { text, advance } => {
                    out.push_str(&text);
                    i += advance;
                }
            }
        } else if ch == '"' {
            return (out, true);
        } else {
            out.push(ch);
            i += ch.len_utf8();
        }
    }
    (out, false)
}

enum ActionsOutcome {
    Actions(Vec<Action>),
    Absent,
    Unrecoverable,
}

// Whole-buffer parse first; on failure fall back to the substring between
// the first `{` and the last `}` (providers sometimes wrap the object in
// prose or code fences).
fn parse_actions(buffer: &str) -> ActionsOutcome {
    if let Ok(value) = serde_json::from_str::<Value>(buffer) {
        return actions_from(&value);
    }
    warn!("Response was not valid JSON; extracting the outermost object");
    let (Some(start), Some(end)) = (buffer.find('{'), buffer.rfind('}')) else {
        warn!("No JSON object found in response");
        return ActionsOutcome::Unrecoverable;
    };
    if end < start {
        return ActionsOutcome::Unrecoverable;
    }
    match serde_json::from_str::<Value>(&buffer[start..=end]) {
        Ok(value) => actions_from(&value),
        Err(e) => {
            warn!(error = %e, "Extracted object is not valid JSON either");
            ActionsOutcome::Unrecoverable
        }
    }
}

fn actions_from(value: &Value) -> ActionsOutcome {
    match value.get("actions") {
        Some(Value::Array(elements)) => ActionsOutcome::Actions(Action::from_array(elements)),
        Some(other) => {
            warn!(actions = %other, "Actions field is not an array; ignoring");
            ActionsOutcome::Absent
        }
        None => ActionsOutcome::Absent,
    }
}
