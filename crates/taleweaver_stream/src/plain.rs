//! Decoder for free-form (Story-Teller-mode) responses.
//!
//! The whole stream is narrative. Escape sequences can still be split
//! across fragment boundaries, so a small carry buffer holds any
//! trailing incomplete sequence between fragments.

use futures_util::{pin_mut, Stream, StreamExt};
use taleweaver_error::TaleweaverResult;

use crate::escape::{decode_escape_at, EscapeOutcome};
use crate::event::DecodeEvent;

/// Decode a Story-Teller-mode fragment stream into story fragments.
///
/// Each fragment is decoded together with the carry from the previous
/// one; a trailing incomplete escape becomes the new carry. When the
/// stream ends the carry is flushed verbatim, with an unterminated
/// trailing backslash emitted as a literal backslash rather than
/// dropped.
pub fn decode_plain_stream<S>(
    fragments: S,
) -> impl Stream<Item = TaleweaverResult<DecodeEvent>>
where
    S: Stream<Item = TaleweaverResult<String>>,
{
    async_stream::stream! {
        let mut carry = String::new();
        pin_mut!(fragments);
        while let Some(fragment) = fragments.next().await {
            match fragment {
                Ok(fragment) => {
                    carry.push_str(&fragment);
                    let (out, rest) = drain_decodable(&carry);
                    carry = rest;
                    if !out.is_empty() {
                        yield Ok(DecodeEvent::Story(out));
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
        if !carry.is_empty() {
            let out = flush_carry(&carry);
            if !out.is_empty() {
                yield Ok(DecodeEvent::Story(out));
            }
        }
    }
}

// Decode as much of `input` as possible; the remainder (a trailing
// incomplete escape, or nothing) becomes the next carry.
fn drain_decodable(input: &str) -> (String, String) {
    let mut out = String::new();
    let mut i = 0;
    while i < input.len() {
        let Some(ch) = input[i..].chars().next() else {
            break;
        };
        if ch == '\\' {
            match decode_escape_at(input, i) {
                EscapeOutcome::Incomplete => break,
                EscapeOutcome::Decoded { text, advance } => {
                    out.push_str(&text);
                    i += advance;
                }
            }
        } else {
            out.push(ch);
            i += ch.len_utf8();
        }
    }
    (out, input[i..].to_string())
}

// End-of-stream flush: an escape that is still incomplete can never
// complete now, so its backslash is emitted literally and scanning
// resumes one byte later.
fn flush_carry(carry: &str) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < carry.len() {
        let Some(ch) = carry[i..].chars().next() else {
            break;
        };
        if ch == '\\' {
            match decode_escape_at(carry, i) {
                EscapeOutcome::Incomplete => {
                    out.push('\\');
                    i += 1;
                }
                EscapeOutcome::Decoded { text, advance } => {
                    out.push_str(&text);
                    i += advance;
                }
            }
        } else {
            out.push(ch);
            i += ch.len_utf8();
        }
    }
    out
}
