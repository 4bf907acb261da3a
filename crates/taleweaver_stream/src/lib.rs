//! Incremental decoders for streamed model output.
//!
//! A model response arrives as an ordered sequence of text fragments cut
//! at arbitrary byte positions. This crate turns that sequence into an
//! ordered sequence of [`DecodeEvent`]s: narrative fragments as soon as
//! they can be decoded, and (in GM mode) a single structured actions
//! result once the stream has fully ended.
//!
//! The decoders are pure with respect to world state: they read
//! fragments and return data. Cancellation belongs to the fragment
//! source; when the source ends early the decoders finish promptly
//! without emitting actions.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod escape;
mod event;
mod json_decoder;
mod plain;

pub use escape::{decode_escape_at, EscapeOutcome};
pub use event::DecodeEvent;
pub use json_decoder::decode_json_stream;
pub use plain::decode_plain_stream;

use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use taleweaver_core::GameMode;
use taleweaver_error::TaleweaverResult;

/// Select the decoder for the given game mode.
///
/// GM mode expects structured JSON with a story field and an actions
/// array; Story-Teller mode treats the whole stream as narrative.
pub fn decode_stream<S>(
    mode: GameMode,
    fragments: S,
) -> BoxStream<'static, TaleweaverResult<DecodeEvent>>
where
    S: Stream<Item = TaleweaverResult<String>> + Send + 'static,
{
    match mode {
        GameMode::Gm => decode_json_stream(fragments).boxed(),
        GameMode::StoryTeller => decode_plain_stream(fragments).boxed(),
    }
}
